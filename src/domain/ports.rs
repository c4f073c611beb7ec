use crate::domain::model::{LoadReport, SpeciesRef, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// One GET returning a decoded JSON body. Non-2xx responses are errors.
pub trait JsonSource: Send + Sync {
    fn get_json(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<serde_json::Value>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn output_path(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn max_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn request_delay(&self) -> Duration;
    fn progress_interval(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SpeciesRef>>;
    async fn transform(&self, species: Vec<SpeciesRef>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadReport>;
}
