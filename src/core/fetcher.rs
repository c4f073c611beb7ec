use crate::core::JsonSource;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// reqwest-backed [`JsonSource`]. No request timeout beyond the client default.
#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    client: Client,
}

impl HttpJsonSource {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl JsonSource for HttpJsonSource {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.json::<serde_json::Value>().await?;
        Ok(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Wraps a [`JsonSource`] with bounded retry and a fixed pause between
/// attempts. After the last attempt the last error is returned unchanged.
pub struct Fetcher<J: JsonSource> {
    source: J,
    policy: RetryPolicy,
}

impl<J: JsonSource> Fetcher<J> {
    pub fn new(source: J, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub async fn fetch(&self, url: &str) -> Result<serde_json::Value> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.source.get_json(url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        "⚠️ Attempt {}/{} failed for {}: {}. Retrying in {:?}",
                        attempt,
                        max_attempts,
                        url,
                        e,
                        self.policy.delay
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "❌ Giving up on {} after {} attempts: {}",
                        url,
                        max_attempts,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Fetches and decodes into `T`. A shape mismatch is not retried.
    pub async fn fetch_as<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self.fetch(url).await?;
        serde_json::from_value(value).map_err(EtlError::SerializationError)
    }
}
