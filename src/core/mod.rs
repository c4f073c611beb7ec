pub mod etl;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod writer;

pub use crate::domain::model::{LoadReport, NameDictionary, NameEntry, TransformResult};
pub use crate::domain::ports::{ConfigProvider, JsonSource, Pipeline, Storage};
pub use crate::utils::error::Result;
