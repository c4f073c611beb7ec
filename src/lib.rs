pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::Settings;
pub use core::{etl::EtlEngine, fetcher::Fetcher, pipeline::NamesPipeline};
pub use domain::model::{LoadReport, NameDictionary, NameEntry};
pub use utils::error::{EtlError, Result};
