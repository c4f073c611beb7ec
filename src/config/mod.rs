#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;

pub use settings::Settings;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "names-etl", version)]
#[command(about = "Fetch Japanese/English species names from PokéAPI into names.json")]
pub struct CliConfig {
    /// Output file path
    #[arg(default_value = "names.json")]
    pub output_path: String,

    /// Loaded from the file named by NAMES_ETL_CONFIG, not from the command line.
    #[arg(skip)]
    pub settings: Settings,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn with_settings(output_path: impl Into<String>, settings: Settings) -> Self {
        Self {
            output_path: output_path.into(),
            settings,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        self.settings.validate()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base(&self) -> &str {
        &self.settings.source.api_base
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn user_agent(&self) -> &str {
        &self.settings.source.user_agent
    }

    fn max_attempts(&self) -> u32 {
        self.settings.retry.max_attempts
    }

    fn retry_delay(&self) -> Duration {
        self.settings.retry_delay()
    }

    fn request_delay(&self) -> Duration {
        self.settings.request_delay()
    }

    fn progress_interval(&self) -> usize {
        self.settings.progress.interval
    }
}
