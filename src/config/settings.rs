use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 指向 TOML 設定檔的環境變數
pub const CONFIG_ENV_VAR: &str = "NAMES_ETL_CONFIG";

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 100;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

const LOG_FORMATS: [&str; 2] = ["compact", "json"];

/// Tunables for a run. Every section and key in the TOML file is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub retry: RetrySettings,
    pub rate_limit: RateLimitSettings,
    pub progress: ProgressSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceSettings {
    pub api_base: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitSettings {
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressSettings {
    pub interval: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub verbose: bool,
    pub format: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: concat!("names-etl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            format: "compact".to_string(),
        }
    }
}

impl Settings {
    /// Reads the file named by `NAMES_ETL_CONFIG`, or returns defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 `${VAR}` 形式的環境變數；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry.delay_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit.request_delay_ms)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("source.api_base", &self.source.api_base)?;
        validate_non_empty_string("source.user_agent", &self.source.user_agent)?;
        validate_positive_number("retry.max_attempts", self.retry.max_attempts as usize, 1)?;
        validate_positive_number("progress.interval", self.progress.interval, 1)?;
        validate_one_of("logging.format", &self.logging.format, &LOG_FORMATS)?;
        Ok(())
    }
}
