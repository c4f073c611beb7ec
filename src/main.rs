use anyhow::Context;
use clap::Parser;
use names_etl::config::settings::CONFIG_ENV_VAR;
use names_etl::utils::{logger, validation::Validate};
use names_etl::{CliConfig, EtlEngine, LocalStorage, NamesPipeline, Settings};

fn load_config() -> anyhow::Result<CliConfig> {
    let mut config = CliConfig::parse();
    config.settings = Settings::from_env().with_context(|| {
        format!(
            "failed to load settings from ${} ({})",
            CONFIG_ENV_VAR,
            std::env::var(CONFIG_ENV_VAR).unwrap_or_default()
        )
    })?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.settings.logging.format == "json" {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.settings.logging.verbose);
    }

    tracing::info!("Starting names-etl");
    tracing::debug!("Config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = match NamesPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("❌ Failed to set up HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("📁 Output saved to: {}", report.output_path);
            if report.error_count() > 0 {
                tracing::error!(
                    "❌ Completed with {} errors ({} skipped without a name pair)",
                    report.error_count(),
                    report.skipped
                );
            } else {
                tracing::info!(
                    "✅ Completed without errors ({} skipped without a name pair)",
                    report.skipped
                );
            }
            std::process::exit(report.exit_code());
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }
}
