use crate::core::Pipeline;
use crate::domain::model::LoadReport;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract → transform → load. Per-species failures do not fail the
    /// run; they are carried in the returned report.
    pub async fn run(&self) -> Result<LoadReport> {
        let started = Instant::now();
        tracing::info!("🚀 Starting ETL process...");

        // Extract
        let species = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} species references", species.len());

        // Transform
        let transformed = self.pipeline.transform(species).await?;
        tracing::info!(
            "🔄 Transformed {} species: {} name pairs, {} skipped, {} failed",
            transformed.processed,
            transformed.entries.len(),
            transformed.skipped,
            transformed.failures.len()
        );

        // Load
        let report = self.pipeline.load(transformed).await?;

        for failure in &report.failures {
            tracing::error!("❌ {} ({}): {}", failure.name, failure.url, failure.reason);
        }
        if report.error_count() > 0 {
            tracing::error!("❌ {} species failed after retries", report.error_count());
        }

        tracing::info!("⏱️ Finished in {:?}", started.elapsed());
        Ok(report)
    }
}
