use crate::core::extractor::extract_name_pair;
use crate::core::fetcher::{Fetcher, HttpJsonSource, RetryPolicy};
use crate::core::writer::{parse_document, render_document};
use crate::core::{ConfigProvider, JsonSource, Pipeline, Storage};
use crate::domain::model::{
    FailedSpecies, LoadReport, NameDictionary, SpeciesPage, SpeciesRecord, SpeciesRef,
    TransformResult,
};
use crate::utils::checksum::sha256_hex;
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use url::Url;

pub struct NamesPipeline<S: Storage, C: ConfigProvider, J: JsonSource = HttpJsonSource> {
    storage: S,
    config: C,
    fetcher: Fetcher<J>,
}

impl<S: Storage, C: ConfigProvider> NamesPipeline<S, C, HttpJsonSource> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let source = HttpJsonSource::new(config.user_agent())?;
        Ok(Self::with_source(storage, config, source))
    }
}

impl<S: Storage, C: ConfigProvider, J: JsonSource> NamesPipeline<S, C, J> {
    pub fn with_source(storage: S, config: C, source: J) -> Self {
        let policy = RetryPolicy {
            max_attempts: config.max_attempts(),
            delay: config.retry_delay(),
        };
        Self {
            storage,
            config,
            fetcher: Fetcher::new(source, policy),
        }
    }

    fn species_list_url(&self, limit: usize) -> Result<String> {
        species_list_url(self.config.api_base(), limit)
    }
}

/// `{api_base}/pokemon-species?limit={limit}`
pub fn species_list_url(api_base: &str, limit: usize) -> Result<String> {
    let endpoint = format!("{}/pokemon-species", api_base.trim_end_matches('/'));
    let mut url = Url::parse(&endpoint).map_err(|e| EtlError::InvalidConfigValueError {
        field: "source.api_base".to_string(),
        value: api_base.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string());
    Ok(url.to_string())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, J: JsonSource> Pipeline for NamesPipeline<S, C, J> {
    async fn extract(&self) -> Result<Vec<SpeciesRef>> {
        tracing::info!("📡 Fetching Pokemon species data from {}", self.config.api_base());

        // 先取得總數
        let first_page: SpeciesPage = self.fetcher.fetch_as(&self.species_list_url(1)?).await?;
        let total_count = first_page.count;
        tracing::info!("📡 Total species count: {}", total_count);

        if total_count == 0 {
            return Ok(Vec::new());
        }

        tracing::info!("📡 Fetching all {} species...", total_count);
        let listing: SpeciesPage = self
            .fetcher
            .fetch_as(&self.species_list_url(total_count)?)
            .await?;

        Ok(listing.results)
    }

    async fn transform(&self, species: Vec<SpeciesRef>) -> Result<TransformResult> {
        let total = species.len();
        let interval = self.config.progress_interval().max(1);
        let mut result = TransformResult::default();

        tracing::info!("🔄 Processing {} species...", total);

        for (index, species_ref) in species.iter().enumerate() {
            let position = index + 1;
            if position % interval == 0 || position == total {
                tracing::info!("🔄 Progress: {}/{}", position, total);
            }

            // API 速率限制：每次請求前等待
            tokio::time::sleep(self.config.request_delay()).await;

            match self.fetcher.fetch_as::<SpeciesRecord>(&species_ref.url).await {
                Ok(record) => match extract_name_pair(&record) {
                    Some(entry) => result.entries.push(entry),
                    None => {
                        tracing::debug!("No ja-Hrkt/en name pair for {}, skipping", species_ref.name);
                        result.skipped += 1;
                    }
                },
                Err(e) => {
                    tracing::warn!("⚠️ Failed to process {}: {}", species_ref.name, e);
                    result.failures.push(FailedSpecies {
                        name: species_ref.name.clone(),
                        url: species_ref.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            result.processed += 1;
        }

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<LoadReport> {
        let output_path = self.config.output_path().to_string();

        tracing::info!("💾 Generating final JSON...");
        let document = NameDictionary::new(result.entries, Utc::now());
        let bytes = render_document(&document)?;

        tracing::debug!("Writing {} bytes to {}", bytes.len(), output_path);
        self.storage.write_file(&output_path, &bytes).await?;

        // 讀回檔案驗證並計算雜湊
        let written = self.storage.read_file(&output_path).await?;
        let verified = parse_document(&written)?;
        let sha256 = sha256_hex(&written);

        tracing::info!(
            "✅ Successfully generated {} with {} entries",
            output_path,
            verified.count
        );
        tracing::info!("🕒 Generated at: {}", verified.generated_at.format("%Y-%m-%dT%H:%M:%SZ"));
        tracing::info!("🔐 SHA256: {}", sha256);

        Ok(LoadReport {
            output_path,
            sha256,
            count: verified.count,
            generated_at: verified.generated_at,
            failures: result.failures,
            skipped: result.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NameEntry;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        api_base: String,
        output_path: String,
        request_delay: Duration,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                api_base: "http://api.test/v2".to_string(),
                output_path: "names.json".to_string(),
                request_delay: Duration::ZERO,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_base(&self) -> &str {
            &self.api_base
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn user_agent(&self) -> &str {
            "names-etl-test"
        }

        fn max_attempts(&self) -> u32 {
            3
        }

        fn retry_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn request_delay(&self) -> Duration {
            self.request_delay
        }

        fn progress_interval(&self) -> usize {
            10
        }
    }

    /// Canned responses keyed by URL; unknown URLs fail.
    #[derive(Clone, Default)]
    struct CannedSource {
        responses: Arc<HashMap<String, serde_json::Value>>,
        calls: Arc<std::sync::Mutex<Vec<String>>>,
        failures: Arc<AtomicUsize>,
    }

    impl CannedSource {
        fn new(responses: Vec<(String, serde_json::Value)>) -> Self {
            Self {
                responses: Arc::new(responses.into_iter().collect()),
                ..Default::default()
            }
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    impl JsonSource for CannedSource {
        async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(value) => Ok(value.clone()),
                None => {
                    self.failures.fetch_add(1, Ordering::SeqCst);
                    Err(EtlError::ProcessingError {
                        message: format!("no route for {}", url),
                    })
                }
            }
        }
    }

    fn species_json(ja: Option<&str>, en: Option<&str>) -> serde_json::Value {
        let mut names = Vec::new();
        if let Some(ja) = ja {
            names.push(serde_json::json!({"name": ja, "language": {"name": "ja-Hrkt"}}));
        }
        if let Some(en) = en {
            names.push(serde_json::json!({"name": en, "language": {"name": "en"}}));
        }
        serde_json::json!({ "names": names })
    }

    fn species_ref(name: &str) -> SpeciesRef {
        SpeciesRef {
            name: name.to_string(),
            url: format!("http://api.test/v2/pokemon-species/{}/", name),
        }
    }

    #[test]
    fn test_species_list_url() {
        assert_eq!(
            species_list_url("https://pokeapi.co/api/v2", 1).unwrap(),
            "https://pokeapi.co/api/v2/pokemon-species?limit=1"
        );
        assert_eq!(
            species_list_url("https://pokeapi.co/api/v2/", 1025).unwrap(),
            "https://pokeapi.co/api/v2/pokemon-species?limit=1025"
        );
        assert!(species_list_url("not a url", 1).is_err());
    }

    #[tokio::test]
    async fn test_extract_fetches_count_then_full_listing() {
        let source = CannedSource::new(vec![
            (
                "http://api.test/v2/pokemon-species?limit=1".to_string(),
                serde_json::json!({"count": 2, "results": [species_ref("bulbasaur")]}),
            ),
            (
                "http://api.test/v2/pokemon-species?limit=2".to_string(),
                serde_json::json!({"count": 2, "results": [species_ref("bulbasaur"), species_ref("ivysaur")]}),
            ),
        ]);
        let pipeline = NamesPipeline::with_source(MockStorage::new(), MockConfig::new(), source);

        let species = pipeline.extract().await.unwrap();

        assert_eq!(species, vec![species_ref("bulbasaur"), species_ref("ivysaur")]);
    }

    #[tokio::test]
    async fn test_extract_with_zero_count_skips_listing() {
        let source = CannedSource::new(vec![(
            "http://api.test/v2/pokemon-species?limit=1".to_string(),
            serde_json::json!({"count": 0, "results": []}),
        )]);
        let pipeline =
            NamesPipeline::with_source(MockStorage::new(), MockConfig::new(), source.clone());

        let species = pipeline.extract().await.unwrap();

        assert!(species.is_empty());
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_listing_without_results_is_error() {
        let source = CannedSource::new(vec![
            (
                "http://api.test/v2/pokemon-species?limit=1".to_string(),
                serde_json::json!({"count": 2, "results": [species_ref("bulbasaur")]}),
            ),
            (
                "http://api.test/v2/pokemon-species?limit=2".to_string(),
                serde_json::json!({"count": 2}),
            ),
        ]);
        let storage = MockStorage::new();
        let pipeline = NamesPipeline::with_source(storage.clone(), MockConfig::new(), source);

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, EtlError::SerializationError(_)));
        assert!(storage.get_file("names.json").await.is_none());
    }

    #[tokio::test]
    async fn test_extract_failure_is_fatal() {
        let source = CannedSource::new(vec![]);
        let pipeline =
            NamesPipeline::with_source(MockStorage::new(), MockConfig::new(), source.clone());

        assert!(pipeline.extract().await.is_err());
        assert_eq!(
            source.calls_to("http://api.test/v2/pokemon-species?limit=1"),
            3
        );
    }

    #[tokio::test]
    async fn test_transform_collects_pairs_skips_and_failures() {
        let source = CannedSource::new(vec![
            (species_ref("pikachu").url, species_json(Some("ピカチュウ"), Some("Pikachu"))),
            (species_ref("missingno").url, species_json(None, Some("MissingNo"))),
            (species_ref("bulbasaur").url, species_json(Some("フシギダネ"), Some("Bulbasaur"))),
            (species_ref("broken").url, serde_json::json!({"names": "not-a-list"})),
        ]);
        let pipeline =
            NamesPipeline::with_source(MockStorage::new(), MockConfig::new(), source.clone());

        let result = pipeline
            .transform(vec![
                species_ref("pikachu"),
                species_ref("missingno"),
                species_ref("unreachable"),
                species_ref("bulbasaur"),
                species_ref("broken"),
            ])
            .await
            .unwrap();

        assert_eq!(result.processed, 5);
        assert_eq!(result.skipped, 1);
        assert_eq!(
            result.entries,
            vec![
                NameEntry { ja: "ピカチュウ".to_string(), en: "Pikachu".to_string() },
                NameEntry { ja: "フシギダネ".to_string(), en: "Bulbasaur".to_string() },
            ]
        );
        let failed: Vec<&str> = result.failures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(failed, vec!["unreachable", "broken"]);

        // 取得失敗會重試，解析失敗不會
        assert_eq!(source.calls_to(&species_ref("unreachable").url), 3);
        assert_eq!(source.calls_to(&species_ref("broken").url), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transform_waits_before_each_request() {
        let source = CannedSource::new(vec![
            (species_ref("a").url, species_json(Some("ア"), Some("A"))),
            (species_ref("b").url, species_json(Some("イ"), Some("B"))),
            (species_ref("c").url, species_json(Some("ウ"), Some("C"))),
        ]);
        let mut config = MockConfig::new();
        config.request_delay = Duration::from_millis(100);
        let pipeline = NamesPipeline::with_source(MockStorage::new(), config, source);

        let start = tokio::time::Instant::now();
        let result = pipeline
            .transform(vec![species_ref("a"), species_ref("b"), species_ref("c")])
            .await
            .unwrap();

        assert_eq!(result.entries.len(), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_load_writes_sorted_document_and_hash() {
        let storage = MockStorage::new();
        let pipeline = NamesPipeline::with_source(
            storage.clone(),
            MockConfig::new(),
            CannedSource::new(vec![]),
        );

        let result = TransformResult {
            entries: vec![
                NameEntry { ja: "フシギダネ".to_string(), en: "Bulbasaur".to_string() },
                NameEntry { ja: "イーブイ".to_string(), en: "Eevee".to_string() },
            ],
            failures: vec![FailedSpecies {
                name: "x".to_string(),
                url: "http://api.test/x".to_string(),
                reason: "boom".to_string(),
            }],
            skipped: 2,
            processed: 5,
        };

        let report = pipeline.load(result).await.unwrap();

        let bytes = storage.get_file("names.json").await.unwrap();
        let document: NameDictionary = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(report.output_path, "names.json");
        assert_eq!(report.count, 2);
        assert_eq!(report.sha256, sha256_hex(&bytes));
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(document.entries[0].ja, "イーブイ");
        assert_eq!(document.entries[1].ja, "フシギダネ");
        assert_eq!(document.generated_at, report.generated_at);
    }

    #[tokio::test]
    async fn test_load_with_no_entries_still_writes_file() {
        let storage = MockStorage::new();
        let pipeline = NamesPipeline::with_source(
            storage.clone(),
            MockConfig::new(),
            CannedSource::new(vec![]),
        );

        let report = pipeline.load(TransformResult::default()).await.unwrap();

        assert_eq!(report.count, 0);
        assert_eq!(report.exit_code(), 0);
        assert!(storage.get_file("names.json").await.is_some());
    }
}
