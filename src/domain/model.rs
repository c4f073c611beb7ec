use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Root of `names.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameDictionary {
    pub schema_version: u32,
    #[serde(with = "second_precision")]
    pub generated_at: DateTime<Utc>,
    pub count: usize,
    pub entries: Vec<NameEntry>,
}

/// 日文（片假名）與英文名稱的配對
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameEntry {
    pub ja: String,
    pub en: String,
}

impl NameDictionary {
    /// Builds the document, sorting entries by `ja` and truncating the
    /// timestamp to whole seconds.
    pub fn new(mut entries: Vec<NameEntry>, generated_at: DateTime<Utc>) -> Self {
        sort_entries(&mut entries);
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: generated_at.trunc_subsecs(0),
            count: entries.len(),
            entries,
        }
    }

    pub fn validate_schema(&self) -> Result<(), String> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                SCHEMA_VERSION, self.schema_version
            ));
        }
        Ok(())
    }

    pub fn validate_count(&self) -> Result<(), String> {
        if self.entries.len() != self.count {
            return Err(format!(
                "Entry count mismatch: expected {}, got {}",
                self.count,
                self.entries.len()
            ));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.validate_schema()?;
        self.validate_count()?;
        Ok(())
    }
}

/// Stable sort by `ja`; `String` ordering is code-point order.
pub fn sort_entries(entries: &mut [NameEntry]) {
    entries.sort_by(|a, b| a.ja.cmp(&b.ja));
}

mod second_precision {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// ---- PokéAPI 回應 ----

/// `GET /pokemon-species?limit=N`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesPage {
    pub count: usize,
    pub results: Vec<SpeciesRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeciesRef {
    pub name: String,
    pub url: String,
}

/// Species detail; only `names` is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesRecord {
    #[serde(default)]
    pub names: Vec<LocalizedName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedName {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<LanguageRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl LocalizedName {
    pub fn language_code(&self) -> Option<&str> {
        self.language.as_ref().and_then(|lang| lang.name.as_deref())
    }
}

// ---- 管道中間結果 ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSpecies {
    pub name: String,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub entries: Vec<NameEntry>,
    pub failures: Vec<FailedSpecies>,
    /// Species fetched fine but lacking a ja-Hrkt/en pair.
    pub skipped: usize,
    pub processed: usize,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub output_path: String,
    pub sha256: String,
    pub count: usize,
    pub generated_at: DateTime<Utc>,
    pub failures: Vec<FailedSpecies>,
    pub skipped: usize,
}

impl LoadReport {
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    pub fn exit_code(&self) -> i32 {
        if self.failures.is_empty() {
            0
        } else {
            1
        }
    }
}
