use crate::domain::model::{NameEntry, SpeciesRecord};

pub const JAPANESE_KATAKANA: &str = "ja-Hrkt";
pub const ENGLISH: &str = "en";

/// Pulls the katakana/English pair out of a species record.
///
/// Returns `None` unless both names are present and non-empty. When a
/// language is listed twice the later entry wins.
pub fn extract_name_pair(record: &SpeciesRecord) -> Option<NameEntry> {
    let mut ja: Option<&str> = None;
    let mut en: Option<&str> = None;

    for localized in &record.names {
        match localized.language_code() {
            Some(JAPANESE_KATAKANA) => ja = localized.name.as_deref(),
            Some(ENGLISH) => en = localized.name.as_deref(),
            _ => {}
        }
    }

    match (ja, en) {
        (Some(ja), Some(en)) if !ja.is_empty() && !en.is_empty() => Some(NameEntry {
            ja: ja.to_string(),
            en: en.to_string(),
        }),
        _ => None,
    }
}
