use crate::domain::model::NameDictionary;
use crate::utils::error::{EtlError, Result};

/// UTF-8 JSON, two-space indent, non-ASCII kept literal, no trailing newline.
pub fn render_document(document: &NameDictionary) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(document)?)
}

/// Parses and validates a written document.
pub fn parse_document(bytes: &[u8]) -> Result<NameDictionary> {
    let document: NameDictionary = serde_json::from_slice(bytes)?;
    document
        .validate()
        .map_err(|message| EtlError::ValidationError { message })?;
    Ok(document)
}
