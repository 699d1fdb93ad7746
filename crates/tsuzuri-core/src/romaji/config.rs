use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Deserialize)]
struct RomajiTableFile {
    mappings: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RomajiConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[mappings] table is empty")]
    Empty,
    #[error("key must be printable ASCII without spaces: {0:?}")]
    NonAsciiKey(String),
    #[error("empty value for key: {0}")]
    EmptyValue(String),
    #[error("cannot read romaji table: {0}")]
    Io(String),
}

/// Parse TOML text into a sorted `BTreeMap<romaji, kana>`.
pub fn parse_romaji_toml(toml_str: &str) -> Result<BTreeMap<String, String>, RomajiConfigError> {
    let table: RomajiTableFile =
        toml::from_str(toml_str).map_err(|e| RomajiConfigError::Parse(e.to_string()))?;

    if table.mappings.is_empty() {
        return Err(RomajiConfigError::Empty);
    }

    for (key, value) in &table.mappings {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(RomajiConfigError::NonAsciiKey(key.clone()));
        }
        if value.is_empty() {
            return Err(RomajiConfigError::EmptyValue(key.clone()));
        }
    }

    Ok(table.mappings)
}

pub(super) fn read_romaji_file(path: &Path) -> Result<BTreeMap<String, String>, RomajiConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|e| RomajiConfigError::Io(format!("{}: {e}", path.display())))?;
    parse_romaji_toml(&content)
}
