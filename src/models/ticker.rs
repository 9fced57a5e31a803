use serde::{Deserialize, Serialize};

/// One listed instrument from the universe listing.
/// Immutable once loaded for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    /// Exchange code, e.g. "5621"
    pub code: String,

    /// Display name
    pub name: String,

    /// Market segment tag, e.g. "グロース"
    pub segment: String,
}

impl Ticker {
    pub fn new(code: impl Into<String>, name: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            segment: segment.into(),
        }
    }
}

/// Parse a comma-separated watch-list override ("5621,5527") into codes.
/// Empty segments are dropped.
pub fn parse_holding_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}
