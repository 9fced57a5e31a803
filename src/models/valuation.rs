use serde::{Deserialize, Serialize};

/// Per-ticker market capitalization and price/earnings ratio.
///
/// `market_cap` (oku-yen) and `per` are always populated (estimation
/// falls back to documented defaults on missing data) because the
/// qualification filter compares both unconditionally. The optional
/// fields record provenance when the primary estimation path was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    /// Market capitalization in units of 100 million yen
    pub market_cap: f64,

    /// Price/earnings ratio
    pub per: f64,

    /// Issued shares backing the market-cap estimate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_shares: Option<u64>,

    /// Latest close backing both estimates, in yen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_close: Option<f64>,

    /// Earnings per share backing the P/E estimate, in yen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,

    /// Raw market capitalization in yen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_jpy: Option<f64>,
}

impl ValuationSnapshot {
    /// The documented fallback pair, with no provenance
    pub fn fallback() -> Self {
        Self {
            market_cap: crate::constants::DEFAULT_MARKET_CAP_OKUYEN,
            per: crate::constants::DEFAULT_PER,
            issued_shares: None,
            latest_close: None,
            eps: None,
            market_cap_jpy: None,
        }
    }
}
