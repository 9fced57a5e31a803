use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data for a single ticker.
///
/// Price fields use `f64::NAN` as the missing-value sentinel: upstream
/// rows sometimes carry nulls (e.g. halted sessions), and a NaN is skipped
/// by every max/comparison downstream instead of being mistaken for a
/// zero-yen price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyQuote {
    /// Trading day
    pub date: NaiveDate,

    /// Opening price in yen
    pub open: f64,

    /// Intraday high in yen
    pub high: f64,

    /// Intraday low in yen
    pub low: f64,

    /// Closing price in yen
    pub close: f64,

    /// Trading volume (shares)
    pub volume: u64,
}

impl DailyQuote {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Whether the intraday high is usable in comparisons
    pub fn has_high(&self) -> bool {
        self.high.is_finite()
    }
}
