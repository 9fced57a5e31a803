use serde::{Deserialize, Serialize};

/// Outcome of scanning one ticker's quote window for 65-week highs.
///
/// The zero value doubles as the "no data" result: a window with fewer
/// than two usable rows, or without a row for today, reports
/// `(false, 0, 0.0, 0.0, 0)` rather than guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighWatermarkResult {
    /// Today's intraday high strictly exceeded every prior high in the window
    pub is_new_high_today: bool,

    /// Times a running-maximum high was established scanning the window
    /// chronologically (the first usable row always counts)
    pub break_count: u32,

    /// Today's intraday high
    pub today_high: f64,

    /// Maximum high over all days strictly before today
    pub past_max_high: f64,

    /// Usable rows in the window
    pub sample_size: usize,
}

impl HighWatermarkResult {
    pub fn no_data() -> Self {
        Self {
            is_new_high_today: false,
            break_count: 0,
            today_high: 0.0,
            past_max_high: 0.0,
            sample_size: 0,
        }
    }
}

impl Default for HighWatermarkResult {
    fn default() -> Self {
        Self::no_data()
    }
}
