use chrono::NaiveDate;

use crate::models::{DailyQuote, HighWatermarkResult};

/// Scan one ticker's quote window for a 65-week intraday high.
///
/// Rows with an unusable `high` (NaN sentinel) and rows after `today`
/// are excluded before anything is computed. A window with fewer than
/// two usable rows, no row for `today`, or no prior rows reports the
/// zero-value "no data" result.
///
/// `break_count` scans chronologically with a running maximum starting
/// at 0 and counts every strict exceedance, so the first usable row
/// always registers as the initial break. A tie with the past maximum
/// does not count as a new high.
pub fn scan(quotes: &[DailyQuote], today: NaiveDate) -> HighWatermarkResult {
    let mut window: Vec<&DailyQuote> = quotes
        .iter()
        .filter(|quote| quote.has_high() && quote.date <= today)
        .collect();
    window.sort_by_key(|quote| quote.date);

    if window.len() < 2 {
        return HighWatermarkResult::no_data();
    }

    // Duplicate dates are not expected; last-sorted wins if present
    let today_high = match window.iter().rev().find(|quote| quote.date == today) {
        Some(quote) => quote.high,
        None => return HighWatermarkResult::no_data(),
    };

    let past_max_high = window
        .iter()
        .filter(|quote| quote.date < today)
        .map(|quote| quote.high)
        .fold(f64::NEG_INFINITY, f64::max);
    if !past_max_high.is_finite() {
        return HighWatermarkResult::no_data();
    }

    let mut break_count = 0u32;
    let mut rolling_max = 0.0f64;
    for quote in &window {
        if quote.high > rolling_max {
            break_count += 1;
            rolling_max = quote.high;
        }
    }

    HighWatermarkResult {
        is_new_high_today: today_high > past_max_high,
        break_count,
        today_high,
        past_max_high,
        sample_size: window.len(),
    }
}
