//! Two-year price/volume chart artifacts for the recommended stocks.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::DailyQuote;

const VOLUME_MA_WINDOW: usize = 20;

#[derive(Debug, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,

    /// 20-day volume moving average, present once the window is full
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ma20: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PriceStats {
    pub period_high: f64,
    pub period_low: f64,
    pub latest_close: f64,

    /// (high − low) / low, percent
    pub range_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct PriceChart {
    pub code: String,
    pub name: String,
    pub data_points: usize,
    pub series: Vec<PricePoint>,
    pub stats: PriceStats,
}

/// Build the artifact for one stock. Returns None when the quote window
/// holds no usable prices at all.
pub fn price_chart(code: &str, name: &str, quotes: &[DailyQuote]) -> Option<PriceChart> {
    let period_high = quotes
        .iter()
        .map(|q| q.high)
        .filter(|h| h.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let period_low = quotes
        .iter()
        .map(|q| q.low)
        .filter(|l| l.is_finite())
        .fold(f64::INFINITY, f64::min);
    let latest_close = quotes.iter().rev().map(|q| q.close).find(|c| c.is_finite())?;

    if !period_high.is_finite() || !period_low.is_finite() {
        return None;
    }

    let range_pct = if period_low > 0.0 {
        (period_high - period_low) / period_low * 100.0
    } else {
        0.0
    };

    let series: Vec<PricePoint> = quotes
        .iter()
        .enumerate()
        .map(|(index, quote)| PricePoint {
            date: quote.date,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            volume_ma20: volume_ma(quotes, index),
        })
        .collect();

    Some(PriceChart {
        code: code.to_string(),
        name: name.to_string(),
        data_points: series.len(),
        series,
        stats: PriceStats {
            period_high,
            period_low,
            latest_close,
            range_pct,
        },
    })
}

fn volume_ma(quotes: &[DailyQuote], index: usize) -> Option<f64> {
    if index + 1 < VOLUME_MA_WINDOW {
        return None;
    }
    let window = &quotes[index + 1 - VOLUME_MA_WINDOW..=index];
    Some(window.iter().map(|q| q.volume as f64).sum::<f64>() / VOLUME_MA_WINDOW as f64)
}
