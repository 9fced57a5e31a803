//! The six derived screening factors.
//!
//! Each factor resolves to its documented neutral default when upstream
//! data is insufficient, so a candidate always produces a full
//! `MetricVector`, never a partial one.

use crate::constants::{BASELINE_VOLUME_DAYS, RECENT_VOLUME_DAYS};
use crate::models::{DailyQuote, MetricVector};
use crate::services::FinancialStatement;

/// Recent 5-day average volume over the prior 20-day average.
/// Needs 25 trading rows; defaults to 1.0 (no surge) otherwise.
pub fn volume_surge_ratio(quotes: &[DailyQuote]) -> f64 {
    let needed = RECENT_VOLUME_DAYS + BASELINE_VOLUME_DAYS;
    if quotes.len() < needed {
        return 1.0;
    }

    let recent = &quotes[quotes.len() - RECENT_VOLUME_DAYS..];
    let baseline = &quotes[quotes.len() - needed..quotes.len() - RECENT_VOLUME_DAYS];

    let recent_avg = mean_volume(recent);
    let baseline_avg = mean_volume(baseline);

    if baseline_avg > 0.0 {
        recent_avg / baseline_avg
    } else {
        1.0
    }
}

/// 3-year average sales growth, percent
pub fn sales_growth_pct(statements: &[FinancialStatement]) -> f64 {
    let sales: Vec<f64> = statements.iter().filter_map(|s| s.net_sales).collect();
    let rates: Vec<f64> = sales
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
        .collect();
    mean(&rates).unwrap_or(0.0)
}

/// 3-year average operating-profit growth, percent. The denominator is
/// the absolute prior value so a swing out of losses reads as growth.
pub fn op_profit_growth_pct(statements: &[FinancialStatement]) -> f64 {
    let profits: Vec<f64> = statements.iter().filter_map(|s| s.operating_profit).collect();
    let rates: Vec<f64> = profits
        .windows(2)
        .filter(|pair| pair[0].abs() > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0].abs() * 100.0)
        .collect();
    mean(&rates).unwrap_or(0.0)
}

/// 3-year average return on equity, percent
pub fn roe_avg_pct(statements: &[FinancialStatement]) -> f64 {
    let roes: Vec<f64> = statements
        .iter()
        .filter_map(|s| match (s.profit, s.equity) {
            (Some(profit), Some(equity)) if equity != 0.0 => Some(profit / equity * 100.0),
            _ => None,
        })
        .collect();
    mean(&roes).unwrap_or(0.0)
}

/// Latest equity-to-assets ratio, percent
pub fn equity_ratio_pct(statements: &[FinancialStatement]) -> f64 {
    statements
        .last()
        .and_then(|s| s.equity_to_asset_ratio)
        .map(|ratio| ratio * 100.0)
        .unwrap_or(0.0)
}

/// Free-cash-flow proxy: latest operating profit in oku-yen
pub fn free_cash_flow_proxy(statements: &[FinancialStatement]) -> f64 {
    statements
        .last()
        .and_then(|s| s.operating_profit)
        .map(|profit| profit / 1e8)
        .unwrap_or(0.0)
}

/// Assemble the full vector for one candidate. `new_high_count` comes
/// from the scan snapshot; the rest are derived here.
pub fn build_metric_vector(
    new_high_count: u32,
    quotes: &[DailyQuote],
    statements: &[FinancialStatement],
) -> MetricVector {
    MetricVector {
        new_high_count: new_high_count as f64,
        volume_ratio: volume_surge_ratio(quotes),
        sales_growth: sales_growth_pct(statements),
        op_growth: op_profit_growth_pct(statements),
        roe_avg: roe_avg_pct(statements),
        equity_ratio: equity_ratio_pct(statements),
        free_cf: free_cash_flow_proxy(statements),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn mean_volume(quotes: &[DailyQuote]) -> f64 {
    if quotes.is_empty() {
        return 0.0;
    }
    quotes.iter().map(|q| q.volume as f64).sum::<f64>() / quotes.len() as f64
}
