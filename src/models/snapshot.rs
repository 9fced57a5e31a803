use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{MetricVector, ValuationSnapshot};

/// One stock that set a 65-week high today (scan stage output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHighStock {
    pub code: String,
    pub name: String,
    pub new_high_count: u32,
    pub today_high: f64,
    pub past_max: f64,
    pub total_days: usize,
}

/// Watch-list entry evaluated regardless of today's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingStockInfo {
    pub code: String,
    pub name: String,
    pub new_high_count: u32,
    pub is_new_high_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Stocks that set a 65-week high today
    pub total_new_high: usize,

    /// Size of the scanned market segment
    pub universe_count: usize,
}

/// Stage A snapshot, fully rewritten each run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    /// Scan date, YYYYMMDD
    pub scan_date: String,
    pub new_high_stocks: Vec<NewHighStock>,
    pub holding_stock_info: Vec<HoldingStockInfo>,
    pub market_data: BTreeMap<String, ValuationSnapshot>,
    pub summary: ScanSummary,
}

/// One scored candidate after normalization and composite scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub code: String,
    pub name: String,

    /// Normalized factor values in vertex order, each in [0, 1]
    pub scores: Vec<f64>,

    pub comprehensive_score: f64,
    pub area_score: f64,
    pub shape_score: f64,
    pub is_holding: bool,
    pub is_new_high_today: bool,
}

/// A scored candidate that passed the filter (or is a holding),
/// carrying its valuation for the report stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedStock {
    #[serde(flatten)]
    pub candidate: ScoredCandidate,

    #[serde(flatten)]
    pub valuation: ValuationSnapshot,
}

/// A candidate that failed the filter, with the predicate(s) that failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedStock {
    pub code: String,
    pub name: String,
    pub comprehensive_score: f64,
    pub reason: String,
}

/// Raw min/max of one factor column across the run universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScale {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_analyzed: usize,
    pub qualified_count: usize,
    pub excluded_count: usize,
}

/// Stage B snapshot, fully rewritten each run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    /// Copied from the scan snapshot, YYYYMMDD
    pub analysis_date: String,

    /// Top non-holding recommendations, score descending
    pub top3_stocks: Vec<QualifiedStock>,

    /// Qualified watch-list entries
    pub holding_stocks: Vec<QualifiedStock>,

    /// Everything that passed the filter, score descending
    pub qualified_stocks: Vec<QualifiedStock>,

    pub excluded_stocks: Vec<ExcludedStock>,

    /// Raw factor values per ticker
    pub metrics_data: BTreeMap<String, MetricVector>,

    /// Per-factor raw min/max used for normalization
    pub scaling_info: BTreeMap<String, FactorScale>,

    pub summary: AnalysisSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scan_snapshot() -> ScanSnapshot {
        let mut market_data = BTreeMap::new();
        market_data.insert(
            "5621".to_string(),
            ValuationSnapshot {
                market_cap: 120.0,
                per: 18.5,
                issued_shares: Some(12_000_000),
                latest_close: Some(1000.0),
                eps: Some(54.0),
                market_cap_jpy: Some(1.2e10),
            },
        );
        market_data.insert("5527".to_string(), ValuationSnapshot::fallback());

        ScanSnapshot {
            scan_date: "20250926".to_string(),
            new_high_stocks: vec![NewHighStock {
                code: "5621".to_string(),
                name: "Humanix".to_string(),
                new_high_count: 14,
                today_high: 1520.0,
                past_max: 1498.0,
                total_days: 311,
            }],
            holding_stock_info: vec![HoldingStockInfo {
                code: "5527".to_string(),
                name: "Propetec".to_string(),
                new_high_count: 3,
                is_new_high_today: false,
            }],
            market_data,
            summary: ScanSummary {
                total_new_high: 1,
                universe_count: 590,
            },
        }
    }

    #[test]
    fn test_scan_snapshot_round_trip() {
        let snapshot = sample_scan_snapshot();
        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let reloaded: ScanSnapshot = serde_json::from_str(&json).unwrap();
        // The analyze stage must see the exact universe the scan produced
        assert_eq!(reloaded, snapshot);
    }

    #[test]
    fn test_qualified_stock_flattens_valuation() {
        let stock = QualifiedStock {
            candidate: ScoredCandidate {
                code: "5621".to_string(),
                name: "Humanix".to_string(),
                scores: vec![0.5; 7],
                comprehensive_score: 0.42,
                area_score: 0.6,
                shape_score: 0.7,
                is_holding: false,
                is_new_high_today: true,
            },
            valuation: ValuationSnapshot::fallback(),
        };
        let json = serde_json::to_value(&stock).unwrap();
        assert_eq!(json["code"], "5621");
        assert_eq!(json["market_cap"], 50.0);
        assert_eq!(json["per"], 15.0);
    }
}
