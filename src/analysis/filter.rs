//! Market-cap / P-E qualification filter.
//!
//! Holdings always qualify: the watch-list is a guaranteed "always
//! evaluate my existing positions" rule, not a screening bypass. Every
//! other candidate must satisfy both predicates, and a candidate whose
//! valuation is missing is excluded explicitly rather than passed
//! through.

use std::collections::BTreeMap;

use crate::models::{ExcludedStock, QualifiedStock, ScoredCandidate, ValuationSnapshot};

#[derive(Debug, Clone, Copy)]
pub struct FilterThresholds {
    /// Market cap ceiling in oku-yen
    pub max_market_cap_okuyen: f64,

    /// Price/earnings floor
    pub min_per: f64,
}

#[derive(Debug)]
pub struct FilterOutcome {
    /// Holdings plus passers, composite score descending
    pub qualified: Vec<QualifiedStock>,

    /// Failed candidates with the predicate(s) that failed
    pub excluded: Vec<ExcludedStock>,
}

/// Apply the qualification filter to a ranked universe.
///
/// `ranked` must already be sorted by composite score descending; order
/// is preserved, so `qualified` comes out sorted the same way.
pub fn apply(
    ranked: &[ScoredCandidate],
    market_data: &BTreeMap<String, ValuationSnapshot>,
    thresholds: FilterThresholds,
) -> FilterOutcome {
    let mut qualified = Vec::new();
    let mut excluded = Vec::new();

    for candidate in ranked {
        let valuation = market_data.get(&candidate.code);

        if candidate.is_holding {
            // Holdings are carried even when their valuation never arrived
            qualified.push(QualifiedStock {
                candidate: candidate.clone(),
                valuation: valuation.cloned().unwrap_or_else(ValuationSnapshot::fallback),
            });
            continue;
        }

        let Some(valuation) = valuation else {
            excluded.push(ExcludedStock {
                code: candidate.code.clone(),
                name: candidate.name.clone(),
                comprehensive_score: candidate.comprehensive_score,
                reason: "no market data".to_string(),
            });
            continue;
        };

        let mut reasons = Vec::new();
        if valuation.market_cap > thresholds.max_market_cap_okuyen {
            reasons.push(format!(
                "market cap {:.0} oku-yen > {:.0} oku-yen",
                valuation.market_cap, thresholds.max_market_cap_okuyen
            ));
        }
        if valuation.per < thresholds.min_per {
            reasons.push(format!("P/E {:.1} < {:.1}", valuation.per, thresholds.min_per));
        }

        if reasons.is_empty() {
            qualified.push(QualifiedStock {
                candidate: candidate.clone(),
                valuation: valuation.clone(),
            });
        } else {
            excluded.push(ExcludedStock {
                code: candidate.code.clone(),
                name: candidate.name.clone(),
                comprehensive_score: candidate.comprehensive_score,
                reason: reasons.join(", "),
            });
        }
    }

    FilterOutcome { qualified, excluded }
}

/// Top non-holding entries of the qualified list, the recommended set
pub fn recommended(qualified: &[QualifiedStock], limit: usize) -> Vec<QualifiedStock> {
    qualified
        .iter()
        .filter(|stock| !stock.candidate.is_holding)
        .take(limit)
        .cloned()
        .collect()
}

/// Qualified watch-list entries, in ranking order
pub fn holdings(qualified: &[QualifiedStock]) -> Vec<QualifiedStock> {
    qualified
        .iter()
        .filter(|stock| stock.candidate.is_holding)
        .cloned()
        .collect()
}

/// 1-based rank of a code within the full qualified list
pub fn rank_of(qualified: &[QualifiedStock], code: &str) -> Option<usize> {
    qualified
        .iter()
        .position(|stock| stock.candidate.code == code)
        .map(|index| index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> FilterThresholds {
        FilterThresholds {
            max_market_cap_okuyen: 200.0,
            min_per: 10.0,
        }
    }

    fn scored(code: &str, score: f64, is_holding: bool) -> ScoredCandidate {
        ScoredCandidate {
            code: code.to_string(),
            name: format!("Stock {}", code),
            scores: vec![0.5; 7],
            comprehensive_score: score,
            area_score: score,
            shape_score: 1.0,
            is_holding,
            is_new_high_today: !is_holding,
        }
    }

    fn valuation(market_cap: f64, per: f64) -> ValuationSnapshot {
        ValuationSnapshot {
            market_cap,
            per,
            issued_shares: None,
            latest_close: None,
            eps: None,
            market_cap_jpy: None,
        }
    }

    #[test]
    fn test_holdings_always_qualify() {
        let ranked = vec![scored("5527", 0.9, true)];
        let mut market_data = BTreeMap::new();
        market_data.insert("5527".to_string(), valuation(9999.0, 1.0));

        let outcome = apply(&ranked, &market_data, thresholds());
        assert_eq!(outcome.qualified.len(), 1);
        assert!(outcome.excluded.is_empty());
    }

    #[test]
    fn test_holding_without_market_data_still_qualifies() {
        let ranked = vec![scored("5527", 0.9, true)];
        let outcome = apply(&ranked, &BTreeMap::new(), thresholds());
        assert_eq!(outcome.qualified.len(), 1);
        assert_eq!(outcome.qualified[0].valuation, ValuationSnapshot::fallback());
    }

    #[test]
    fn test_exclusion_cites_market_cap() {
        let ranked = vec![scored("A", 0.5, false)];
        let mut market_data = BTreeMap::new();
        market_data.insert("A".to_string(), valuation(201.0, 15.0));

        let outcome = apply(&ranked, &market_data, thresholds());
        assert!(outcome.qualified.is_empty());
        assert!(outcome.excluded[0].reason.contains("market cap 201"));
        assert!(!outcome.excluded[0].reason.contains("P/E"));
    }

    #[test]
    fn test_exclusion_cites_per() {
        let ranked = vec![scored("A", 0.5, false)];
        let mut market_data = BTreeMap::new();
        market_data.insert("A".to_string(), valuation(150.0, 9.0));

        let outcome = apply(&ranked, &market_data, thresholds());
        assert!(outcome.excluded[0].reason.contains("P/E 9.0 < 10.0"));
        assert!(!outcome.excluded[0].reason.contains("market cap"));
    }

    #[test]
    fn test_exclusion_cites_both_predicates() {
        let ranked = vec![scored("A", 0.5, false)];
        let mut market_data = BTreeMap::new();
        market_data.insert("A".to_string(), valuation(300.0, 5.0));

        let outcome = apply(&ranked, &market_data, thresholds());
        let reason = &outcome.excluded[0].reason;
        assert!(reason.contains("market cap"));
        assert!(reason.contains("P/E"));
    }

    #[test]
    fn test_missing_market_data_excludes_with_reason() {
        let ranked = vec![scored("A", 0.5, false)];
        let outcome = apply(&ranked, &BTreeMap::new(), thresholds());
        assert_eq!(outcome.excluded[0].reason, "no market data");
        // The composite score is retained on exclusion
        assert_eq!(outcome.excluded[0].comprehensive_score, 0.5);
    }

    #[test]
    fn test_boundary_values_pass() {
        let ranked = vec![scored("A", 0.5, false)];
        let mut market_data = BTreeMap::new();
        market_data.insert("A".to_string(), valuation(200.0, 10.0));

        let outcome = apply(&ranked, &market_data, thresholds());
        assert_eq!(outcome.qualified.len(), 1);
    }

    #[test]
    fn test_qualified_preserves_ranking_and_helpers_split_it() {
        let ranked = vec![
            scored("TOP", 0.9, false),
            scored("HOLD", 0.7, true),
            scored("MID", 0.5, false),
            scored("LOW", 0.3, false),
        ];
        let mut market_data = BTreeMap::new();
        for code in ["TOP", "HOLD", "MID", "LOW"] {
            market_data.insert(code.to_string(), valuation(100.0, 15.0));
        }

        let outcome = apply(&ranked, &market_data, thresholds());
        let codes: Vec<&str> = outcome
            .qualified
            .iter()
            .map(|stock| stock.candidate.code.as_str())
            .collect();
        assert_eq!(codes, vec!["TOP", "HOLD", "MID", "LOW"]);

        let top = recommended(&outcome.qualified, 3);
        let top_codes: Vec<&str> = top.iter().map(|s| s.candidate.code.as_str()).collect();
        assert_eq!(top_codes, vec!["TOP", "MID", "LOW"]);

        let held = holdings(&outcome.qualified);
        assert_eq!(held.len(), 1);
        assert_eq!(rank_of(&outcome.qualified, "HOLD"), Some(2));
    }
}
