use crate::constants::{PER_CLAMP_MAX, PER_CLAMP_MIN};
use crate::models::ValuationSnapshot;
use crate::services::FinancialStatement;

/// Estimate market capitalization and P/E for one ticker.
///
/// Market cap (oku-yen) is issued shares × latest close when both are
/// available and finite; P/E is close / EPS for nonzero EPS, clamped to
/// a fixed range so every stored value is comparable. Every failure path
/// resolves to the documented fallback pair; this function cannot error
/// and never returns a null field.
pub fn estimate(latest_close: Option<f64>, statement: Option<&FinancialStatement>) -> ValuationSnapshot {
    let close = latest_close.filter(|c| c.is_finite() && *c > 0.0);
    let shares = statement
        .and_then(|s| s.issued_shares)
        .filter(|s| s.is_finite() && *s > 0.0);
    let eps = statement
        .and_then(|s| s.eps)
        .filter(|e| e.is_finite() && *e != 0.0);

    let mut snapshot = ValuationSnapshot::fallback();
    snapshot.latest_close = close;

    if let (Some(close), Some(shares)) = (close, shares) {
        let market_cap_jpy = close * shares;
        if market_cap_jpy.is_finite() && market_cap_jpy > 0.0 {
            snapshot.market_cap = market_cap_jpy / 1e8;
            snapshot.market_cap_jpy = Some(market_cap_jpy);
            snapshot.issued_shares = Some(shares as u64);
        }
    }

    if let (Some(close), Some(eps)) = (close, eps) {
        let per = close / eps;
        if per.is_finite() {
            snapshot.per = per.clamp(PER_CLAMP_MIN, PER_CLAMP_MAX);
            snapshot.eps = Some(eps);
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_MARKET_CAP_OKUYEN, DEFAULT_PER};

    fn statement(issued_shares: Option<f64>, eps: Option<f64>) -> FinancialStatement {
        FinancialStatement {
            disclosed_date: "2025-05-10".to_string(),
            type_of_document: "Annual".to_string(),
            net_sales: None,
            operating_profit: None,
            profit: None,
            equity: None,
            equity_to_asset_ratio: None,
            eps,
            issued_shares,
        }
    }

    #[test]
    fn test_primary_path_uses_shares_times_close() {
        let stmt = statement(Some(12_000_000.0), Some(50.0));
        let snapshot = estimate(Some(1000.0), Some(&stmt));

        assert_eq!(snapshot.market_cap, 120.0);
        assert_eq!(snapshot.per, 20.0);
        assert_eq!(snapshot.issued_shares, Some(12_000_000));
        assert_eq!(snapshot.latest_close, Some(1000.0));
        assert_eq!(snapshot.market_cap_jpy, Some(1.2e10));
        assert_eq!(snapshot.eps, Some(50.0));
    }

    #[test]
    fn test_missing_shares_falls_back_on_cap_only() {
        let stmt = statement(None, Some(50.0));
        let snapshot = estimate(Some(1000.0), Some(&stmt));

        assert_eq!(snapshot.market_cap, DEFAULT_MARKET_CAP_OKUYEN);
        assert_eq!(snapshot.issued_shares, None);
        assert_eq!(snapshot.per, 20.0);
    }

    #[test]
    fn test_zero_eps_falls_back_on_per_only() {
        let stmt = statement(Some(12_000_000.0), Some(0.0));
        let snapshot = estimate(Some(1000.0), Some(&stmt));

        assert_eq!(snapshot.per, DEFAULT_PER);
        assert_eq!(snapshot.eps, None);
        assert_eq!(snapshot.market_cap, 120.0);
    }

    #[test]
    fn test_per_is_clamped_into_fixed_range() {
        // Tiny EPS would otherwise produce an absurd ratio
        let stmt = statement(None, Some(0.01));
        assert_eq!(estimate(Some(1000.0), Some(&stmt)).per, 200.0);

        // Negative EPS clamps to the floor instead of going negative
        let stmt = statement(None, Some(-50.0));
        assert_eq!(estimate(Some(1000.0), Some(&stmt)).per, 1.0);
    }

    #[test]
    fn test_no_data_resolves_to_fallback_pair() {
        let snapshot = estimate(None, None);
        assert_eq!(snapshot, ValuationSnapshot::fallback());

        let snapshot = estimate(Some(f64::NAN), None);
        assert_eq!(snapshot.market_cap, DEFAULT_MARKET_CAP_OKUYEN);
        assert_eq!(snapshot.per, DEFAULT_PER);
        assert_eq!(snapshot.latest_close, None);
    }
}
