use chrono::{Duration, NaiveDate, Utc};
use std::path::PathBuf;

use crate::constants::{
    ANALYSIS_SNAPSHOT_FILE, DEFAULT_MAX_MARKET_CAP_OKUYEN, DEFAULT_MIN_PER,
    DEFAULT_RATE_LIMIT_PER_MINUTE, DEFAULT_SEGMENT, HIGH_WINDOW_WEEKS, SCAN_SNAPSHOT_FILE,
};
use crate::models::ticker::parse_holding_codes;
use crate::utils::{get_output_dir, get_report_dir};

/// SMTP settings for summary delivery. Absent settings disable email.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl SmtpConfig {
    /// Build from SMTP_* environment variables; None unless all are set
    fn from_env() -> Option<Self> {
        Some(Self {
            host: std::env::var("SMTP_HOST").ok()?,
            username: std::env::var("SMTP_USERNAME").ok()?,
            password: std::env::var("SMTP_PASSWORD").ok()?,
            from: std::env::var("SMTP_FROM").ok()?,
            to: std::env::var("SMTP_TO").ok()?,
        })
    }
}

/// Explicit per-run configuration passed into each stage entry point.
///
/// Populated from environment variables at process start; CLI flags
/// override individual fields afterwards. Credentials live here and
/// nowhere else; snapshot files never carry them.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// J-Quants refresh token, exchanged for an ID token at client startup
    pub refresh_token: Option<String>,

    /// Pre-issued ID token; skips the refresh exchange when present
    pub id_token: Option<String>,

    /// Watch-list codes always carried through scoring and reporting
    pub holding_codes: Vec<String>,

    /// Market segment to scan
    pub segment: String,

    /// Qualification ceiling: market cap in oku-yen
    pub max_market_cap_okuyen: f64,

    /// Qualification floor: price/earnings ratio
    pub min_per: f64,

    /// "Today" for the run; overridable for reproducible backtests
    pub today: NaiveDate,

    pub scan_snapshot_path: PathBuf,
    pub analysis_snapshot_path: PathBuf,
    pub report_dir: PathBuf,

    pub rate_limit_per_minute: u32,

    pub smtp: Option<SmtpConfig>,
}

impl PipelineConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        let output_dir = get_output_dir();

        let holding_codes = std::env::var("TAKANE_HOLDING_CODES")
            .map(|raw| parse_holding_codes(&raw))
            .unwrap_or_default();

        let today = std::env::var("TAKANE_TODAY")
            .ok()
            .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Utc::now().date_naive());

        Self {
            refresh_token: std::env::var("JQUANTS_REFRESH_TOKEN").ok(),
            id_token: std::env::var("JQUANTS_ID_TOKEN").ok(),
            holding_codes,
            segment: std::env::var("TAKANE_SEGMENT").unwrap_or_else(|_| DEFAULT_SEGMENT.to_string()),
            max_market_cap_okuyen: env_f64("TAKANE_MAX_MARKET_CAP", DEFAULT_MAX_MARKET_CAP_OKUYEN),
            min_per: env_f64("TAKANE_MIN_PER", DEFAULT_MIN_PER),
            today,
            scan_snapshot_path: output_dir.join(SCAN_SNAPSHOT_FILE),
            analysis_snapshot_path: output_dir.join(ANALYSIS_SNAPSHOT_FILE),
            report_dir: get_report_dir(),
            rate_limit_per_minute: std::env::var("TAKANE_RATE_LIMIT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT_PER_MINUTE),
            smtp: SmtpConfig::from_env(),
        }
    }

    /// First day of the trailing high-watermark window
    pub fn window_start(&self) -> NaiveDate {
        self.today - Duration::weeks(HIGH_WINDOW_WEEKS)
    }

    pub fn is_holding(&self, code: &str) -> bool {
        self.holding_codes.iter().any(|held| held == code)
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            refresh_token: None,
            id_token: Some("token".to_string()),
            holding_codes: vec!["5621".to_string(), "5527".to_string()],
            segment: DEFAULT_SEGMENT.to_string(),
            max_market_cap_okuyen: DEFAULT_MAX_MARKET_CAP_OKUYEN,
            min_per: DEFAULT_MIN_PER,
            today: NaiveDate::from_ymd_opt(2025, 9, 26).unwrap(),
            scan_snapshot_path: PathBuf::from("scan_results.json"),
            analysis_snapshot_path: PathBuf::from("analysis_results.json"),
            report_dir: PathBuf::from("reports"),
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            smtp: None,
        }
    }

    #[test]
    fn test_window_start_is_65_weeks_back() {
        let config = test_config();
        let days = (config.today - config.window_start()).num_days();
        assert_eq!(days, 65 * 7);
    }

    #[test]
    fn test_is_holding() {
        let config = test_config();
        assert!(config.is_holding("5621"));
        assert!(!config.is_holding("7203"));
    }
}
