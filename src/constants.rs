//! Pipeline-wide constants
//!
//! The seven screening factors have a fixed order shared by the scoring
//! engine, the snapshot files, and the radar chart artifacts. Position k
//! becomes polygon vertex k, so reordering this table silently changes
//! every chart and score.

/// Number of screening factors
pub const FACTOR_COUNT: usize = 7;

/// Snapshot keys for each factor, in vertex order
pub const FACTOR_NAMES: [&str; FACTOR_COUNT] = [
    "new_high_count",
    "volume_ratio",
    "sales_growth",
    "op_growth",
    "roe_avg",
    "equity_ratio",
    "free_cf",
];

/// Display labels for chart artifacts, same order as [`FACTOR_NAMES`]
pub const FACTOR_LABELS: [&str; FACTOR_COUNT] = [
    "New High Breaks",
    "Volume Surge",
    "Sales Growth (3y)",
    "OP Growth (3y)",
    "ROE (3y avg)",
    "Equity Ratio",
    "Free Cash Flow",
];

/// Trailing window for the intraday-high scan, in weeks
pub const HIGH_WINDOW_WEEKS: i64 = 65;

/// Recent-volume window for the surge ratio (trading days)
pub const RECENT_VOLUME_DAYS: usize = 5;

/// Baseline-volume window for the surge ratio (trading days)
pub const BASELINE_VOLUME_DAYS: usize = 20;

/// Calendar days of quotes fetched for the volume-surge factor.
/// Needs to cover RECENT + BASELINE trading days plus weekends/holidays.
pub const VOLUME_FETCH_DAYS: i64 = 60;

/// Calendar days of quotes behind each price chart artifact
pub const PRICE_CHART_DAYS: i64 = 730;

/// Qualification defaults: market cap ceiling (oku-yen) and P/E floor
pub const DEFAULT_MAX_MARKET_CAP_OKUYEN: f64 = 250.0;
pub const DEFAULT_MIN_PER: f64 = 10.0;

/// Fallback valuation pair used whenever upstream data cannot support an
/// estimate. Both values are always populated so the qualification filter
/// never sees a null.
pub const DEFAULT_MARKET_CAP_OKUYEN: f64 = 50.0;
pub const DEFAULT_PER: f64 = 15.0;

/// EPS-derived P/E values are clamped into this range so every stored P/E
/// is finite and comparable.
pub const PER_CLAMP_MIN: f64 = 1.0;
pub const PER_CLAMP_MAX: f64 = 200.0;

/// Number of non-holding qualified stocks surfaced as recommendations
pub const TOP_RECOMMENDED: usize = 3;

/// Market segment scanned by default (TSE Growth)
pub const DEFAULT_SEGMENT: &str = "グロース";

/// Tickers per progress batch during the scan stage
pub const SCAN_BATCH_SIZE: usize = 100;

/// Well-known snapshot file names linking the stages
pub const SCAN_SNAPSHOT_FILE: &str = "scan_results.json";
pub const ANALYSIS_SNAPSHOT_FILE: &str = "analysis_results.json";

/// J-Quants API requests allowed per minute
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;
