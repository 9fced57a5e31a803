use chrono::NaiveDate;
use std::path::PathBuf;

/// Get snapshot output directory from environment variable or use default
pub fn get_output_dir() -> PathBuf {
    std::env::var("TAKANE_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Get chart/summary artifact directory from environment variable or use default
pub fn get_report_dir() -> PathBuf {
    std::env::var("TAKANE_REPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reports"))
}

/// Format a date the way the J-Quants API and the snapshot files expect (YYYYMMDD)
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
