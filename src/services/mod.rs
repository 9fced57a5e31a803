pub mod jquants;
pub mod snapshot_store;

pub use jquants::{FinancialStatement, JquantsClient, JquantsError};
pub use snapshot_store::{load_analysis_snapshot, load_scan_snapshot, write_json};
