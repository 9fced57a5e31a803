pub mod factors;
pub mod filter;
pub mod high_watermark;
pub mod scoring;
pub mod valuation;

pub use filter::{FilterOutcome, FilterThresholds};
pub use scoring::{CandidateMetrics, ScoredUniverse};
