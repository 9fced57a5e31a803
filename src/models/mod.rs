mod high_watermark;
mod metrics;
mod pipeline_config;
mod quote;
mod snapshot;
mod ticker;
mod valuation;

pub use high_watermark::HighWatermarkResult;
pub use metrics::MetricVector;
pub use pipeline_config::{PipelineConfig, SmtpConfig};
pub use quote::DailyQuote;
pub use snapshot::{
    AnalysisSnapshot, AnalysisSummary, ExcludedStock, FactorScale, HoldingStockInfo, NewHighStock,
    QualifiedStock, ScanSnapshot, ScanSummary, ScoredCandidate,
};
pub use ticker::{parse_holding_codes, Ticker};
pub use valuation::ValuationSnapshot;
