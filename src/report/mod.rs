pub mod email;
pub mod price_chart;
pub mod radar;

pub use email::{build_summary_text, send_summary};
pub use price_chart::{price_chart, PriceChart};
pub use radar::{chart_set, radar_chart, RadarChart};
