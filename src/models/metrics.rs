use serde::{Deserialize, Serialize};

use crate::constants::FACTOR_COUNT;

/// Raw values for the seven screening factors of one ticker.
///
/// Field order matches `constants::FACTOR_NAMES` and must not change:
/// the array form feeds normalization and defines radar vertex order.
/// A factor that could not be computed upstream holds its documented
/// neutral default, never a null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricVector {
    /// Times a new 65-week watermark was set in the scan window
    pub new_high_count: f64,

    /// Recent 5-day average volume over the prior 20-day average
    pub volume_ratio: f64,

    /// 3-year average sales growth, percent
    pub sales_growth: f64,

    /// 3-year average operating-profit growth, percent
    pub op_growth: f64,

    /// 3-year average return on equity, percent
    pub roe_avg: f64,

    /// Latest equity-to-assets ratio, percent
    pub equity_ratio: f64,

    /// Free-cash-flow proxy (latest operating profit, oku-yen)
    pub free_cf: f64,
}

impl MetricVector {
    /// Factor values in vertex order
    pub fn as_array(&self) -> [f64; FACTOR_COUNT] {
        [
            self.new_high_count,
            self.volume_ratio,
            self.sales_growth,
            self.op_growth,
            self.roe_avg,
            self.equity_ratio,
            self.free_cf,
        ]
    }

    pub fn from_array(values: [f64; FACTOR_COUNT]) -> Self {
        Self {
            new_high_count: values[0],
            volume_ratio: values[1],
            sales_growth: values[2],
            op_growth: values[3],
            roe_avg: values[4],
            equity_ratio: values[5],
            free_cf: values[6],
        }
    }
}

impl Default for MetricVector {
    /// Neutral defaults used before any factor has been computed
    fn default() -> Self {
        Self {
            new_high_count: 0.0,
            volume_ratio: 1.0,
            sales_growth: 0.0,
            op_growth: 0.0,
            roe_avg: 0.0,
            equity_ratio: 0.0,
            free_cf: 0.0,
        }
    }
}
