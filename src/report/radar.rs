//! Radar chart artifacts.
//!
//! Each chart is a declarative JSON document: shared factor labels in
//! vertex order, the polar angles, and one closed polygon per stock
//! (first vertex repeated at the end). An external plotting front-end
//! renders these; nothing here rasterizes.

use serde::Serialize;
use std::f64::consts::PI;

use crate::constants::{FACTOR_COUNT, FACTOR_LABELS};
use crate::models::QualifiedStock;

#[derive(Debug, Serialize)]
pub struct RadarSeries {
    pub code: String,
    pub name: String,

    /// Normalized factor values, closed (first value repeated)
    pub values: Vec<f64>,

    /// Cartesian vertex ring matching `values`
    pub vertices: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct RadarChart {
    pub title: String,

    /// Factor display labels in vertex order
    pub metric_labels: Vec<String>,

    /// Polar angles, closed
    pub angles: Vec<f64>,

    pub series: Vec<RadarSeries>,
}

fn angles_closed() -> Vec<f64> {
    let mut angles: Vec<f64> = (0..FACTOR_COUNT)
        .map(|k| 2.0 * PI * k as f64 / FACTOR_COUNT as f64)
        .collect();
    angles.push(angles[0]);
    angles
}

fn series_for(stock: &QualifiedStock) -> RadarSeries {
    let mut values: Vec<f64> = stock.candidate.scores.iter().cloned().take(FACTOR_COUNT).collect();
    values.resize(FACTOR_COUNT, 0.0);
    values.push(values[0]);

    let vertices = angles_closed()
        .iter()
        .zip(values.iter())
        .map(|(angle, value)| [value * angle.cos(), value * angle.sin()])
        .collect();

    RadarSeries {
        code: stock.candidate.code.clone(),
        name: stock.candidate.name.clone(),
        values,
        vertices,
    }
}

pub fn radar_chart(title: impl Into<String>, stocks: &[&QualifiedStock]) -> RadarChart {
    RadarChart {
        title: title.into(),
        metric_labels: FACTOR_LABELS.iter().map(|label| label.to_string()).collect(),
        angles: angles_closed(),
        series: stocks.iter().map(|stock| series_for(stock)).collect(),
    }
}

fn ordinal(rank: usize) -> &'static str {
    match rank {
        1 => "1st",
        2 => "2nd",
        3 => "3rd",
        _ => "th",
    }
}

/// The four-chart set: each recommendation against the holdings, then
/// the top three side by side. Charts whose stocks are missing (fewer
/// than three recommendations) are simply omitted.
pub fn chart_set(
    top3: &[QualifiedStock],
    holdings: &[QualifiedStock],
) -> Vec<(String, RadarChart)> {
    let mut charts = Vec::new();

    for (index, stock) in top3.iter().enumerate().take(3) {
        let rank = index + 1;
        let mut stocks: Vec<&QualifiedStock> = vec![stock];
        stocks.extend(holdings.iter());

        charts.push((
            format!("radar_chart_{}_top{}_vs_holdings.json", rank, rank),
            radar_chart(
                format!(
                    "Chart {}: {} ({}) + Holdings Comparison",
                    rank,
                    stock.candidate.name,
                    ordinal(rank)
                ),
                &stocks,
            ),
        ));
    }

    if top3.len() >= 3 {
        let stocks: Vec<&QualifiedStock> = top3.iter().take(3).collect();
        charts.push((
            "radar_chart_4_top3_comparison.json".to_string(),
            radar_chart("Chart 4: Top 3 Stocks Overall Comparison", &stocks),
        ));
    }

    charts
}
