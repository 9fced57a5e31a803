//! Normalization and composite scoring.
//!
//! The seven factors of every candidate are Min-Max rescaled per factor
//! across the entire run universe, then each candidate's normalized
//! values become the vertices of a heptagon: polygon area rewards
//! overall magnitude, shape balance rewards an even profile, and the
//! composite is their product. Because scaling spans the whole universe,
//! a candidate's score depends on every other candidate in the run;
//! re-running with a different universe changes every score.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::constants::{FACTOR_COUNT, FACTOR_NAMES};
use crate::error::{Error, Result};
use crate::models::{FactorScale, MetricVector, ScoredCandidate};

/// One candidate entering the scoring engine
#[derive(Debug, Clone)]
pub struct CandidateMetrics {
    pub code: String,
    pub name: String,
    pub metrics: MetricVector,
    pub is_holding: bool,
    pub is_new_high_today: bool,
}

/// Scored universe: candidates ranked by composite score descending,
/// plus the raw min/max used for each factor column
#[derive(Debug)]
pub struct ScoredUniverse {
    pub ranked: Vec<ScoredCandidate>,
    pub scaling: BTreeMap<String, FactorScale>,
}

/// Zero-pad a factor slice to the fixed vertex count. Short vectors are
/// padded, never dropped; extra entries are ignored.
fn padded(values: &[f64]) -> [f64; FACTOR_COUNT] {
    let mut out = [0.0; FACTOR_COUNT];
    for (slot, value) in out.iter_mut().zip(values.iter()) {
        *slot = *value;
    }
    out
}

fn vertex_angle(k: usize) -> f64 {
    2.0 * PI * k as f64 / FACTOR_COUNT as f64
}

/// Shoelace area of the closed heptagon with vertex k at polar radius
/// `values[k]` and angle 2πk/7. Maximal when every value is near 1.
pub fn area_score(values: &[f64]) -> f64 {
    let v = padded(values);

    let mut area = 0.0;
    for k in 0..FACTOR_COUNT {
        let j = (k + 1) % FACTOR_COUNT;
        let (x_k, y_k) = (v[k] * vertex_angle(k).cos(), v[k] * vertex_angle(k).sin());
        let (x_j, y_j) = (v[j] * vertex_angle(j).cos(), v[j] * vertex_angle(j).sin());
        area += x_k * y_j - x_j * y_k;
    }

    area.abs() / 2.0
}

/// How evenly balanced the heptagon is, in [0, 1] for inputs in [0, 1].
///
/// The balance term is 1 minus the standard deviation of the seven
/// consecutive vertex differences, floored at 0. A floor penalty shrinks
/// the score linearly once the weakest factor drops below 0.1, so a
/// candidate cannot score on shape alone while one factor is near zero.
pub fn shape_score(values: &[f64]) -> f64 {
    let v = padded(values);

    let mut differences = [0.0; FACTOR_COUNT];
    for k in 0..FACTOR_COUNT {
        differences[k] = (v[k] - v[(k + 1) % FACTOR_COUNT]).abs();
    }

    let std_dev = population_std_dev(&differences);
    let shape_balance = (1.0 - std_dev).max(0.0);

    let min_score = v.iter().cloned().fold(f64::INFINITY, f64::min);
    let penalty = if min_score >= 0.1 {
        1.0
    } else {
        (min_score / 0.1).max(0.0)
    };

    shape_balance * penalty
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Min-Max rescale one factor column across the universe. A column with
/// no variance maps every ticker to 0.5 so neither extreme is favored.
fn min_max_scale(column: &[f64]) -> (Vec<f64>, FactorScale) {
    let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let scaled = if max != min {
        column.iter().map(|value| (value - min) / (max - min)).collect()
    } else {
        vec![0.5; column.len()]
    };

    (scaled, FactorScale { min, max })
}

/// Normalize, score, and rank the full candidate universe.
///
/// Ranking is a stable sort by composite score descending; equal scores
/// keep universe insertion order. An empty universe is an error, since
/// the downstream stages cannot run on nothing.
pub fn score_universe(candidates: &[CandidateMetrics]) -> Result<ScoredUniverse> {
    if candidates.is_empty() {
        return Err(Error::NoData(
            "empty candidate universe reached the scoring engine".to_string(),
        ));
    }

    let rows: Vec<[f64; FACTOR_COUNT]> = candidates
        .iter()
        .map(|candidate| candidate.metrics.as_array())
        .collect();

    let mut normalized = vec![[0.0; FACTOR_COUNT]; rows.len()];
    let mut scaling = BTreeMap::new();
    for k in 0..FACTOR_COUNT {
        let column: Vec<f64> = rows.iter().map(|row| row[k]).collect();
        let (scaled, scale) = min_max_scale(&column);
        for (row, value) in normalized.iter_mut().zip(scaled) {
            row[k] = value;
        }
        scaling.insert(FACTOR_NAMES[k].to_string(), scale);
    }

    let mut ranked: Vec<ScoredCandidate> = candidates
        .iter()
        .zip(normalized)
        .map(|(candidate, scores)| {
            let area = area_score(&scores);
            let shape = shape_score(&scores);
            ScoredCandidate {
                code: candidate.code.clone(),
                name: candidate.name.clone(),
                scores: scores.to_vec(),
                comprehensive_score: area * shape,
                area_score: area,
                shape_score: shape,
                is_holding: candidate.is_holding,
                is_new_high_today: candidate.is_new_high_today,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.comprehensive_score
            .partial_cmp(&a.comprehensive_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(ScoredUniverse { ranked, scaling })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(code: &str, values: [f64; FACTOR_COUNT]) -> CandidateMetrics {
        CandidateMetrics {
            code: code.to_string(),
            name: format!("Stock {}", code),
            metrics: MetricVector::from_array(values),
            is_holding: false,
            is_new_high_today: true,
        }
    }

    #[test]
    fn test_min_max_maps_extremes_to_unit_interval() {
        let (scaled, scale) = min_max_scale(&[5.0, 10.0, 20.0]);
        assert_eq!(scaled, vec![0.0, 1.0 / 3.0, 1.0]);
        assert_eq!(scale.min, 5.0);
        assert_eq!(scale.max, 20.0);
    }

    #[test]
    fn test_degenerate_column_maps_to_half() {
        let (scaled, scale) = min_max_scale(&[7.0, 7.0, 7.0]);
        assert_eq!(scaled, vec![0.5, 0.5, 0.5]);
        assert_eq!(scale.min, scale.max);
    }

    #[test]
    fn test_uniform_vector_has_perfect_shape() {
        // Zero variance between adjacent vertices and no floor penalty
        assert_eq!(shape_score(&[0.6; 7]), 1.0);
        assert_eq!(shape_score(&[0.1; 7]), 1.0);
    }

    #[test]
    fn test_shape_score_stays_in_unit_interval() {
        let samples: [[f64; 7]; 4] = [
            [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            [0.9, 0.1, 0.9, 0.1, 0.9, 0.1, 0.9],
            [0.2, 0.4, 0.6, 0.8, 1.0, 0.8, 0.6],
            [1.0; 7],
        ];
        for sample in samples {
            let score = shape_score(&sample);
            assert!((0.0..=1.0).contains(&score), "out of range: {}", score);
        }
    }

    #[test]
    fn test_floor_penalty_applies_below_threshold() {
        // Same inter-vertex differences, one profile with a weak factor
        let weak = [0.05, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5];
        let strong = [0.25, 0.7, 0.7, 0.7, 0.7, 0.7, 0.7];
        assert!(shape_score(&weak) < shape_score(&strong));

        // A zero factor zeroes the shape score entirely
        assert_eq!(shape_score(&[0.0, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]), 0.0);
    }

    #[test]
    fn test_area_of_unit_heptagon() {
        // Regular heptagon with circumradius 1: (7/2)·sin(2π/7)
        let expected = 3.5 * (2.0 * PI / 7.0).sin();
        assert!((area_score(&[1.0; 7]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_area_is_zero_for_degenerate_polygon() {
        assert_eq!(area_score(&[0.0; 7]), 0.0);
    }

    #[test]
    fn test_short_vectors_are_zero_padded() {
        // Three values plus four implicit zeros
        assert_eq!(area_score(&[0.5, 0.5, 0.5]), area_score(&[0.5, 0.5, 0.5, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(shape_score(&[0.5]), shape_score(&[0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_composite_is_monotonic_in_both_terms() {
        let low_area = 0.4 * 0.8;
        let high_area = 0.9 * 0.8;
        assert!(high_area > low_area);

        let low_shape = 0.9 * 0.2;
        let high_shape = 0.9 * 0.7;
        assert!(high_shape > low_shape);
    }

    #[test]
    fn test_score_universe_ranks_descending() {
        let universe = vec![
            candidate("A", [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
            candidate("B", [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0]),
            candidate("C", [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0]),
        ];
        let scored = score_universe(&universe).unwrap();

        // B normalizes to all-ones, C to all-0.5, A to all-zeros
        assert_eq!(scored.ranked[0].code, "B");
        assert_eq!(scored.ranked[1].code, "C");
        assert_eq!(scored.ranked[2].code, "A");
        assert!(scored.ranked[0].comprehensive_score > scored.ranked[1].comprehensive_score);
    }

    #[test]
    fn test_score_universe_degenerate_columns_give_half() {
        let universe = vec![
            candidate("A", [3.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
            candidate("B", [7.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
        ];
        let scored = score_universe(&universe).unwrap();

        let a = scored.ranked.iter().find(|c| c.code == "A").unwrap();
        // First factor varies, the other six do not
        assert_eq!(a.scores[0], 0.0);
        assert!(a.scores[1..].iter().all(|&v| v == 0.5));

        let scale = &scored.scaling["volume_ratio"];
        assert_eq!(scale.min, 1.0);
        assert_eq!(scale.max, 1.0);
    }

    #[test]
    fn test_score_universe_ties_keep_insertion_order() {
        let universe = vec![
            candidate("FIRST", [2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
            candidate("SECOND", [2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
        ];
        let scored = score_universe(&universe).unwrap();
        assert_eq!(scored.ranked[0].code, "FIRST");
        assert_eq!(scored.ranked[1].code, "SECOND");
    }

    #[test]
    fn test_empty_universe_is_an_error() {
        assert!(score_universe(&[]).is_err());
    }

    #[test]
    fn test_normalized_scores_stay_in_unit_interval() {
        let universe = vec![
            candidate("A", [14.0, 2.5, -30.0, 120.0, 8.0, 55.0, 3.2]),
            candidate("B", [3.0, 0.8, 12.0, -45.0, 15.0, 72.0, 9.8]),
            candidate("C", [8.0, 1.4, 4.0, 10.0, 11.0, 63.0, 0.5]),
        ];
        let scored = score_universe(&universe).unwrap();
        for stock in &scored.ranked {
            for &value in &stock.scores {
                assert!((0.0..=1.0).contains(&value));
            }
            assert!((0.0..=1.0).contains(&stock.shape_score));
            assert!(stock.area_score >= 0.0);
        }
    }
}
