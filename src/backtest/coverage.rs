//! Prediction-interval coverage analysis.
//!
//! The interval is a single global symmetric band derived from the pooled
//! train residual spread: `width = coverage_factor * train_RMSE`. Coverage
//! is the share of held-out actuals falling inside `predicted ± width`.
//! This is a pure reduction over the evaluator's output with no feedback
//! into any model.

use serde::{Deserialize, Serialize};

use crate::domain::{BacktestRecord, TestPrediction};

/// Coverage analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Interval half-width applied to every prediction.
    pub interval_width: f64,
    /// Share of test records inside their interval, in percent.
    /// Exactly `0.0` when there are no test records.
    pub coverage_rate: f64,
    pub n_records: usize,
    /// Every test record, annotated with its interval.
    pub records: Vec<BacktestRecord>,
    /// The `top_k` records with the largest absolute error, descending.
    pub worst: Vec<BacktestRecord>,
}

/// Annotate test predictions with intervals and compute the coverage rate.
pub fn analyze(
    train_rmse: f64,
    predictions: &[TestPrediction],
    coverage_factor: f64,
    top_k: usize,
) -> CoverageReport {
    let interval_width = coverage_factor * train_rmse;

    let records: Vec<BacktestRecord> = predictions
        .iter()
        .map(|p| {
            let interval_lower = p.predicted - interval_width;
            let interval_upper = p.predicted + interval_width;
            BacktestRecord {
                troop_id: p.troop_id,
                cookie_type: p.cookie_type.clone(),
                period: p.period,
                number_of_girls: p.number_of_girls,
                actual: p.actual,
                predicted: p.predicted,
                lambda: p.lambda,
                interval_lower,
                interval_upper,
                in_interval: interval_lower <= p.actual && p.actual <= interval_upper,
                abs_error: (p.actual - p.predicted).abs(),
            }
        })
        .collect();

    let coverage_rate = if records.is_empty() {
        0.0
    } else {
        let inside = records.iter().filter(|r| r.in_interval).count();
        100.0 * inside as f64 / records.len() as f64
    };

    let mut worst = records.clone();
    worst.sort_by(|a, b| {
        b.abs_error
            .partial_cmp(&a.abs_error)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    worst.truncate(top_k);

    CoverageReport {
        interval_width,
        coverage_rate,
        n_records: records.len(),
        records,
        worst,
    }
}
