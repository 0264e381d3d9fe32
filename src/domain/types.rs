//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for comparisons across runs

use serde::{Deserialize, Serialize};

/// Key of an independent modeling unit: one troop selling one cookie type.
///
/// `Ord` is derived so grouped iteration is deterministic (troop id first,
/// then cookie type lexicographically).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub troop_id: i64,
    pub cookie_type: String,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "troop {} / {}", self.troop_id, self.cookie_type)
    }
}

/// One cleaned sales observation.
///
/// Records only exist in this form after ingest has:
/// - coerced all fields to their numeric types
/// - discarded rows with `cases_sold <= 0`
/// - derived `period_squared`
/// - joined the group's historical min/max sales onto the row
#[derive(Debug, Clone)]
pub struct SalesRecord {
    pub troop_id: i64,
    pub cookie_type: String,
    /// Sales period index (1-based).
    pub period: i64,
    /// Derived quadratic time term (`period * period`).
    pub period_squared: f64,
    /// Covariate: number of girls selling for the troop in this period.
    pub number_of_girls: f64,
    /// Target: cases sold (strictly positive by construction).
    pub cases_sold: f64,
    /// Minimum cases ever sold by this (troop, cookie type) group.
    pub historical_low: f64,
    /// Maximum cases ever sold by this (troop, cookie type) group.
    pub historical_high: f64,
}

impl SalesRecord {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            troop_id: self.troop_id,
            cookie_type: self.cookie_type.clone(),
        }
    }
}

/// Summary stats about the records actually kept after cleaning.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub n_groups: usize,
    pub period_min: i64,
    pub period_max: i64,
    pub cases_min: f64,
    pub cases_max: f64,
}

/// A validated live forecast query.
///
/// The CLI rejects non-numeric or negative inputs before this is constructed,
/// so the forecaster may assume well-typed values.
#[derive(Debug, Clone, Copy)]
pub struct ForecastQuery {
    pub troop_id: i64,
    pub period: i64,
    pub girls: f64,
}

/// Per-cookie-type point forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub cookie_type: String,
    pub predicted_cases: f64,
    /// Set only when the small-sample fallback path produced the value.
    pub note: Option<String>,
}

/// Outcome of a forecast query.
///
/// The two sentinel variants are ordinary outcomes, not errors: the caller
/// renders a dedicated message for each. A troop with no history at all
/// before the requested period is the only query-time error (exit code 3).
#[derive(Debug, Clone)]
pub enum ForecastOutcome {
    /// `girls == 0` short-circuit: no cookies will be sold.
    ZeroGirls,
    /// Every cookie-type group failed to produce a usable model.
    NoPredictions,
    /// One result per cookie type, ordered by cookie type.
    Predictions(Vec<ForecastResult>),
}

/// Backtest configuration.
///
/// The cutoff and the lambda grid bounds are exogenous configuration, not
/// values derived from data. Defaults: train on periods 1..=4, test on
/// period 5, search 13 log-spaced ridge strengths in [1e-3, 1e3].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Last period assigned to the train split; `cutoff + 1` is the test period.
    pub cutoff_period: i64,
    pub lambda_min: f64,
    pub lambda_max: f64,
    pub lambda_steps: usize,
    /// Prediction interval half-width, in units of pooled train RMSE.
    pub coverage_factor: f64,
    /// How many worst records (by absolute error) to surface in reports.
    pub top_k: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            cutoff_period: 4,
            lambda_min: 1e-3,
            lambda_max: 1e3,
            lambda_steps: 13,
            coverage_factor: 2.0,
            top_k: 10,
        }
    }
}

/// One held-out test prediction emitted by the backtest evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPrediction {
    pub troop_id: i64,
    pub cookie_type: String,
    pub period: i64,
    pub number_of_girls: f64,
    pub actual: f64,
    pub predicted: f64,
    /// The ridge strength selected for this prediction's group.
    pub lambda: f64,
}

/// A test prediction annotated with its prediction interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRecord {
    pub troop_id: i64,
    pub cookie_type: String,
    pub period: i64,
    pub number_of_girls: f64,
    pub actual: f64,
    pub predicted: f64,
    pub lambda: f64,
    pub interval_lower: f64,
    pub interval_upper: f64,
    pub in_interval: bool,
    pub abs_error: f64,
}
