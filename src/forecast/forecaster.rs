//! Per-troop point forecasting.
//!
//! Given a troop, a target period, and a girl count, we fit one OLS model per
//! cookie type on that troop's strictly-past records and evaluate it at the
//! target period. Guardrails:
//!
//! - fewer than 2 distinct past periods → last-observed-value fallback
//!   (regression would be underdetermined)
//! - model output is clamped into the group's historical [min, max] sales,
//!   which always wins over the raw prediction
//! - a numerically failed fit skips that cookie type only; the query still
//!   succeeds with the remaining results

use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};

use crate::domain::{ForecastOutcome, ForecastQuery, ForecastResult, SalesRecord};
use crate::error::AppError;
use crate::forecast::groups::partition_by_cookie_type;
use crate::io::ingest::PreparedDataset;
use crate::math::solve_least_squares;

/// Note attached to results produced by the small-sample fallback path.
pub const FALLBACK_NOTE: &str = "using last available period value";

/// Answer one live forecast query.
///
/// Outcomes:
/// - `girls == 0` short-circuits to `ZeroGirls` without touching the dataset
/// - no records for the troop before the target period → error, exit code 3
/// - every cookie type skipped → `NoPredictions`
/// - otherwise one result per cookie type, ordered by cookie type
pub fn forecast(
    dataset: &PreparedDataset,
    query: &ForecastQuery,
) -> Result<ForecastOutcome, AppError> {
    if query.girls == 0.0 {
        return Ok(ForecastOutcome::ZeroGirls);
    }

    // Only strictly past periods are valid training data; the query period
    // itself must never leak into the fit.
    let history: Vec<&SalesRecord> = dataset
        .records
        .iter()
        .filter(|r| r.troop_id == query.troop_id && r.period < query.period)
        .collect();

    if history.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "No historical data found for troop {} with periods before {}.",
                query.troop_id, query.period
            ),
        ));
    }

    let mut results = Vec::new();
    for (cookie_type, rows) in partition_by_cookie_type(history.iter().copied()) {
        if let Some(result) = forecast_group(&cookie_type, &rows, query) {
            results.push(result);
        }
    }

    if results.is_empty() {
        Ok(ForecastOutcome::NoPredictions)
    } else {
        Ok(ForecastOutcome::Predictions(results))
    }
}

/// Forecast one cookie-type group. `None` means the group is skipped.
fn forecast_group(
    cookie_type: &str,
    rows: &[&SalesRecord],
    query: &ForecastQuery,
) -> Option<ForecastResult> {
    let distinct_periods: BTreeSet<i64> = rows.iter().map(|r| r.period).collect();

    if distinct_periods.len() < 2 {
        return fallback_forecast(cookie_type, rows);
    }

    // Design: [1, period, period^2, girls], one row per observation.
    let n = rows.len();
    let mut x = DMatrix::<f64>::zeros(n, 4);
    let mut y = DVector::<f64>::zeros(n);
    for (i, r) in rows.iter().enumerate() {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = r.period as f64;
        x[(i, 2)] = r.period_squared;
        x[(i, 3)] = r.number_of_girls;
        y[i] = r.cases_sold;
    }

    let beta = solve_least_squares(&x, &y)?;

    let p = query.period as f64;
    let raw = beta[0] + beta[1] * p + beta[2] * p * p + beta[3] * query.girls;
    if !raw.is_finite() {
        return None;
    }

    // Historical bounds always win over the raw model output. This is the
    // hard guardrail against extrapolation pathologies (negative predictions,
    // runaway quadratic growth).
    let low = rows[0].historical_low;
    let high = rows[0].historical_high;
    let clamped = raw.min(high).max(low);

    Some(ForecastResult {
        cookie_type: cookie_type.to_string(),
        predicted_cases: round2(clamped),
        note: None,
    })
}

/// Last-observed-value fallback: mean sales at the latest available period.
///
/// The returned value is an observed quantity, so it is trivially within the
/// group's historical bounds and no clamping is applied.
fn fallback_forecast(cookie_type: &str, rows: &[&SalesRecord]) -> Option<ForecastResult> {
    let last_period = rows.iter().map(|r| r.period).max()?;
    let at_last: Vec<f64> = rows
        .iter()
        .filter(|r| r.period == last_period)
        .map(|r| r.cases_sold)
        .collect();
    if at_last.is_empty() {
        return None;
    }
    let mean = at_last.iter().sum::<f64>() / at_last.len() as f64;

    Some(ForecastResult {
        cookie_type: cookie_type.to_string(),
        predicted_cases: round2(mean),
        note: Some(FALLBACK_NOTE.to_string()),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DatasetStats;

    fn rec(troop_id: i64, cookie_type: &str, period: i64, girls: f64, cases: f64) -> SalesRecord {
        SalesRecord {
            troop_id,
            cookie_type: cookie_type.to_string(),
            period,
            period_squared: (period * period) as f64,
            number_of_girls: girls,
            cases_sold: cases,
            // Bounds get fixed up by `dataset` below.
            historical_low: cases,
            historical_high: cases,
        }
    }

    fn dataset(mut records: Vec<SalesRecord>) -> PreparedDataset {
        // Join per-group bounds the way ingest does.
        let snapshot = records.clone();
        for r in &mut records {
            let (mut low, mut high) = (f64::INFINITY, f64::NEG_INFINITY);
            for s in &snapshot {
                if s.troop_id == r.troop_id && s.cookie_type == r.cookie_type {
                    low = low.min(s.cases_sold);
                    high = high.max(s.cases_sold);
                }
            }
            r.historical_low = low;
            r.historical_high = high;
        }
        let n = records.len();
        PreparedDataset {
            stats: DatasetStats {
                n_records: n,
                n_groups: 0,
                period_min: 1,
                period_max: 5,
                cases_min: 0.0,
                cases_max: 0.0,
            },
            records,
            row_errors: Vec::new(),
            rows_read: n,
            rows_used: n,
        }
    }

    fn query(troop_id: i64, period: i64, girls: f64) -> ForecastQuery {
        ForecastQuery {
            troop_id,
            period,
            girls,
        }
    }

    #[test]
    fn two_period_history_yields_clamped_prediction() {
        // Scenario: two observations, forecast one period ahead.
        let ds = dataset(vec![
            rec(1, "A", 1, 10.0, 5.0),
            rec(1, "A", 2, 12.0, 7.0),
        ]);

        let outcome = forecast(&ds, &query(1, 3, 11.0)).unwrap();
        let ForecastOutcome::Predictions(results) = outcome else {
            panic!("expected predictions");
        };
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.cookie_type, "A");
        assert!(r.note.is_none());
        assert!(r.predicted_cases >= 5.0 && r.predicted_cases <= 7.0);
    }

    #[test]
    fn clamp_holds_for_explosive_quadratic() {
        // A convex sales history makes the quadratic term extrapolate far
        // above the historical maximum; the clamp must win.
        let ds = dataset(vec![
            rec(1, "A", 1, 10.0, 5.0),
            rec(1, "A", 2, 10.0, 20.0),
            rec(1, "A", 3, 10.0, 80.0),
        ]);

        let outcome = forecast(&ds, &query(1, 10, 10.0)).unwrap();
        let ForecastOutcome::Predictions(results) = outcome else {
            panic!("expected predictions");
        };
        let r = &results[0];
        assert!(r.predicted_cases >= 5.0 && r.predicted_cases <= 80.0);
        assert!((r.predicted_cases - 80.0).abs() < 1e-9);
    }

    #[test]
    fn single_period_group_uses_fallback_mean() {
        // Two rows at the same period: fallback returns their mean, noted,
        // unclamped, at any target period.
        let ds = dataset(vec![
            rec(1, "A", 2, 10.0, 6.0),
            rec(1, "A", 2, 11.0, 10.0),
        ]);

        let outcome = forecast(&ds, &query(1, 9, 12.0)).unwrap();
        let ForecastOutcome::Predictions(results) = outcome else {
            panic!("expected predictions");
        };
        let r = &results[0];
        assert_eq!(r.predicted_cases, 8.0);
        assert_eq!(r.note.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn fallback_uses_latest_period_only() {
        let ds = dataset(vec![
            rec(1, "A", 1, 10.0, 3.0),
            rec(1, "A", 3, 10.0, 9.0),
        ]);
        // Query at period 2: only period 1 is visible, one distinct period.
        let outcome = forecast(&ds, &query(1, 2, 10.0)).unwrap();
        let ForecastOutcome::Predictions(results) = outcome else {
            panic!("expected predictions");
        };
        assert_eq!(results[0].predicted_cases, 3.0);
        assert_eq!(results[0].note.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn zero_girls_short_circuits_even_without_history() {
        let ds = dataset(vec![]);
        let outcome = forecast(&ds, &query(99, 3, 0.0)).unwrap();
        assert!(matches!(outcome, ForecastOutcome::ZeroGirls));
    }

    #[test]
    fn unknown_troop_is_a_no_history_error() {
        let ds = dataset(vec![rec(1, "A", 1, 10.0, 5.0)]);
        let err = forecast(&ds, &query(42, 3, 10.0)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn no_future_leakage() {
        // Rows at or after the target period must not influence the result:
        // with them excluded, only one distinct period remains and the
        // fallback path (not regression) answers.
        let ds = dataset(vec![
            rec(1, "A", 1, 10.0, 5.0),
            rec(1, "A", 2, 10.0, 7.0),
            rec(1, "A", 3, 10.0, 9.0),
        ]);

        let outcome = forecast(&ds, &query(1, 2, 10.0)).unwrap();
        let ForecastOutcome::Predictions(results) = outcome else {
            panic!("expected predictions");
        };
        assert_eq!(results[0].predicted_cases, 5.0);
        assert_eq!(results[0].note.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn results_cover_each_cookie_type_in_order() {
        let ds = dataset(vec![
            rec(1, "Trefoils", 1, 10.0, 5.0),
            rec(1, "Trefoils", 2, 10.0, 6.0),
            rec(1, "Adventurefuls", 1, 10.0, 12.0),
            rec(1, "Adventurefuls", 2, 10.0, 14.0),
        ]);

        let outcome = forecast(&ds, &query(1, 3, 10.0)).unwrap();
        let ForecastOutcome::Predictions(results) = outcome else {
            panic!("expected predictions");
        };
        let types: Vec<&str> = results.iter().map(|r| r.cookie_type.as_str()).collect();
        assert_eq!(types, vec!["Adventurefuls", "Trefoils"]);
    }

    #[test]
    fn values_are_rounded_to_two_decimals() {
        let ds = dataset(vec![
            rec(1, "A", 1, 10.0, 5.0),
            rec(1, "A", 1, 10.0, 5.5),
            rec(1, "A", 1, 10.0, 5.5),
        ]);
        let outcome = forecast(&ds, &query(1, 2, 10.0)).unwrap();
        let ForecastOutcome::Predictions(results) = outcome else {
            panic!("expected predictions");
        };
        // mean of 5, 5.5, 5.5 = 5.3333... -> 5.33
        assert_eq!(results[0].predicted_cases, 5.33);
    }
}
