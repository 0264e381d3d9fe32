//! Aggregate accuracy metrics.
//!
//! All metrics are computed over pooled true/predicted vectors (never
//! per-group), so a group with many test rows weighs proportionally more.
//! MAPE divides by the true value; ingest guarantees `cases_sold > 0`, so
//! the division is well-defined for in-scope data.

use serde::{Deserialize, Serialize};

/// Pooled regression accuracy metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub n: usize,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
    /// Mean absolute percentage error, in percent.
    pub mape: f64,
}

impl Metrics {
    /// Compute metrics over paired vectors.
    ///
    /// Empty input yields the explicit degenerate value (all zeros, `n = 0`)
    /// rather than NaNs: a backtest where every group was skipped is a
    /// legitimate, reportable outcome.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return Self {
                n: 0,
                mae: 0.0,
                mse: 0.0,
                rmse: 0.0,
                r2: 0.0,
                mape: 0.0,
            };
        }

        let pairs = actual.iter().zip(predicted.iter()).take(n);

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;
        let mut actual_sum = 0.0;
        for (a, p) in pairs.clone() {
            let e = a - p;
            abs_sum += e.abs();
            sq_sum += e * e;
            pct_sum += (e.abs() / a) * 100.0;
            actual_sum += a;
        }

        let n_f = n as f64;
        let mae = abs_sum / n_f;
        let mse = sq_sum / n_f;
        let rmse = mse.sqrt();
        let mape = pct_sum / n_f;

        let mean_actual = actual_sum / n_f;
        let ss_tot: f64 = pairs.map(|(a, _)| (a - mean_actual) * (a - mean_actual)).sum();
        let r2 = if ss_tot > 1e-12 { 1.0 - sq_sum / ss_tot } else { 0.0 };

        Self {
            n,
            mae,
            mse,
            rmse,
            r2,
            mape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let y = [2.0, 4.0, 6.0];
        let m = Metrics::compute(&y, &y);
        assert_eq!(m.n, 3);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mape, 0.0);
        assert!((m.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hand_computed_fixture() {
        let actual = [2.0, 4.0];
        let predicted = [1.0, 6.0];
        let m = Metrics::compute(&actual, &predicted);

        // errors: 1, -2
        assert!((m.mae - 1.5).abs() < 1e-12);
        assert!((m.mse - 2.5).abs() < 1e-12);
        assert!((m.rmse - 2.5_f64.sqrt()).abs() < 1e-12);
        // mape: (1/2 + 2/4)/2 * 100 = 50
        assert!((m.mape - 50.0).abs() < 1e-12);
        // ss_tot = (2-3)^2 + (4-3)^2 = 2; r2 = 1 - 5/2
        assert!((m.r2 - (1.0 - 5.0 / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_zeroed_not_nan() {
        let m = Metrics::compute(&[], &[]);
        assert_eq!(m.n, 0);
        assert_eq!(m.rmse, 0.0);
        assert!(!m.mape.is_nan());
    }

    #[test]
    fn constant_actuals_give_zero_r2() {
        let m = Metrics::compute(&[3.0, 3.0, 3.0], &[2.0, 3.0, 4.0]);
        assert_eq!(m.r2, 0.0);
    }
}
