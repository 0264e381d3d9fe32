//! Ridge-strength grid generation.
//!
//! The backtest searches a deterministic log-spaced grid of regularization
//! strengths. Why grid search?
//! - It avoids local minima issues common in nonlinear optimization.
//! - It is deterministic given the same inputs/flags.
//! - With one parameter and tiny per-group datasets, a modest grid is fast.
//!
//! The grid bounds are exogenous configuration, never derived from data.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn lambda_grid(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid lambda range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Lambda steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}
