//! Least-squares solvers.
//!
//! Two small regression problems are solved repeatedly in this project:
//!
//! ```text
//! OLS:   minimize Σ (y_i - x_i^T β)^2
//! Ridge: minimize Σ (y_i - x_i^T β)^2 + λ Σ_{j>0} β_j^2
//! ```
//!
//! (the ridge penalty excludes the intercept column `j = 0`).
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns). Nalgebra's `QR::solve`
//!   is intended for square systems and will panic for non-square matrices.
//! - Ridge is expressed as an augmented OLS problem: one synthetic row
//!   `sqrt(λ) e_j` per penalized column. This reuses the same solver and
//!   keeps the intercept unpenalized.
//! - Parameter dimension is tiny (4 columns at most), so SVD performance is
//!   irrelevant next to its numerical robustness.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
/// Callers treat `None` as a per-unit skip, never as a fatal error.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    // SVD solve with a relaxed tolerance to handle near-singular matrices.
    // A troop that sold the same amount every period produces collinear
    // design columns, so we try progressively looser tolerances before
    // declaring the system unsolvable.
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a ridge-regularized least squares problem.
///
/// The first column of `x` is treated as the intercept and is not penalized.
/// `lambda == 0` degenerates to plain OLS.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    if !(lambda.is_finite() && lambda >= 0.0) {
        return None;
    }

    let n = x.nrows();
    let p = x.ncols();
    if p < 2 || lambda == 0.0 {
        return solve_least_squares(x, y);
    }

    // Augment with sqrt(lambda) identity rows for the penalized columns.
    let n_aug = n + (p - 1);
    let mut xa = DMatrix::<f64>::zeros(n_aug, p);
    let mut ya = DVector::<f64>::zeros(n_aug);

    xa.view_mut((0, 0), (n, p)).copy_from(x);
    ya.rows_mut(0, n).copy_from(y);

    let sqrt_lambda = lambda.sqrt();
    for j in 1..p {
        xa[(n + j - 1, j)] = sqrt_lambda;
    }

    solve_least_squares(&xa, &ya)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn ridge_at_zero_matches_ols() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 2.9, 5.1, 7.0]);

        let ols = solve_least_squares(&x, &y).unwrap();
        let ridge = solve_ridge(&x, &y, 0.0).unwrap();
        assert!((ols[0] - ridge[0]).abs() < 1e-10);
        assert!((ols[1] - ridge[1]).abs() < 1e-10);
    }

    #[test]
    fn ridge_shrinks_slope_not_intercept() {
        // Centered x: the intercept should stay at the mean of y while the
        // slope shrinks toward zero as lambda grows.
        let x = DMatrix::from_row_slice(4, 2, &[1.0, -1.5, 1.0, -0.5, 1.0, 0.5, 1.0, 1.5]);
        let y = DVector::from_row_slice(&[1.0, 3.0, 5.0, 7.0]);

        let small = solve_ridge(&x, &y, 1e-6).unwrap();
        let large = solve_ridge(&x, &y, 1e6).unwrap();

        assert!((small[0] - 4.0).abs() < 1e-3);
        assert!((large[0] - 4.0).abs() < 1e-3);
        assert!(large[1].abs() < small[1].abs());
        assert!(large[1].abs() < 1e-3);
    }
}
