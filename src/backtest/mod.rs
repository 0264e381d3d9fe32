//! Held-out-period backtest of the regularized model.
//!
//! Responsibilities:
//!
//! - generate the ridge-strength search grid (`lambda_grid`)
//! - per group: split by the cutoff period, standardize on train only,
//!   sweep the grid, keep the strength with the lowest test MAE (`evaluator`)
//! - derive a global prediction interval from pooled train residual spread
//!   and measure its empirical coverage on held-out points (`coverage`)

pub mod coverage;
pub mod evaluator;
pub mod lambda_grid;

pub use coverage::*;
pub use evaluator::*;
pub use lambda_grid::*;
