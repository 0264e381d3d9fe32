//! Mathematical utilities: least-squares solvers and feature standardization.

pub mod ols;
pub mod standardize;

pub use ols::*;
pub use standardize::*;
