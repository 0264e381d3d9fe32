//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cleaned sales observations (`SalesRecord`) and their grouping key
//! - forecast query/result types (`ForecastQuery`, `ForecastOutcome`)
//! - backtest configuration and outputs (`BacktestConfig`, `TestPrediction`)

pub mod types;

pub use types::*;
