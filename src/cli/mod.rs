//! Command-line parsing for the cookie sales forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cookiecast", version, about = "Per-troop cookie sales forecasting and backtesting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast per-cookie-type sales for one troop at a future period.
    Forecast(ForecastArgs),
    /// Run the held-out-period ridge backtest and report accuracy/coverage.
    Backtest(BacktestArgs),
    /// Generate a synthetic sales CSV (for demos and testing).
    Sample(SampleArgs),
}

/// Options for a live forecast query.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Sales history CSV.
    #[arg(long, default_value = "FinalCookieSales.csv")]
    pub csv: PathBuf,

    /// Troop identifier.
    #[arg(short = 't', long)]
    pub troop: i64,

    /// Target sales period (must be >= 1; only strictly earlier periods are
    /// used as training data).
    #[arg(short = 'p', long)]
    pub period: i64,

    /// Number of girls selling (>= 0; zero short-circuits to a zero-sales
    /// message).
    #[arg(short = 'g', long)]
    pub girls: f64,
}

/// Options for the backtest run.
#[derive(Debug, Parser, Clone)]
pub struct BacktestArgs {
    /// Sales history CSV.
    #[arg(long, default_value = "FinalCookieSales.csv")]
    pub csv: PathBuf,

    /// Last period assigned to the train split (test period is cutoff + 1).
    #[arg(long, default_value_t = 4)]
    pub cutoff: i64,

    /// Minimum ridge strength for grid search.
    #[arg(long, default_value_t = 1e-3)]
    pub lambda_min: f64,

    /// Maximum ridge strength for grid search.
    #[arg(long, default_value_t = 1e3)]
    pub lambda_max: f64,

    /// Number of log-spaced ridge strengths.
    #[arg(long, default_value_t = 13)]
    pub lambda_steps: usize,

    /// Prediction interval half-width, in units of pooled train RMSE.
    #[arg(long, default_value_t = 2.0)]
    pub coverage_factor: f64,

    /// Show the top-N worst test records by absolute error.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Export every coverage-annotated test record to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the run summary (metrics + coverage) to JSON.
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,
}

/// Options for synthetic sample generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long)]
    pub out: PathBuf,

    /// Number of troops to generate.
    #[arg(long, default_value_t = 25)]
    pub troops: usize,

    /// Number of periods per group.
    #[arg(long, default_value_t = 5)]
    pub periods: i64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
