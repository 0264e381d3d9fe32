//! Shared pipeline logic used by the CLI front-end and integration tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> (forecast query | backtest evaluation -> coverage analysis)
//!
//! The CLI can then focus on presentation (printing and exports).

use std::path::Path;

use crate::backtest::coverage::{analyze, CoverageReport};
use crate::backtest::evaluator::{evaluate, BacktestEvaluation};
use crate::domain::{BacktestConfig, ForecastOutcome, ForecastQuery};
use crate::error::AppError;
use crate::forecast::forecaster::forecast;
use crate::io::ingest::{load_dataset, PreparedDataset};

/// All computed outputs of a backtest run.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub evaluation: BacktestEvaluation,
    pub coverage: CoverageReport,
}

/// Load and clean the dataset once. Both commands start here; a dataset that
/// cannot be loaded is fatal to the whole process.
pub fn load(path: &Path) -> Result<PreparedDataset, AppError> {
    load_dataset(path)
}

/// Answer one live forecast query against a prepared dataset.
pub fn run_forecast(
    dataset: &PreparedDataset,
    query: &ForecastQuery,
) -> Result<ForecastOutcome, AppError> {
    forecast(dataset, query)
}

/// Run the full backtest: group-wise evaluation, then coverage analysis over
/// the held-out predictions.
pub fn run_backtest(
    dataset: &PreparedDataset,
    config: &BacktestConfig,
) -> Result<BacktestRun, AppError> {
    let evaluation = evaluate(dataset, config)?;
    let coverage = analyze(
        evaluation.train.rmse,
        &evaluation.predictions,
        config.coverage_factor,
        config.top_k,
    );

    Ok(BacktestRun {
        evaluation,
        coverage,
    })
}
