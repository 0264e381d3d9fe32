//! Export backtest outputs.
//!
//! Two portable representations:
//! - a per-record CSV (easy to consume in spreadsheets or downstream scripts)
//! - a JSON summary (metrics + coverage + worst records), the durable
//!   artifact of an evaluation run

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backtest::coverage::CoverageReport;
use crate::backtest::evaluator::BacktestEvaluation;
use crate::domain::{BacktestConfig, BacktestRecord};
use crate::error::AppError;
use crate::report::metrics::Metrics;

/// A saved backtest summary (JSON). The schema is the external contract for
/// downstream reporting; `records` are exported separately as CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSummaryFile {
    pub tool: String,
    pub config: BacktestConfig,
    pub train: Metrics,
    pub test: Metrics,
    pub groups_used: usize,
    pub groups_skipped: usize,
    pub interval_width: f64,
    pub coverage_rate: f64,
    pub n_records: usize,
    pub worst: Vec<BacktestRecord>,
}

/// Write every coverage-annotated test record to a CSV file.
pub fn write_records_csv(path: &Path, records: &[BacktestRecord]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(
        file,
        "troop_id,cookie_type,period,number_of_girls,actual,predicted,lambda,interval_lower,interval_upper,in_interval,abs_error"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{:.4},{:.4},{:.4},{:.6},{:.4},{:.4},{},{:.4}",
            r.troop_id,
            r.cookie_type,
            r.period,
            r.number_of_girls,
            r.actual,
            r.predicted,
            r.lambda,
            r.interval_lower,
            r.interval_upper,
            r.in_interval,
            r.abs_error,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the backtest summary JSON file.
pub fn write_summary_json(
    path: &Path,
    evaluation: &BacktestEvaluation,
    coverage: &CoverageReport,
    config: &BacktestConfig,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display()))
    })?;

    let summary = BacktestSummaryFile {
        tool: "cookiecast".to_string(),
        config: config.clone(),
        train: evaluation.train.clone(),
        test: evaluation.test.clone(),
        groups_used: evaluation.groups_used,
        groups_skipped: evaluation.groups_skipped,
        interval_width: coverage.interval_width,
        coverage_rate: coverage.coverage_rate,
        n_records: coverage.n_records,
        worst: coverage.worst.clone(),
    };

    serde_json::to_writer_pretty(file, &summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}
