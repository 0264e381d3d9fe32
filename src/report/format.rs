//! Formatted terminal output for forecast queries and backtest runs.

use crate::backtest::coverage::CoverageReport;
use crate::backtest::evaluator::BacktestEvaluation;
use crate::domain::{BacktestConfig, BacktestRecord, ForecastOutcome, ForecastQuery};
use crate::io::ingest::PreparedDataset;
use crate::report::metrics::Metrics;

/// Format the header block shared by both commands.
pub fn format_dataset_summary(dataset: &PreparedDataset) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Dataset: {} records / {} groups | periods [{}, {}] | cases [{:.1}, {:.1}]\n",
        dataset.stats.n_records,
        dataset.stats.n_groups,
        dataset.stats.period_min,
        dataset.stats.period_max,
        dataset.stats.cases_min,
        dataset.stats.cases_max,
    ));
    if !dataset.row_errors.is_empty() {
        out.push_str(&format!(
            "Dropped {} of {} rows during cleaning (first: line {}: {})\n",
            dataset.row_errors.len(),
            dataset.rows_read,
            dataset.row_errors[0].line,
            dataset.row_errors[0].message,
        ));
    }

    out
}

/// Format the result of one forecast query.
pub fn format_forecast(query: &ForecastQuery, outcome: &ForecastOutcome) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Predictions for troop {} at period {} ===\n",
        query.troop_id, query.period
    ));
    out.push_str(&format!("Number of girls: {}\n\n", query.girls));

    match outcome {
        ForecastOutcome::ZeroGirls => {
            out.push_str("Since there are zero girls, no cookies will be sold.\n");
        }
        ForecastOutcome::NoPredictions => {
            out.push_str("No predictions available.\n");
        }
        ForecastOutcome::Predictions(results) => {
            for r in results {
                match &r.note {
                    Some(note) => out.push_str(&format!(
                        "- {:<24} {:>10.2} cases ({note})\n",
                        truncate(&r.cookie_type, 24),
                        r.predicted_cases
                    )),
                    None => out.push_str(&format!(
                        "- {:<24} {:>10.2} cases\n",
                        truncate(&r.cookie_type, 24),
                        r.predicted_cases
                    )),
                }
            }
        }
    }

    out
}

/// Format the full backtest summary: split metrics, interval, coverage,
/// and the worst held-out records.
pub fn format_backtest_summary(
    evaluation: &BacktestEvaluation,
    coverage: &CoverageReport,
    config: &BacktestConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== Ridge backtest ===\n");
    out.push_str(&format!(
        "Cutoff: train periods <= {} | test period {}\n",
        config.cutoff_period,
        config.cutoff_period + 1
    ));
    out.push_str(&format!(
        "Lambda grid: {} log-spaced values in [{:.0e}, {:.0e}]\n",
        config.lambda_steps, config.lambda_min, config.lambda_max
    ));
    out.push_str(&format!(
        "Groups: {} evaluated, {} skipped\n\n",
        evaluation.groups_used, evaluation.groups_skipped
    ));

    out.push_str(&format_metrics_line("Train", &evaluation.train));
    out.push_str(&format_metrics_line("Test", &evaluation.test));

    out.push_str(&format!(
        "\nPrediction interval: +/- {:.3} ({} x train RMSE)\n",
        coverage.interval_width, config.coverage_factor
    ));
    out.push_str(&format!(
        "Coverage: {:.1}% of {} test records inside the interval\n",
        coverage.coverage_rate, coverage.n_records
    ));

    if !coverage.worst.is_empty() {
        out.push_str(&format!("\nWorst {} test records by error:\n", coverage.worst.len()));
        out.push_str(&format_worst_table(&coverage.worst));
    }

    out
}

fn format_metrics_line(label: &str, m: &Metrics) -> String {
    format!(
        "{label:<6} n={:<5} MAE={:.3} MSE={:.3} RMSE={:.3} R2={:.3} MAPE={:.1}%\n",
        m.n, m.mae, m.mse, m.rmse, m.r2, m.mape
    )
}

fn format_worst_table(rows: &[BacktestRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>8} {:<20} {:>6} {:>10} {:>10} {:>10} {:>8}\n",
        "troop", "cookie_type", "period", "actual", "predicted", "error", "covered"
    ));
    out.push_str(&format!(
        "{:-<8} {:-<20} {:-<6} {:-<10} {:-<10} {:-<10} {:-<8}\n",
        "", "", "", "", "", "", ""
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>8} {:<20} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>8}\n",
            r.troop_id,
            truncate(&r.cookie_type, 20),
            r.period,
            r.actual,
            r.predicted,
            r.abs_error,
            if r.in_interval { "yes" } else { "no" },
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
