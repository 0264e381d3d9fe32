//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads and cleans the dataset (once, before serving anything)
//! - runs a forecast query or the backtest
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{BacktestArgs, Command, ForecastArgs, SampleArgs};
use crate::data::sample::{generate_sales, write_sales_csv, SampleConfig};
use crate::domain::{BacktestConfig, ForecastQuery};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cookiecast` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Backtest(args) => handle_backtest(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let query = query_from_args(&args)?;
    let dataset = pipeline::load(&args.csv)?;

    print!("{}", crate::report::format_dataset_summary(&dataset));

    let outcome = pipeline::run_forecast(&dataset, &query)?;
    println!("{}", crate::report::format_forecast(&query, &outcome));

    Ok(())
}

fn handle_backtest(args: BacktestArgs) -> Result<(), AppError> {
    let config = backtest_config_from_args(&args);
    let dataset = pipeline::load(&args.csv)?;

    print!("{}", crate::report::format_dataset_summary(&dataset));

    let run = pipeline::run_backtest(&dataset, &config)?;
    println!(
        "{}",
        crate::report::format_backtest_summary(&run.evaluation, &run.coverage, &config)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_records_csv(path, &run.coverage.records)?;
        println!("Wrote {} records to '{}'.", run.coverage.records.len(), path.display());
    }
    if let Some(path) = &args.export_summary {
        crate::io::export::write_summary_json(path, &run.evaluation, &run.coverage, &config)?;
        println!("Wrote summary to '{}'.", path.display());
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        troops: args.troops,
        periods: args.periods,
        seed: args.seed,
    };
    let rows = generate_sales(&config)?;
    write_sales_csv(&args.out, &rows)?;
    println!("Wrote {} rows to '{}'.", rows.len(), args.out.display());

    Ok(())
}

/// Validate forecast scalars at the boundary; the core assumes well-typed
/// input after this point.
fn query_from_args(args: &ForecastArgs) -> Result<ForecastQuery, AppError> {
    if args.period < 1 {
        return Err(AppError::new(2, "Target period must be >= 1."));
    }
    if !(args.girls.is_finite() && args.girls >= 0.0) {
        return Err(AppError::new(2, "Number of girls must be a finite value >= 0."));
    }

    Ok(ForecastQuery {
        troop_id: args.troop,
        period: args.period,
        girls: args.girls,
    })
}

fn backtest_config_from_args(args: &BacktestArgs) -> BacktestConfig {
    BacktestConfig {
        cutoff_period: args.cutoff,
        lambda_min: args.lambda_min,
        lambda_max: args.lambda_max,
        lambda_steps: args.lambda_steps,
        coverage_factor: args.coverage_factor,
        top_k: args.top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn forecast_args(period: i64, girls: f64) -> ForecastArgs {
        ForecastArgs {
            csv: PathBuf::from("unused.csv"),
            troop: 1,
            period,
            girls,
        }
    }

    #[test]
    fn invalid_query_scalars_are_rejected_before_the_core() {
        assert_eq!(query_from_args(&forecast_args(0, 10.0)).unwrap_err().exit_code(), 2);
        assert_eq!(query_from_args(&forecast_args(3, -1.0)).unwrap_err().exit_code(), 2);
        assert_eq!(
            query_from_args(&forecast_args(3, f64::NAN)).unwrap_err().exit_code(),
            2
        );
        assert!(query_from_args(&forecast_args(3, 0.0)).is_ok());
    }
}
