//! Synthetic cookie-sales dataset generation.
//!
//! Produces a CSV in the same schema the ingest module consumes, useful for
//! demos and end-to-end testing without shipping real troop data. Generation
//! is fully deterministic for a fixed seed: each group gets a quadratic-in-
//! period, linear-in-girls base trend plus Gaussian noise, truncated to
//! strictly positive sales.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Cookie types present in every generated dataset.
pub const COOKIE_TYPES: [&str; 6] = [
    "Adventurefuls",
    "Do-Si-Dos",
    "Samoas",
    "Tagalongs",
    "Thin Mints",
    "Trefoils",
];

/// Sample generation settings.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub troops: usize,
    /// Periods generated per group (1..=periods).
    pub periods: i64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            troops: 25,
            periods: 5,
            seed: 42,
        }
    }
}

/// One raw generated row, in the pre-cleaning CSV shape.
#[derive(Debug, Clone)]
pub struct RawSaleRow {
    pub troop_id: i64,
    pub cookie_type: String,
    pub period: i64,
    pub number_of_girls: f64,
    pub cases_sold: f64,
}

/// Generate a deterministic synthetic sales history.
pub fn generate_sales(config: &SampleConfig) -> Result<Vec<RawSaleRow>, AppError> {
    if config.troops == 0 {
        return Err(AppError::new(2, "Troop count must be > 0."));
    }
    if config.periods < 1 {
        return Err(AppError::new(2, "Period count must be >= 1."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.troops * COOKIE_TYPES.len() * config.periods as usize);

    for t in 0..config.troops {
        let troop_id = 100 + t as i64;
        let base_girls = rng.gen_range(6.0..20.0_f64).round();

        for cookie_type in COOKIE_TYPES {
            // Per-group trend: level + linear growth + mild curvature,
            // plus a per-girl contribution.
            let level = rng.gen_range(5.0..40.0);
            let growth = rng.gen_range(-2.0..4.0);
            let curvature = rng.gen_range(-0.5..0.5);
            let per_girl = rng.gen_range(0.2..1.5);
            let sigma = rng.gen_range(0.5..3.0);

            for period in 1..=config.periods {
                let girls = (base_girls + rng.gen_range(-2.0..3.0_f64).round()).max(1.0);
                let p = period as f64;
                let trend = level + growth * p + curvature * p * p + per_girl * girls;
                let cases = (trend + sigma * noise.sample(&mut rng)).max(1.0);

                rows.push(RawSaleRow {
                    troop_id,
                    cookie_type: cookie_type.to_string(),
                    period,
                    number_of_girls: girls,
                    cases_sold: (cases * 10.0).round() / 10.0,
                });
            }
        }
    }

    Ok(rows)
}

/// Write generated rows as an ingest-compatible CSV.
///
/// A `date` column is included (and ignored by ingest) to match the shape of
/// real exports.
pub fn write_sales_csv(path: &Path, rows: &[RawSaleRow]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "date,troop_id,cookie_type,period,number_of_girls,number_cases_sold")
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;

    for r in rows {
        writeln!(
            file,
            "2024-{:02}-01,{},{},{},{},{}",
            r.period, r.troop_id, r.cookie_type, r.period, r.number_of_girls, r.cases_sold
        )
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }

    Ok(())
}
