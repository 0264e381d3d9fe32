//! CSV ingest and normalization.
//!
//! This module turns a raw sales-history CSV into a clean set of
//! `SalesRecord`s that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here
//!
//! Cleaning gates, in order: coerce the four numeric fields (a row failing
//! any coercion is dropped, never defaulted), drop rows with
//! `number_cases_sold <= 0`, derive `period_squared`, join per-group
//! historical min/max sales onto every surviving row.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DatasetStats, GroupKey, SalesRecord};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 5] = [
    "troop_id",
    "cookie_type",
    "period",
    "number_of_girls",
    "number_cases_sold",
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: cleaned records + stats + row errors.
///
/// Built once at startup and immutable afterwards; every forecast query and
/// the backtest evaluator only read it.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub records: Vec<SalesRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and clean a sales-history CSV file.
pub fn load_dataset(path: &Path) -> Result<PreparedDataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    load_dataset_from_reader(file)
}

/// Load and clean sales history from any reader (used directly by tests).
pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<PreparedDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    // First pass: coerce and validate rows. Bounds are joined afterwards
    // because they are a reduction over the full valid dataset.
    struct PartialRow {
        troop_id: i64,
        cookie_type: String,
        period: i64,
        number_of_girls: f64,
        cases_sold: f64,
    }

    let mut partials = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header row and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(Some((troop_id, cookie_type, period, girls, cases))) => {
                partials.push(PartialRow {
                    troop_id,
                    cookie_type,
                    period,
                    number_of_girls: girls,
                    cases_sold: cases,
                });
            }
            Ok(None) => {} // zero-sales row, dropped silently
            Err(e) => row_errors.push(RowError { line, message: e }),
        }
    }

    if partials.is_empty() {
        return Err(AppError::new(
            3,
            "No valid rows remain after cleaning (all rows failed coercion or had zero sales).",
        ));
    }

    // Reduce cases_sold to (min, max) per (troop, cookie type).
    let mut bounds: HashMap<GroupKey, (f64, f64)> = HashMap::new();
    for row in &partials {
        let key = GroupKey {
            troop_id: row.troop_id,
            cookie_type: row.cookie_type.clone(),
        };
        let entry = bounds.entry(key).or_insert((row.cases_sold, row.cases_sold));
        entry.0 = entry.0.min(row.cases_sold);
        entry.1 = entry.1.max(row.cases_sold);
    }

    let records: Vec<SalesRecord> = partials
        .into_iter()
        .map(|row| {
            let key = GroupKey {
                troop_id: row.troop_id,
                cookie_type: row.cookie_type.clone(),
            };
            // The key was inserted from this same row set, so the lookup
            // cannot miss; fall back to the row's own value regardless.
            let (low, high) = bounds
                .get(&key)
                .copied()
                .unwrap_or((row.cases_sold, row.cases_sold));
            SalesRecord {
                troop_id: row.troop_id,
                cookie_type: row.cookie_type,
                period: row.period,
                period_squared: (row.period as f64) * (row.period as f64),
                number_of_girls: row.number_of_girls,
                cases_sold: row.cases_sold,
                historical_low: low,
                historical_high: high,
            }
        })
        .collect();

    let rows_used = records.len();
    let stats = compute_stats(&records).ok_or_else(|| {
        AppError::new(3, "No valid records remain after cleaning.")
    })?;

    Ok(PreparedDataset {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "﻿troop_id"). If we don't strip it, schema
    // validation will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::new(2, format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

type ParsedRow = (i64, String, i64, f64, f64);

/// Parse one CSV row. `Ok(None)` marks a row dropped by the zero-sales gate;
/// `Err` marks a coercion failure (recorded, not fatal).
fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<Option<ParsedRow>, String> {
    let troop_id = parse_int(get_required(record, header_map, "troop_id")?)
        .ok_or_else(|| "Invalid `troop_id` (expected integer).".to_string())?;

    let cookie_type = get_required(record, header_map, "cookie_type")?.to_string();

    let period = parse_int(get_required(record, header_map, "period")?)
        .ok_or_else(|| "Invalid `period` (expected integer).".to_string())?;
    if period < 1 {
        return Err("Invalid `period` (must be >= 1).".to_string());
    }

    let girls = parse_f64(get_required(record, header_map, "number_of_girls")?)
        .ok_or_else(|| "Invalid `number_of_girls` (expected number).".to_string())?;
    if girls < 0.0 {
        return Err("Invalid `number_of_girls` (must be >= 0).".to_string());
    }

    let cases = parse_f64(get_required(record, header_map, "number_cases_sold")?)
        .ok_or_else(|| "Invalid `number_cases_sold` (expected number).".to_string())?;

    // Zero-sales rows are not informative and would corrupt percentage-error
    // metrics downstream.
    if cases <= 0.0 {
        return Ok(None);
    }

    Ok(Some((troop_id, cookie_type, period, girls, cases)))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_int(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // Accept float-formatted integers ("12.0"), a common spreadsheet artifact.
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn compute_stats(records: &[SalesRecord]) -> Option<DatasetStats> {
    if records.is_empty() {
        return None;
    }

    let mut period_min = i64::MAX;
    let mut period_max = i64::MIN;
    let mut cases_min = f64::INFINITY;
    let mut cases_max = f64::NEG_INFINITY;
    let mut groups = BTreeSet::new();

    for r in records {
        period_min = period_min.min(r.period);
        period_max = period_max.max(r.period);
        cases_min = cases_min.min(r.cases_sold);
        cases_max = cases_max.max(r.cases_sold);
        groups.insert((r.troop_id, r.cookie_type.clone()));
    }

    if !cases_min.is_finite() || !cases_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_records: records.len(),
        n_groups: groups.len(),
        period_min,
        period_max,
        cases_min,
        cases_max,
    })
}
