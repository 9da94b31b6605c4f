//! Source-schema normalization.
//!
//! Both adapters speak their own vocabulary (API facet names, Table 9
//! commodity/category labels) and their own unit scales. This module owns
//! the single set of lookup tables that map either shape onto the canonical
//! `(date, region, process, current, units)` schema.
//!
//! Design goals:
//! - **Fail closed**: an unknown region/process/unit label is a schema
//!   error, never silently dropped or passed through
//! - **Pure transforms**: no I/O, no mutation of inputs
//! - **One conversion table**, not one per adapter

use crate::data::{ApiRow, Table9Snapshot};
use crate::domain::{ObservationRecord, Process, Region, ShiftedRecord, SourceId, Units};
use crate::error::AppError;

/// Map an API `area-name` to the canonical region vocabulary.
fn api_region(label: &str) -> Result<Region, AppError> {
    match label {
        "U.S." => Ok(Region::Us),
        "PADD 1" => Ok(Region::EastCoast),
        "PADD 2" => Ok(Region::Midwest),
        "PADD 3" => Ok(Region::GulfCoast),
        // The combined PADD 4/5 stock series reports its area as "NA".
        "NA" => Ok(Region::Padds4And5),
        _ => Err(AppError::schema(format!(
            "Unrecognized API region label '{label}'."
        ))),
    }
}

/// Map an API `process-name` to the canonical process vocabulary.
fn api_process(label: &str) -> Result<Process, AppError> {
    match label {
        "Ending Stocks Excluding Propylene at Terminal" => Ok(Process::Stocks),
        "All Plants" => Ok(Process::Production),
        "Imports" => Ok(Process::Imports),
        "Exports" => Ok(Process::Exports),
        "Product Supplied" => Ok(Process::ProductSupplied),
        "Days of Supply" => Ok(Process::DaysOfSupply),
        _ => Err(AppError::schema(format!(
            "Unrecognized API process label '{label}'."
        ))),
    }
}

/// Resolve an API unit label to the base unit and the multiplier that
/// converts the reported value into it.
fn api_units(label: &str) -> Result<(Units, f64), AppError> {
    match label {
        "MBBL" => Ok((Units::Barrels, 1000.0)),
        "MBBL/D" => Ok((Units::BarrelsPerDay, 1000.0)),
        "BBL" => Ok((Units::Barrels, 1.0)),
        "BBL/D" => Ok((Units::BarrelsPerDay, 1.0)),
        "DAYS" => Ok((Units::Days, 1.0)),
        _ => Err(AppError::schema(format!(
            "Unrecognized API unit label '{label}'."
        ))),
    }
}

/// Map a Table 9 category to the canonical region vocabulary.
fn table9_region(label: &str) -> Result<Region, AppError> {
    match label {
        // In the propane section the product-level row is the national one.
        "Propane/Propylene" => Ok(Region::Us),
        "East Coast (PADD 1)" => Ok(Region::EastCoast),
        "Midwest (PADD 2)" => Ok(Region::Midwest),
        "Gulf Coast (PADD 3)" => Ok(Region::GulfCoast),
        "PADD's 4 & 5" => Ok(Region::Padds4And5),
        _ => Err(AppError::schema(format!(
            "Unrecognized Table 9 region label '{label}'."
        ))),
    }
}

/// Resolve a Table 9 commodity block to process, base unit, and the
/// multiplier into base units (stocks are published in million barrels,
/// flows in thousand b/d).
fn table9_process(label: &str) -> Result<(Process, Units, f64), AppError> {
    match label {
        "Stocks (Million Barrels)" => Ok((Process::Stocks, Units::Barrels, 1_000_000.0)),
        "Refiner and Blender Net Production" => {
            Ok((Process::Production, Units::BarrelsPerDay, 1000.0))
        }
        "Imports" => Ok((Process::Imports, Units::BarrelsPerDay, 1000.0)),
        "Exports" => Ok((Process::Exports, Units::BarrelsPerDay, 1000.0)),
        "Product Supplied" => Ok((Process::ProductSupplied, Units::BarrelsPerDay, 1000.0)),
        _ => Err(AppError::schema(format!(
            "Unrecognized Table 9 commodity label '{label}'."
        ))),
    }
}

fn check_non_negative(value: f64, process: Process, context: &str) -> Result<(), AppError> {
    if value < 0.0 {
        return Err(AppError::schema(format!(
            "Negative value {value} for {process} ({context}); refusing to clamp."
        )));
    }
    Ok(())
}

/// Normalize raw API rows to canonical observations.
pub fn normalize_api(rows: &[ApiRow]) -> Result<Vec<ObservationRecord>, AppError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let region = api_region(&row.area_name)?;
        let process = api_process(&row.process_name)?;
        let (units, multiplier) = api_units(&row.units)?;
        let current = row.value * multiplier;
        check_non_negative(current, process, "API")?;
        out.push(ObservationRecord {
            date: row.period,
            region,
            process,
            current,
            units,
            source: SourceId::Api,
        });
    }
    Ok(out)
}

/// Normalize a Table 9 snapshot to canonical shifted records.
///
/// The published table already carries the week/year/two-year comparatives,
/// so its normalized shape is the post-shift one. Rows with any withheld
/// cell cannot form a complete comparative and are dropped, mirroring the
/// shifter's own drop policy.
pub fn normalize_table9(snapshot: &Table9Snapshot) -> Result<Vec<ShiftedRecord>, AppError> {
    let mut out = Vec::with_capacity(snapshot.rows.len());
    for row in &snapshot.rows {
        let (process, units, multiplier) = table9_process(&row.commodity)?;
        let region = table9_region(&row.category)?;

        let (current, week_ago, year_ago, two_years_ago) =
            match (row.current, row.week_ago, row.year_ago, row.two_years_ago) {
                (Some(c), Some(w), Some(y), Some(t)) => (c, w, y, t),
                _ => continue,
            };

        let current = current * multiplier;
        check_non_negative(current, process, "Table 9")?;

        out.push(ShiftedRecord {
            date: snapshot.date,
            region,
            process,
            current,
            week_ago: week_ago * multiplier,
            year_ago: year_ago * multiplier,
            two_years_ago: two_years_ago * multiplier,
            units,
            source: SourceId::Table9,
            year_ago_4wk: None,
        });
    }
    Ok(out)
}
