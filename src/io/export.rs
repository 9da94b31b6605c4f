//! Export the canonical table to CSV.
//!
//! Column order matters for downstream consumers:
//! `date,region,process,current,week_ago,year_ago,two_years_ago,units,year_ago_4wk`
//! with `year_ago_4wk` populated only for the four flow processes on the
//! latest date.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ShiftedRecord;
use crate::error::AppError;

/// Write the canonical table to a CSV file.
pub fn write_table_csv(path: &Path, records: &[ShiftedRecord]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(
        file,
        "date,region,process,current,week_ago,year_ago,two_years_ago,units,year_ago_4wk"
    )
    .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            r.date,
            quote(r.region.as_str()),
            quote(r.process.as_str()),
            r.current,
            r.week_ago,
            r.year_ago,
            r.two_years_ago,
            r.units,
            r.year_ago_4wk.map(|v| v.to_string()).unwrap_or_default(),
        )
        .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote a label if it contains a comma (none of the canonical vocabulary
/// does today, but region labels contain parentheses and have changed
/// before).
fn quote(label: &str) -> String {
    if label.contains(',') {
        format!("\"{label}\"")
    } else {
        label.to_string()
    }
}
