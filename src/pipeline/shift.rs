//! Historical shifting: look-back comparatives per series.
//!
//! Each `(region, process)` key is an independent weekly series. For every
//! observation with enough history, the shifter attaches the `current`
//! value from 1, 52, and 104 periods earlier in the same series. Rows that
//! lack any of the three lag values are dropped: a partial comparative is
//! considered worse than no row.

use std::collections::BTreeMap;

use chrono::Days;

use crate::domain::{ObservationRecord, SeriesKey, ShiftedRecord};
use crate::error::AppError;

pub const WEEK_LAG: usize = 1;
pub const YEAR_LAG: usize = 52;
pub const TWO_YEAR_LAG: usize = 104;

/// Shift one series.
///
/// Precondition: `series` is sorted ascending by date, covers exactly one
/// `SeriesKey`, and has no cadence gaps. [`shift_all`] establishes this for
/// pipeline callers.
pub fn shift_series(series: &[ObservationRecord]) -> Vec<ShiftedRecord> {
    let mut out = Vec::with_capacity(series.len().saturating_sub(TWO_YEAR_LAG));
    for (i, obs) in series.iter().enumerate() {
        if i < TWO_YEAR_LAG {
            continue;
        }
        out.push(ShiftedRecord {
            date: obs.date,
            region: obs.region,
            process: obs.process,
            current: obs.current,
            week_ago: series[i - WEEK_LAG].current,
            year_ago: series[i - YEAR_LAG].current,
            two_years_ago: series[i - TWO_YEAR_LAG].current,
            units: obs.units,
            source: obs.source,
            year_ago_4wk: None,
        });
    }
    out
}

/// Group observations by series key, validate the weekly cadence, and
/// shift every series.
///
/// A duplicate date within one key, or a gap in the 7-day cadence, breaks
/// the ordinal meaning of the lag windows and is rejected rather than
/// silently realigned.
pub fn shift_all(records: Vec<ObservationRecord>) -> Result<Vec<ShiftedRecord>, AppError> {
    let mut by_key: BTreeMap<SeriesKey, Vec<ObservationRecord>> = BTreeMap::new();
    for record in records {
        by_key.entry(record.key()).or_default().push(record);
    }

    let mut out = Vec::new();
    for (key, mut series) in by_key {
        series.sort_by_key(|r| r.date);
        validate_cadence(key, &series)?;
        out.extend(shift_series(&series));
    }
    Ok(out)
}

fn validate_cadence(key: SeriesKey, series: &[ObservationRecord]) -> Result<(), AppError> {
    for pair in series.windows(2) {
        let expected = pair[0].date.checked_add_days(Days::new(7));
        if expected != Some(pair[1].date) {
            return Err(AppError::schema(format!(
                "Series ({}, {}) breaks weekly cadence between {} and {}.",
                key.region, key.process, pair[0].date, pair[1].date
            )));
        }
    }
    Ok(())
}
