//! Derived metrics for the latest period.
//!
//! Two passes over the reconciled table, both scoped to the latest date:
//!
//! 1. Synthesize the U.S. "Days of Supply" row (latest stocks over the
//!    trailing 4-week average of product supplied) when neither source
//!    reported one. Never recomputed when a source already provides it.
//! 2. Back-fill a `year_ago_4wk` field on the four flow processes: the
//!    trailing 4-week average of `current` anchored 53 distinct dates
//!    back.
//!
//! This is the only place in the pipeline where rounding happens. A zero
//! denominator (or missing inputs) degrades the run instead of aborting
//! it: the caller catches the `Division` kind, keeps the table, and drops
//! only the derived row.

use chrono::NaiveDate;

use crate::domain::{Process, Region, ShiftedRecord, SourceId, Units};
use crate::error::AppError;

/// Trailing window (periods) for the product-supplied average.
const SUPPLIED_WINDOW: usize = 4;
/// Distinct-date offset locating last year's 4-week window.
const YEAR_AGO_OFFSET: usize = 53;

/// What the derive pass actually did, for reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveOutcome {
    pub appended_days_of_supply: bool,
    pub backfilled_4wk: usize,
}

/// Run both derived-metric passes in place.
///
/// Appends at most one logical row and never mutates existing rows beyond
/// the `year_ago_4wk` field. Calling it twice is a no-op the second time.
pub fn derive_latest_period(table: &mut Vec<ShiftedRecord>) -> Result<DeriveOutcome, AppError> {
    let Some(max_date) = table.iter().map(|r| r.date).max() else {
        return Ok(DeriveOutcome::default());
    };

    let mut outcome = DeriveOutcome {
        appended_days_of_supply: false,
        backfilled_4wk: backfill_year_ago_4wk(table, max_date),
    };

    let already_present = table.iter().any(|r| {
        r.date == max_date && r.region == Region::Us && r.process == Process::DaysOfSupply
    });
    if !already_present {
        let row = days_of_supply_row(table, max_date)?;
        table.push(row);
        outcome.appended_days_of_supply = true;
    }

    Ok(outcome)
}

/// Build the synthetic Days of Supply row for `max_date`.
fn days_of_supply_row(
    table: &[ShiftedRecord],
    max_date: NaiveDate,
) -> Result<ShiftedRecord, AppError> {
    let us_stocks_latest = sorted_series(table, Region::Us, Process::Stocks)
        .last()
        .copied()
        .ok_or_else(|| AppError::division("No U.S. Stocks rows; cannot derive Days of Supply."))?;

    let supplied = sorted_series(table, Region::Us, Process::ProductSupplied);
    if supplied.is_empty() {
        return Err(AppError::division(
            "No U.S. Product Supplied rows; cannot derive Days of Supply.",
        ));
    }
    let supplied_tail = tail(&supplied, SUPPLIED_WINDOW);

    let supplied_4wk_avg = mean(supplied_tail.iter().map(|r| r.current));
    let current = checked_ratio(us_stocks_latest.current, supplied_4wk_avg)?;

    // The comparatives repeat the same ratio one and two years back: the
    // historical stocks value on the latest row over the mean of the
    // corresponding historical product-supplied window.
    let stocks_at_max = table
        .iter()
        .find(|r| r.date == max_date && r.region == Region::Us && r.process == Process::Stocks)
        .ok_or_else(|| {
            AppError::division("No U.S. Stocks row on the latest date; cannot derive Days of Supply.")
        })?;
    let year_ago = checked_ratio(
        stocks_at_max.year_ago,
        mean(supplied_tail.iter().map(|r| r.year_ago)),
    )?;
    let two_years_ago = checked_ratio(
        stocks_at_max.two_years_ago,
        mean(supplied_tail.iter().map(|r| r.two_years_ago)),
    )?;

    // The most recently reported Days of Supply becomes last week's value.
    let week_ago = sorted_series(table, Region::Us, Process::DaysOfSupply)
        .last()
        .map(|r| r.current)
        .ok_or_else(|| {
            AppError::division("No prior Days of Supply rows; cannot fill week_ago.")
        })?;

    Ok(ShiftedRecord {
        date: max_date,
        region: Region::Us,
        process: Process::DaysOfSupply,
        current,
        week_ago,
        year_ago,
        two_years_ago,
        units: Units::Days,
        source: SourceId::Derived,
        year_ago_4wk: None,
    })
}

/// Second pass: set `year_ago_4wk` on the latest row of each flow process.
///
/// Left unset when fewer than 53 distinct dates exist (start-of-series) or
/// when the anchored window is not fully populated; that silence is
/// deliberate rather than an error, since the field is informational.
fn backfill_year_ago_4wk(table: &mut [ShiftedRecord], max_date: NaiveDate) -> usize {
    let mut dates: Vec<NaiveDate> = table.iter().map(|r| r.date).collect();
    dates.sort_unstable();
    dates.dedup();
    if dates.len() < YEAR_AGO_OFFSET {
        return 0;
    }
    let anchor = dates[dates.len() - YEAR_AGO_OFFSET];

    let mut filled = 0;
    for process in Process::FLOWS_WITH_4WK {
        let upto: Vec<&ShiftedRecord> = sorted_series(table, Region::Us, process)
            .into_iter()
            .filter(|r| r.date <= anchor)
            .collect();
        if upto.len() < SUPPLIED_WINDOW {
            continue;
        }
        let avg = mean(tail(&upto, SUPPLIED_WINDOW).iter().map(|r| r.current));

        if let Some(latest) = table.iter_mut().find(|r| {
            r.date == max_date && r.region == Region::Us && r.process == process
        }) {
            if latest.year_ago_4wk.is_none() {
                latest.year_ago_4wk = Some(avg);
                filled += 1;
            }
        }
    }
    filled
}

/// All rows for one series key, sorted ascending by date.
fn sorted_series(table: &[ShiftedRecord], region: Region, process: Process) -> Vec<&ShiftedRecord> {
    let mut series: Vec<&ShiftedRecord> = table
        .iter()
        .filter(|r| r.region == region && r.process == process)
        .collect();
    series.sort_by_key(|r| r.date);
    series
}

fn tail<'a, T>(slice: &'a [T], n: usize) -> &'a [T] {
    &slice[slice.len().saturating_sub(n)..]
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (mut sum, mut n) = (0.0, 0usize);
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn checked_ratio(numerator: f64, denominator: f64) -> Result<f64, AppError> {
    if denominator == 0.0 {
        return Err(AppError::division(
            "Zero product-supplied average; cannot derive Days of Supply.",
        ));
    }
    Ok(round1(numerator / denominator))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn row(
        date: NaiveDate,
        process: Process,
        current: f64,
        year_ago: f64,
        two_years_ago: f64,
    ) -> ShiftedRecord {
        let units = match process {
            Process::Stocks => Units::Barrels,
            Process::DaysOfSupply => Units::Days,
            _ => Units::BarrelsPerDay,
        };
        ShiftedRecord {
            date,
            region: Region::Us,
            process,
            current,
            week_ago: current,
            year_ago,
            two_years_ago,
            units,
            source: SourceId::Api,
            year_ago_4wk: None,
        }
    }

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
    }

    /// Four supplied weeks averaging 1,000,000 b/d, stocks of 7,000,000 bbl,
    /// and one prior Days of Supply row.
    fn fixture() -> Vec<ShiftedRecord> {
        let d = base_date;
        let supplied = [900_000.0, 1_000_000.0, 1_100_000.0, 1_000_000.0];
        let mut table = Vec::new();
        for (i, s) in supplied.iter().enumerate() {
            table.push(row(
                d() + Days::new(7 * i as u64),
                Process::ProductSupplied,
                *s,
                800_000.0,
                750_000.0,
            ));
        }
        table.push(row(
            d() + Days::new(21),
            Process::Stocks,
            7_000_000.0,
            6_400_000.0,
            6_000_000.0,
        ));
        table.push(row(d() + Days::new(14), Process::DaysOfSupply, 6.4, 5.9, 5.5));
        table
    }

    #[test]
    fn days_of_supply_formula() {
        let mut table = fixture();
        let outcome = derive_latest_period(&mut table).unwrap();
        assert!(outcome.appended_days_of_supply);

        let dos = table
            .iter()
            .find(|r| r.process == Process::DaysOfSupply && r.date == base_date() + Days::new(21))
            .unwrap();
        // 7,000,000 / mean{900k, 1M, 1.1M, 1M} = 7.0
        assert_eq!(dos.current, 7.0);
        assert_eq!(dos.units, Units::Days);
        assert_eq!(dos.region, Region::Us);
        // week_ago carries the most recent reported value
        assert_eq!(dos.week_ago, 6.4);
        // 6,400,000 / 800,000 = 8.0 ; 6,000,000 / 750,000 = 8.0
        assert_eq!(dos.year_ago, 8.0);
        assert_eq!(dos.two_years_ago, 8.0);
    }

    #[test]
    fn derive_is_idempotent() {
        let mut table = fixture();
        derive_latest_period(&mut table).unwrap();
        let len = table.len();
        let outcome = derive_latest_period(&mut table).unwrap();
        assert!(!outcome.appended_days_of_supply);
        assert_eq!(table.len(), len);
    }

    #[test]
    fn source_reported_days_of_supply_is_never_recomputed() {
        let mut table = fixture();
        table.push(row(
            base_date() + Days::new(21),
            Process::DaysOfSupply,
            9.9,
            9.0,
            8.0,
        ));
        let outcome = derive_latest_period(&mut table).unwrap();
        assert!(!outcome.appended_days_of_supply);
        let dos: Vec<_> = table
            .iter()
            .filter(|r| {
                r.process == Process::DaysOfSupply && r.date == base_date() + Days::new(21)
            })
            .collect();
        assert_eq!(dos.len(), 1);
        assert_eq!(dos[0].current, 9.9);
    }

    #[test]
    fn zero_denominator_is_a_division_error() {
        let mut table = fixture();
        for r in &mut table {
            if r.process == Process::ProductSupplied {
                r.current = 0.0;
            }
        }
        let err = derive_latest_period(&mut table).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Division);
    }

    #[test]
    fn rounding_is_one_decimal() {
        let mut table = fixture();
        // 7,070,000 / 1,000,000 = 7.07 -> 7.1
        for r in &mut table {
            if r.process == Process::Stocks {
                r.current = 7_070_000.0;
            }
        }
        derive_latest_period(&mut table).unwrap();
        let dos = table.last().unwrap();
        assert_eq!(dos.current, 7.1);
    }

    /// 53 weekly dates, flow currents equal to the week index.
    fn long_flow_fixture(weeks: usize) -> Vec<ShiftedRecord> {
        let mut table = Vec::new();
        for i in 0..weeks {
            let date = base_date() + Days::new(7 * i as u64);
            table.push(row(date, Process::ProductSupplied, i as f64, 0.5, 0.25));
            table.push(row(date, Process::Exports, 10.0 + i as f64, 0.5, 0.25));
        }
        table
    }

    #[test]
    fn year_ago_4wk_anchors_53_periods_back() {
        let mut table = long_flow_fixture(53);
        derive_latest_period(&mut table).ok();

        let latest = base_date() + Days::new(7 * 52);
        let supplied = table
            .iter()
            .find(|r| r.date == latest && r.process == Process::ProductSupplied)
            .unwrap();
        // Anchor is the first date (index 0); window is indices {0} only —
        // fewer than 4 rows up to the anchor, so the field stays unset.
        assert!(supplied.year_ago_4wk.is_none());

        let mut table = long_flow_fixture(56);
        derive_latest_period(&mut table).ok();
        let latest = base_date() + Days::new(7 * 55);
        let supplied = table
            .iter()
            .find(|r| r.date == latest && r.process == Process::ProductSupplied)
            .unwrap();
        // 56 dates; anchor = index 3; window = {0,1,2,3} -> mean 1.5
        assert_eq!(supplied.year_ago_4wk, Some(1.5));
        let exports = table
            .iter()
            .find(|r| r.date == latest && r.process == Process::Exports)
            .unwrap();
        assert_eq!(exports.year_ago_4wk, Some(11.5));
    }

    #[test]
    fn year_ago_4wk_skipped_below_53_dates() {
        let mut table = long_flow_fixture(52);
        derive_latest_period(&mut table).ok();
        assert!(table.iter().all(|r| r.year_ago_4wk.is_none()));
    }
}
