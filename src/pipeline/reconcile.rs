//! Reconciliation of the two source feeds.
//!
//! Takes the normalized+shifted output of both adapters, unions them on
//! `(date, region, process)`, collapses exact duplicates, and resolves
//! conflicting current-period values by a fixed, explicit source
//! precedence. The precedence is a policy decision carried in
//! [`ConflictPolicy`], not a hidden artifact of concatenation order.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{ConflictPolicy, Process, Region, ShiftedRecord};
use crate::error::AppError;

/// Union both feeds into one canonical table.
///
/// Output is sorted by `(date, region, process)` and contains at most one
/// row per key. More than two candidates for a key means an adapter
/// violated its contract (each source reports a key at most once), which
/// aborts the run.
pub fn reconcile(
    api: Vec<ShiftedRecord>,
    table9: Vec<ShiftedRecord>,
    policy: ConflictPolicy,
) -> Result<Vec<ShiftedRecord>, AppError> {
    let mut by_key: BTreeMap<(NaiveDate, Region, Process), Vec<ShiftedRecord>> = BTreeMap::new();
    for record in api.into_iter().chain(table9) {
        by_key
            .entry((record.date, record.region, record.process))
            .or_default()
            .push(record);
    }

    let mut out = Vec::with_capacity(by_key.len());
    for ((date, region, process), mut candidates) in by_key {
        // Exact duplicates (identical on every emitted field) collapse first.
        candidates.dedup_by(|a, b| same_values(a, b));

        if candidates.len() > 2 {
            return Err(AppError::reconciliation(format!(
                "{} conflicting candidates for ({date}, {region}, {process}); expected at most two sources.",
                candidates.len()
            )));
        }

        let chosen = match candidates.len() {
            1 => candidates.remove(0),
            2 => {
                let winner = policy.winner();
                if candidates[0].source == candidates[1].source {
                    return Err(AppError::reconciliation(format!(
                        "Two records from the same source for ({date}, {region}, {process})."
                    )));
                }
                let idx = candidates
                    .iter()
                    .position(|c| c.source == winner)
                    // Neither candidate comes from the configured winner
                    // (e.g. a derived row collided); keep the first.
                    .unwrap_or(0);
                candidates.remove(idx)
            }
            _ => continue,
        };
        out.push(chosen);
    }

    Ok(out)
}

/// Field-wise equality ignoring the source tag, which is never emitted
/// downstream.
fn same_values(a: &ShiftedRecord, b: &ShiftedRecord) -> bool {
    a.date == b.date
        && a.region == b.region
        && a.process == b.process
        && a.current == b.current
        && a.week_ago == b.week_ago
        && a.year_ago == b.year_ago
        && a.two_years_ago == b.two_years_ago
        && a.units == b.units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SourceId, Units};
    use chrono::NaiveDate;

    fn record(current: f64, source: SourceId) -> ShiftedRecord {
        ShiftedRecord {
            date: NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
            region: Region::Us,
            process: Process::Imports,
            current,
            week_ago: 92_000.0,
            year_ago: 110_000.0,
            two_years_ago: 121_000.0,
            units: Units::BarrelsPerDay,
            source,
            year_ago_4wk: None,
        }
    }

    #[test]
    fn api_precedence_wins_conflicts() {
        let api = vec![record(100.0, SourceId::Api)];
        let table = vec![record(200.0, SourceId::Table9)];
        let out = reconcile(api, table, ConflictPolicy::ApiFirst).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].current, 100.0);
        assert_eq!(out[0].source, SourceId::Api);
    }

    #[test]
    fn table9_precedence_is_available() {
        let api = vec![record(100.0, SourceId::Api)];
        let table = vec![record(200.0, SourceId::Table9)];
        let out = reconcile(api, table, ConflictPolicy::Table9First).unwrap();
        assert_eq!(out[0].current, 200.0);
    }

    #[test]
    fn exact_duplicates_collapse_to_one() {
        let api = vec![record(100.0, SourceId::Api)];
        let table = vec![record(100.0, SourceId::Table9)];
        let out = reconcile(api, table, ConflictPolicy::ApiFirst).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn output_has_unique_keys() {
        let mut api = Vec::new();
        let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        for i in 0..4 {
            let mut r = record(100.0 + i as f64, SourceId::Api);
            r.date = start + chrono::Days::new(7 * i);
            api.push(r);
        }
        let mut table = api.clone();
        for r in &mut table {
            r.source = SourceId::Table9;
            r.current += 5.0;
        }

        let out = reconcile(api, table, ConflictPolicy::ApiFirst).unwrap();
        let mut keys: Vec<_> = out.iter().map(|r| (r.date, r.region, r.process)).collect();
        let n = keys.len();
        keys.dedup();
        assert_eq!(n, keys.len());
        assert_eq!(n, 4);
    }

    #[test]
    fn more_than_two_candidates_is_an_error() {
        let api = vec![record(100.0, SourceId::Api), record(101.0, SourceId::Api)];
        let table = vec![record(200.0, SourceId::Table9)];
        let err = reconcile(api, table, ConflictPolicy::ApiFirst).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Reconciliation);
    }

    #[test]
    fn duplicate_within_one_source_is_an_error() {
        let api = vec![record(100.0, SourceId::Api), record(101.0, SourceId::Api)];
        let err = reconcile(api, Vec::new(), ConflictPolicy::ApiFirst).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Reconciliation);
    }
}
