//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the reconciliation/derivation code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{RunConfig, ShiftedRecord, Units};

/// Format the run summary (sources, row counts, date span, warnings).
pub fn format_run_summary(output: &RunOutput, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== propane - Weekly Propane Supply/Demand ===\n");
    out.push_str(&format!("Window: {} ..= {}\n", config.start, match config.end {
        Some(end) => end.to_string(),
        None => "latest".to_string(),
    }));
    out.push_str(&format!(
        "Sources: api={} rows | table9={} rows | policy={:?}\n",
        output.api_rows, output.table9_rows, config.policy
    ));

    let dates: Vec<_> = output.table.iter().map(|r| r.date).collect();
    if let (Some(min), Some(max)) = (dates.iter().min(), dates.iter().max()) {
        out.push_str(&format!(
            "Canonical table: {} rows | {} ..= {}\n",
            output.table.len(),
            min,
            max
        ));
    }

    for warning in &output.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }

    out
}

/// Format the last `tail` rows of the canonical table as an aligned table.
pub fn format_table(records: &[ShiftedRecord], tail: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10}  {:<21}  {:<16}  {:>14}  {:>14}  {:>14}  {:>14}  {:<5}  {:>14}\n",
        "date",
        "region",
        "process",
        "current",
        "week_ago",
        "year_ago",
        "two_years_ago",
        "units",
        "year_ago_4wk"
    ));

    let start = records.len().saturating_sub(tail);
    for r in &records[start..] {
        out.push_str(&format!(
            "{:<10}  {:<21}  {:<16}  {:>14}  {:>14}  {:>14}  {:>14}  {:<5}  {:>14}\n",
            r.date.to_string(),
            r.region.as_str(),
            r.process.as_str(),
            fmt_value(r.current, r.units),
            fmt_value(r.week_ago, r.units),
            fmt_value(r.year_ago, r.units),
            fmt_value(r.two_years_ago, r.units),
            r.units.as_str(),
            r.year_ago_4wk
                .map(|v| fmt_value(v, r.units))
                .unwrap_or_default(),
        ));
    }

    out
}

/// Days of supply keeps its one decimal; barrel figures print whole.
fn fmt_value(v: f64, units: Units) -> String {
    match units {
        Units::Days => format!("{v:.1}"),
        Units::Barrels | Units::BarrelsPerDay => format!("{v:.0}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Process, Region, SourceId};
    use chrono::NaiveDate;

    #[test]
    fn table_formats_units_and_tail() {
        let records = vec![
            ShiftedRecord {
                date: NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
                region: Region::Us,
                process: Process::DaysOfSupply,
                current: 7.04,
                week_ago: 6.4,
                year_ago: 8.0,
                two_years_ago: 8.0,
                units: Units::Days,
                source: SourceId::Derived,
                year_ago_4wk: None,
            };
            3
        ];
        let text = format_table(&records, 2);
        // header + 2 rows
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("7.0"));
        assert!(text.contains("days"));
    }
}
