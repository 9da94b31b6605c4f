//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during reconciliation and derivation
//! - exported to CSV for downstream reporting jobs
//! - printed in terminal reports

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Reporting region (closed set).
///
/// PADD = Petroleum Administration for Defense District, the fixed U.S.
/// regional partition used for energy statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "U.S.")]
    Us,
    #[serde(rename = "East Coast (PADD 1)")]
    EastCoast,
    #[serde(rename = "Midwest (PADD 2)")]
    Midwest,
    #[serde(rename = "Gulf Coast (PADD 3)")]
    GulfCoast,
    #[serde(rename = "PADDs 4 and 5")]
    Padds4And5,
}

impl Region {
    /// Canonical label, as emitted downstream.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "U.S.",
            Region::EastCoast => "East Coast (PADD 1)",
            Region::Midwest => "Midwest (PADD 2)",
            Region::GulfCoast => "Gulf Coast (PADD 3)",
            Region::Padds4And5 => "PADDs 4 and 5",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supply/demand process (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Process {
    #[serde(rename = "Stocks")]
    Stocks,
    #[serde(rename = "Production")]
    Production,
    #[serde(rename = "Imports")]
    Imports,
    #[serde(rename = "Exports")]
    Exports,
    #[serde(rename = "Product Supplied")]
    ProductSupplied,
    #[serde(rename = "Days of Supply")]
    DaysOfSupply,
}

impl Process {
    pub fn as_str(self) -> &'static str {
        match self {
            Process::Stocks => "Stocks",
            Process::Production => "Production",
            Process::Imports => "Imports",
            Process::Exports => "Exports",
            Process::ProductSupplied => "Product Supplied",
            Process::DaysOfSupply => "Days of Supply",
        }
    }

    /// The processes that get a `year_ago_4wk` back-fill on the latest date.
    pub const FLOWS_WITH_4WK: [Process; 4] = [
        Process::Production,
        Process::Exports,
        Process::Imports,
        Process::ProductSupplied,
    ];
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit convention per process: barrels for stocks, barrels/day for flow
/// rates, days for days-of-supply. Thousand/million-barrel inputs are
/// converted to these base units during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    #[serde(rename = "bbl")]
    Barrels,
    #[serde(rename = "b/d")]
    BarrelsPerDay,
    #[serde(rename = "days")]
    Days,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Barrels => "bbl",
            Units::BarrelsPerDay => "b/d",
            Units::Days => "days",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which adapter produced a record. Used only for conflict resolution
/// during reconciliation; never emitted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Api,
    Table9,
    /// Synthesized by the derived-metric pass, not reported by any feed.
    Derived,
}

/// Which source wins when both report a differing `current` for the same
/// `(date, region, process)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// API-sourced record wins (default).
    ApiFirst,
    /// Table 9 record wins.
    Table9First,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConflictPolicy::ApiFirst => "api-first",
            ConflictPolicy::Table9First => "table9-first",
        })
    }
}

impl ConflictPolicy {
    pub fn winner(self) -> SourceId {
        match self {
            ConflictPolicy::ApiFirst => SourceId::Api,
            ConflictPolicy::Table9First => SourceId::Table9,
        }
    }
}

/// One measured fact: a single weekly observation for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub date: NaiveDate,
    pub region: Region,
    pub process: Process,
    pub current: f64,
    pub units: Units,
    pub source: SourceId,
}

impl ObservationRecord {
    pub fn key(&self) -> SeriesKey {
        SeriesKey {
            region: self.region,
            process: self.process,
        }
    }
}

/// Partitions observations into independent time series; all shift and
/// derive computation is scoped to one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub region: Region,
    pub process: Process,
}

/// An observation augmented with look-back comparatives: the `current`
/// value of the same series at lags 1, 52, and 104 weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftedRecord {
    pub date: NaiveDate,
    pub region: Region,
    pub process: Process,
    pub current: f64,
    pub week_ago: f64,
    pub year_ago: f64,
    pub two_years_ago: f64,
    pub units: Units,
    pub source: SourceId,
    /// Trailing 4-week average from one year back, set only for the four
    /// flow processes on the latest date.
    pub year_ago_4wk: Option<f64>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Inclusive start of the API query window.
    pub start: NaiveDate,
    /// Optional inclusive end of the API query window.
    pub end: Option<NaiveDate>,
    /// Source precedence for conflicting current-period values.
    pub policy: ConflictPolicy,
    /// Skip the derived-metric pass entirely.
    pub derive: bool,
    /// Rows of the canonical table to print.
    pub tail: usize,
    /// Optional canonical CSV export path.
    pub export: Option<PathBuf>,
}
