//! Command-line parsing for the weekly propane pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the reconciliation/derivation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::ConflictPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "propane",
    version,
    about = "Weekly U.S. propane supply/demand reconciler (EIA API + Table 9)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile both sources, derive metrics, print the canonical table.
    Run(RunArgs),
    /// Fetch and shift the EIA API feed only (no reconciliation).
    Api(RunArgs),
    /// Fetch the latest Table 9 snapshot only.
    Table9(RunArgs),
}

/// Common options for all commands.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Start of the query window (ISO date). Defaults to 3 years back,
    /// enough history for the 104-week comparatives.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Optional end of the query window (ISO date).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Which source wins when both report differing values for one key.
    #[arg(long, value_enum, default_value_t = ConflictPolicy::ApiFirst)]
    pub priority: ConflictPolicy,

    /// Skip the derived-metric pass (Days of Supply + year-ago averages).
    #[arg(long)]
    pub no_derive: bool,

    /// Rows of the canonical table to print.
    #[arg(long, default_value_t = 20)]
    pub tail: usize,

    /// Export the canonical table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
