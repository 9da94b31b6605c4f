//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the requested pipeline (full, API-only, or Table 9-only)
//! - prints the summary and table
//! - writes the optional CSV export

use chrono::{Months, Utc};
use clap::Parser;

use crate::cli::{Command, RunArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `propane` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle(args, Mode::Full),
        Command::Api(args) => handle(args, Mode::ApiOnly),
        Command::Table9(args) => handle(args, Mode::Table9Only),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    ApiOnly,
    Table9Only,
}

fn handle(args: RunArgs, mode: Mode) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;

    let output = match mode {
        Mode::Full => pipeline::run_weekly(&config)?,
        Mode::ApiOnly => pipeline::run_api_only(&config)?,
        Mode::Table9Only => pipeline::run_table9_only()?,
    };

    print!("{}", crate::report::format_run_summary(&output, &config));
    println!("{}", crate::report::format_table(&output.table, config.tail));

    if let Some(path) = &config.export {
        crate::io::export::write_table_csv(path, &output.table)?;
        println!("Exported {} rows to {}", output.table.len(), path.display());
    }

    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let today = Utc::now().date_naive();
    let start = match args.start {
        Some(start) => start,
        None => today
            .checked_sub_months(Months::new(36))
            .ok_or_else(|| AppError::config("Could not compute the default start date."))?,
    };

    if let Some(end) = args.end {
        if end < start {
            return Err(AppError::config(format!(
                "End date {end} precedes start date {start}."
            )));
        }
    }

    Ok(RunConfig {
        start,
        end: args.end,
        policy: args.priority,
        derive: !args.no_derive,
        tail: args.tail,
        export: args.export.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConflictPolicy;
    use chrono::NaiveDate;

    fn args() -> RunArgs {
        RunArgs {
            start: None,
            end: None,
            priority: ConflictPolicy::ApiFirst,
            no_derive: false,
            tail: 20,
            export: None,
        }
    }

    #[test]
    fn default_start_is_three_years_back() {
        let config = run_config_from_args(&args()).unwrap();
        let today = Utc::now().date_naive();
        assert_eq!(config.start, today.checked_sub_months(Months::new(36)).unwrap());
        assert!(config.derive);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut a = args();
        a.start = Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        a.end = Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(run_config_from_args(&a).is_err());
    }
}
