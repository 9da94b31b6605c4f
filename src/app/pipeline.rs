//! Shared run orchestration used by every CLI command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch (both sources, in parallel) -> normalize -> shift -> reconcile ->
//! derive. The commands then focus on presentation (printing vs export).

use crate::data::{EiaClient, Table9Client};
use crate::domain::{RunConfig, ShiftedRecord};
use crate::error::{AppError, ErrorKind};
use crate::pipeline::{
    derive_latest_period, normalize_api, normalize_table9, reconcile, shift_all,
};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The canonical table, one row per `(date, region, process)`.
    pub table: Vec<ShiftedRecord>,
    pub api_rows: usize,
    pub table9_rows: usize,
    /// Non-fatal degradations (currently only derived-metric failures).
    pub warnings: Vec<String>,
}

/// Execute the full reconciliation pipeline.
pub fn run_weekly(config: &RunConfig) -> Result<RunOutput, AppError> {
    let api_client = EiaClient::from_env()?;
    let table9_client = Table9Client::new();

    // The two fetches are independent (no shared mutable state); this is
    // the one legitimate parallelism opportunity, with a join barrier
    // before reconciliation.
    let (api_result, table9_result) = rayon::join(
        || api_client.fetch(config.start, config.end),
        || table9_client.fetch(),
    );
    let api_raw = api_result?;
    let snapshot = table9_result?;

    let api_shifted = shift_all(normalize_api(&api_raw)?)?;
    let table9_shifted = normalize_table9(&snapshot)?;

    let api_rows = api_shifted.len();
    let table9_rows = table9_shifted.len();

    let mut table = reconcile(api_shifted, table9_shifted, config.policy)?;

    let mut warnings = Vec::new();
    if config.derive {
        match derive_latest_period(&mut table) {
            Ok(_) => {}
            // Derived-metric failures degrade the run: the table stands,
            // only the synthetic row is omitted.
            Err(err) if err.kind() == ErrorKind::Division => {
                warnings.push(format!("Days of Supply omitted: {err}"));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(RunOutput {
        table,
        api_rows,
        table9_rows,
        warnings,
    })
}

/// Execute the API leg only (normalized + shifted, no reconciliation).
pub fn run_api_only(config: &RunConfig) -> Result<RunOutput, AppError> {
    let api_client = EiaClient::from_env()?;
    let api_raw = api_client.fetch(config.start, config.end)?;
    let table = shift_all(normalize_api(&api_raw)?)?;
    let api_rows = table.len();
    Ok(RunOutput {
        table,
        api_rows,
        table9_rows: 0,
        warnings: Vec::new(),
    })
}

/// Execute the Table 9 leg only.
pub fn run_table9_only() -> Result<RunOutput, AppError> {
    let snapshot = Table9Client::new().fetch()?;
    let table = normalize_table9(&snapshot)?;
    let table9_rows = table.len();
    Ok(RunOutput {
        table,
        api_rows: 0,
        table9_rows,
        warnings: Vec::new(),
    })
}
