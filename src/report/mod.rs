//! Reporting utilities: run summary and canonical-table rendering.

pub mod format;

pub use format::{format_run_summary, format_table};
