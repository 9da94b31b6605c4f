//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the closed region/process/unit vocabularies (`Region`, `Process`, `Units`)
//! - observation records before and after historical shifting
//! - run configuration (`RunConfig`, `ConflictPolicy`)

pub mod types;

pub use types::*;
