//! Source adapters.
//!
//! Each adapter owns its own network access and raw parsing and returns
//! records in source-native shape; vocabulary and unit normalization is
//! centralized in [`crate::pipeline::normalize`] so the conversion tables
//! exist exactly once.

pub mod eia_api;
pub mod table9;

pub use eia_api::{ApiRow, EiaClient};
pub use table9::{Table9Client, Table9Row, Table9Snapshot};
