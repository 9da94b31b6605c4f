//! The reconciliation core: normalize -> shift -> reconcile -> derive.
//!
//! Everything in here is a pure, finite computation over already-fetched
//! data; the adapters in [`crate::data`] own all I/O.

pub mod derive;
pub mod normalize;
pub mod reconcile;
pub mod shift;

pub use derive::{DeriveOutcome, derive_latest_period};
pub use normalize::{normalize_api, normalize_table9};
pub use reconcile::reconcile;
pub use shift::{shift_all, shift_series};
