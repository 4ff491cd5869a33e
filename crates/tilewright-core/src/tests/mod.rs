//! Crate-level scenario tests.
//!
//! - `determinism.rs`: same seed and inputs give the same event stream
//! - `integration.rs`: end-to-end scenarios driven through [`Level`](crate::level::Level)
//! - `helpers.rs`: level setup and input helpers

mod helpers;

pub use helpers::*;
