#![forbid(unsafe_code)]
//! rolodex-search library.
//!
//! Finds groups of contacts that likely describe the same person and turns
//! them into `(target, source)` merge candidates.
//!
//! # Conventions
//!
//! - **Errors**: Grouping is infallible; malformed input is skipped and logged.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod duplicates;

pub use duplicates::{DuplicateGroup, GroupReason, candidate_pairs, find_duplicate_groups};
