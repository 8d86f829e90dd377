#![forbid(unsafe_code)]
//! rolodex-core library.
//!
//! The contact duplicate reconciliation engine: record model, field and tag
//! diffing, merge planning and execution, plus the audit event model.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in the engine (each mapping to an
//!   [`error::ErrorCode`]); `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! The engine performs no I/O. Only [`config`] and [`lock`] touch the
//! filesystem, on behalf of callers that persist contacts.

pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod lock;
pub mod merge;
pub mod model;

pub use diff::{ContactDiff, FieldClass, FieldDiff, TagDiff};
pub use error::ErrorCode;
pub use event::{AuditEntry, AuditLog, Event, EventState};
pub use merge::{MergeError, MergeOutcome, MergePlan, apply_plan, plan_merge};
pub use model::{Contact, ContactId, Props, Tags, ValidationError, Version};
