//! Audit events for contact mutations.
//!
//! An [`Event`] is one observable change to one contact. Events are
//! immutable once built; the [`log::AuditLog`] side table orders them per
//! contact and never rewrites or drops an entry.
//!
//! # Field conventions
//!
//! - `prop_key`: affected property, empty when the change is not
//!   field-specific (tags, lifecycle).
//! - `prev_state` / `current_state`: before/after values as strings. Tag
//!   events carry the tag in `current_state` (add) or `prev_state` (remove).

pub mod log;
pub mod types;

pub use log::{AuditEntry, AuditError, AuditLog};
pub use types::{EventState, UnknownEventState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ContactId;

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The contact whose trail this event belongs to.
    pub contact: ContactId,
    /// Operator or user that caused the change.
    #[serde(default)]
    pub user: String,
    pub event_state: EventState,
    #[serde(default)]
    pub prop_key: String,
    #[serde(default)]
    pub prev_state: String,
    #[serde(default)]
    pub current_state: String,
    pub event_time: DateTime<Utc>,
}

impl Event {
    /// A bare event with no field or value payload.
    #[must_use]
    pub fn new(
        contact: ContactId,
        user: impl Into<String>,
        event_state: EventState,
        event_time: DateTime<Utc>,
    ) -> Self {
        Self {
            contact,
            user: user.into(),
            event_state,
            prop_key: String::new(),
            prev_state: String::new(),
            current_state: String::new(),
            event_time,
        }
    }

    /// Set the affected property key.
    #[must_use]
    pub fn on_prop(mut self, key: impl Into<String>) -> Self {
        self.prop_key = key.into();
        self
    }

    /// Set the before/after values.
    #[must_use]
    pub fn with_change(mut self, prev: impl Into<String>, current: impl Into<String>) -> Self {
        self.prev_state = prev.into();
        self.current_state = current.into();
        self
    }
}
