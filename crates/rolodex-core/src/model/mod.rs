//! Contact record model.
//!
//! Every identifier and key invariant is enforced at construction and on
//! deserialization, so the differ and planner never see a malformed record.

pub mod contact;
pub mod props;
pub mod tags;

pub use contact::{Contact, ContactId, Version};
pub use props::Props;
pub use tags::Tags;

use crate::error::ErrorCode;

/// Boundary validation failures for contact records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("contact id must not be empty")]
    EmptyId,
    #[error("property key must not be empty")]
    EmptyPropKey,
    #[error("duplicate property key '{0}'")]
    DuplicatePropKey(String),
    #[error("tag must not be empty")]
    EmptyTag,
}

impl ValidationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidContact
    }
}
