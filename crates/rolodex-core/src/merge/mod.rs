//! Duplicate reconciliation: plan a merge, then apply it.
//!
//! ```text
//! (target, source) --plan_merge--> MergePlan --apply_plan--> MergeOutcome
//!                                     ^                       (contact + events)
//!                            operator review / prefer_source
//! ```

pub mod execute;
pub mod plan;

pub use execute::{MergeOutcome, apply_plan};
pub use plan::{FieldResolution, MergePlan, Origin, plan_merge};

use crate::error::ErrorCode;
use crate::model::{ContactId, ValidationError, Version};

/// Errors from planning or applying a merge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The plan cannot be applied as given. Not retryable without new input.
    #[error("invalid merge plan: {0}")]
    InvalidPlan(String),

    /// A contact changed after the plan was computed. Re-diff and re-plan.
    #[error("contact {contact} changed since the plan was built (expected {expected}, found {found})")]
    StaleRecord {
        contact: ContactId,
        expected: Version,
        found: Version,
    },

    /// An override named a key that is not a conflict in the plan.
    #[error("'{0}' is not a conflicting field in this merge")]
    UnknownConflict(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl MergeError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPlan(_) => ErrorCode::InvalidPlan,
            Self::StaleRecord { .. } => ErrorCode::StaleRecord,
            Self::UnknownConflict(_) => ErrorCode::UnknownConflict,
            Self::Validation(_) => ErrorCode::InvalidContact,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
