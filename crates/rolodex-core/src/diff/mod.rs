//! Field and tag diffing between a target and a source contact.
//!
//! Diffs are read-only and depend only on their two input snapshots, so any
//! number of candidate pairs can be diffed concurrently.

pub mod field;
pub mod tag;

pub use field::{FieldClass, FieldDiff, classify, diff_fields};
pub use tag::{TagDiff, diff_tags};

use serde::{Deserialize, Serialize};

use crate::model::{Contact, ContactId};

/// Everything an operator reviews before approving a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDiff {
    pub target_id: ContactId,
    pub source_id: ContactId,
    pub fields: Vec<FieldDiff>,
    pub tags: TagDiff,
    /// Titles differ; the target's title is kept regardless.
    pub title_differs: bool,
    /// Source comments, shown for reference only (never merged).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_comments: Option<String>,
}

impl ContactDiff {
    /// Diff two contacts, `target` being the surviving record.
    #[must_use]
    pub fn between(target: &Contact, source: &Contact) -> Self {
        Self {
            target_id: target.id.clone(),
            source_id: source.id.clone(),
            fields: diff_fields(&target.props, &source.props),
            tags: diff_tags(&target.tags, &source.tags),
            title_differs: target.title.trim() != source.title.trim(),
            source_comments: source
                .comments
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    /// Entries the target would gain (`Added`).
    pub fn added(&self) -> impl Iterator<Item = &FieldDiff> {
        self.fields.iter().filter(|d| d.class == FieldClass::Added)
    }

    /// Entries where target and source disagree (`Conflicting`).
    pub fn conflicts(&self) -> impl Iterator<Item = &FieldDiff> {
        self.fields
            .iter()
            .filter(|d| d.class == FieldClass::Conflicting)
    }

    /// Whether a merge would leave the target untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added().next().is_none() && self.tags.added_tags.is_empty()
    }
}
