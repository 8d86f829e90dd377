//! Merge planning: decide, per field and for tags, what the surviving record
//! will hold.
//!
//! # Policy
//!
//! - **Fields**: a non-empty target value always wins. A blank or missing
//!   target value adopts the source's value. Keys blank on both sides are
//!   left out of the merged record.
//! - **Tags**: union of target and source. Merges never remove tags.
//! - **Title and comments**: the target's are kept; the source's are shown
//!   in the diff for reference only.
//!
//! An operator may override a `Conflicting` key with [`MergePlan::prefer_source`].
//! That is the only way a populated target value can change during a merge.
//!
//! Planning is a pure function of the two snapshots: the same inputs always
//! produce the same plan.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::MergeError;
use crate::diff::{ContactDiff, FieldClass};
use crate::model::{Contact, ContactId, Tags, Version};

/// Which side a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Target,
    Source,
}

/// Resolved value for one property key of the merged record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResolution {
    pub key: String,
    pub value: String,
    pub origin: Origin,
}

/// A computed, not-yet-applied description of how two contacts combine.
///
/// Built fresh for each review and either applied immediately or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePlan {
    pub target_id: ContactId,
    pub source_id: ContactId,
    /// Fingerprint of the target snapshot the plan was computed from.
    pub target_version: Version,
    /// Fingerprint of the source snapshot the plan was computed from.
    pub source_version: Version,
    /// Merged property values, target keys first, then adopted keys.
    pub field_resolutions: Vec<FieldResolution>,
    /// Tag set of the merged record.
    pub tag_resolution: Tags,
    /// The diff shown to the operator.
    pub diff: ContactDiff,
}

impl MergePlan {
    /// Resolved value for `key`, if the merged record will hold one.
    #[must_use]
    pub fn resolution(&self, key: &str) -> Option<&str> {
        self.field_resolutions
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.value.as_str())
    }

    /// Keys whose value is adopted from the source.
    pub fn adopted(&self) -> impl Iterator<Item = &FieldResolution> {
        self.field_resolutions
            .iter()
            .filter(|r| r.origin == Origin::Source)
    }

    /// Let the source's value win for a conflicting key.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::UnknownConflict`] if `key` is not classified
    /// `Conflicting` in this plan's diff.
    pub fn prefer_source(&mut self, key: &str) -> Result<(), MergeError> {
        let conflict = self
            .diff
            .fields
            .iter()
            .find(|d| d.key == key && d.class == FieldClass::Conflicting)
            .ok_or_else(|| MergeError::UnknownConflict(key.to_string()))?;

        let value = conflict.source_value.clone();
        match self.field_resolutions.iter_mut().find(|r| r.key == key) {
            Some(slot) => {
                slot.value = value;
                slot.origin = Origin::Source;
            }
            None => self.field_resolutions.push(FieldResolution {
                key: key.to_string(),
                value,
                origin: Origin::Source,
            }),
        }
        debug!(key, "operator override: source value wins");
        Ok(())
    }

    /// Whether `contact` already holds every resolved value and tag.
    #[must_use]
    pub fn is_reflected_in(&self, contact: &Contact) -> bool {
        self.field_resolutions
            .iter()
            .all(|r| contact.props.value(&r.key) == Some(r.value.trim()))
            && contact.tags.is_superset(&self.tag_resolution)
    }
}

/// Build a merge plan with `target` as the surviving record.
///
/// # Errors
///
/// Returns [`MergeError::InvalidPlan`] if both contacts share an id.
#[instrument(skip_all, fields(target = %target.id, source = %source.id))]
pub fn plan_merge(target: &Contact, source: &Contact) -> Result<MergePlan, MergeError> {
    if target.id == source.id {
        return Err(MergeError::InvalidPlan(
            "target and source are the same contact".to_string(),
        ));
    }

    let mut field_resolutions: Vec<FieldResolution> = target
        .props
        .effective()
        .map(|(key, value)| FieldResolution {
            key: key.to_string(),
            value: value.to_string(),
            origin: Origin::Target,
        })
        .collect();

    for (key, value) in source.props.effective() {
        if target.props.value(key).is_none() {
            field_resolutions.push(FieldResolution {
                key: key.to_string(),
                value: value.to_string(),
                origin: Origin::Source,
            });
        }
    }

    let mut tag_resolution = target.tags.clone();
    tag_resolution.merge(&source.tags);

    let plan = MergePlan {
        target_id: target.id.clone(),
        source_id: source.id.clone(),
        target_version: target.fingerprint(),
        source_version: source.fingerprint(),
        field_resolutions,
        tag_resolution,
        diff: ContactDiff::between(target, source),
    };

    debug!(
        fields = plan.field_resolutions.len(),
        adopted = plan.adopted().count(),
        conflicts = plan.diff.conflicts().count(),
        tags_added = plan.diff.tags.added_tags.len(),
        "merge plan built"
    );
    Ok(plan)
}
