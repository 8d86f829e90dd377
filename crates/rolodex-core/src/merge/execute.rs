//! Apply a [`MergePlan`] to the stored target and describe every change.
//!
//! The executor never touches the source record; retiring it is the
//! contact-store's job once `apply_plan` returns successfully. Applying a
//! plan is serialized per target by the caller (the CLI store holds an
//! exclusive lock); the fingerprint check below turns a lost race into a
//! [`MergeError::StaleRecord`] rather than a silent overwrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{MergeError, MergePlan};
use crate::event::{Event, EventState};
use crate::model::{Contact, ContactId, Props};

/// Result of applying a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// The updated target record.
    pub contact: Contact,
    /// Audit events in application order: properties, then tags.
    pub events: Vec<Event>,
    /// The source record, to be retired by the caller.
    pub absorbed: ContactId,
    /// The target already reflected the plan; nothing was changed.
    pub already_applied: bool,
}

impl MergeOutcome {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

/// Apply `plan` to `target`, recording `actor` and `at` on every event.
///
/// # Errors
///
/// - [`MergeError::InvalidPlan`] if the plan merges a contact into itself or
///   was built for different contacts than the ones supplied.
/// - [`MergeError::StaleRecord`] if either contact changed since the plan
///   was built, unless the target already reflects the plan, in which case
///   the call is a no-op.
#[instrument(skip_all, fields(target = %plan.target_id, source = %plan.source_id))]
pub fn apply_plan(
    plan: &MergePlan,
    target: &Contact,
    source: &Contact,
    actor: &str,
    at: DateTime<Utc>,
) -> Result<MergeOutcome, MergeError> {
    if plan.target_id == plan.source_id {
        return Err(MergeError::InvalidPlan(
            "target and source are the same contact".to_string(),
        ));
    }
    if target.id != plan.target_id || source.id != plan.source_id {
        return Err(MergeError::InvalidPlan(format!(
            "plan was built for {} <- {}, got {} <- {}",
            plan.target_id, plan.source_id, target.id, source.id
        )));
    }

    let source_version = source.fingerprint();
    if source_version != plan.source_version {
        return Err(MergeError::StaleRecord {
            contact: source.id.clone(),
            expected: plan.source_version.clone(),
            found: source_version,
        });
    }

    let target_version = target.fingerprint();
    if target_version != plan.target_version {
        if plan.is_reflected_in(target) {
            debug!("target already reflects plan; nothing to apply");
            return Ok(MergeOutcome {
                contact: target.clone(),
                events: Vec::new(),
                absorbed: source.id.clone(),
                already_applied: true,
            });
        }
        return Err(MergeError::StaleRecord {
            contact: target.id.clone(),
            expected: plan.target_version.clone(),
            found: target_version,
        });
    }

    let mut merged = target.clone();
    let mut events = Vec::new();

    merged.props = merge_props(&target.props, plan)?;
    for (key, value) in merged.props.iter() {
        match target.props.value(key) {
            None => events.push(
                Event::new(target.id.clone(), actor, EventState::MergePropAdd, at)
                    .on_prop(key)
                    .with_change("", value),
            ),
            Some(prev) if prev != value.trim() => events.push(
                Event::new(target.id.clone(), actor, EventState::MergeUpdated, at)
                    .on_prop(key)
                    .with_change(prev, value),
            ),
            Some(_) => {}
        }
    }

    for tag in plan.tag_resolution.iter() {
        if merged.tags.insert(tag)? {
            events.push(
                Event::new(target.id.clone(), actor, EventState::MergeTagAdd, at)
                    .with_change("", tag),
            );
        }
    }

    debug!(events = events.len(), "merge applied");
    Ok(MergeOutcome {
        contact: merged,
        events,
        absorbed: source.id.clone(),
        already_applied: false,
    })
}

/// Merged props: target key order first (blank keys without a resolution
/// are dropped), then newly resolved keys in plan order.
fn merge_props(target: &Props, plan: &MergePlan) -> Result<Props, MergeError> {
    let mut out = Props::new();
    for (key, raw) in target.iter() {
        if let Some(value) = plan.resolution(key) {
            out.insert(key, value)?;
        } else if !raw.trim().is_empty() {
            out.insert(key, raw)?;
        }
    }
    for resolution in &plan.field_resolutions {
        if !out.contains_key(&resolution.key) {
            out.insert(resolution.key.as_str(), resolution.value.as_str())?;
        }
    }
    Ok(out)
}
