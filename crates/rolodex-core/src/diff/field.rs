//! Per-key comparison of two property maps.
//!
//! Every key in the union of both maps is classified, but only the keys a
//! merge could change on the target are emitted: `Added` (target blank,
//! source set) and `Conflicting` (both set, different). Keys that are
//! identical, set only on the target, or blank on both sides never appear.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Props;

/// Classification of one property key across a target/source pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Target has no value, source has one.
    Added,
    /// Both have values and they differ.
    Conflicting,
    /// Both have the same value.
    Identical,
    /// Only the target has a value.
    TargetOnly,
}

impl FieldClass {
    /// Whether a key of this class is part of the emitted diff.
    #[must_use]
    pub const fn is_change(self) -> bool {
        matches!(self, Self::Added | Self::Conflicting)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Conflicting => "conflicting",
            Self::Identical => "identical",
            Self::TargetOnly => "target_only",
        }
    }
}

impl fmt::Display for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted entry of a field diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub key: String,
    /// Effective target value; `None` for [`FieldClass::Added`].
    pub target_value: Option<String>,
    /// Effective source value (always present for emitted entries).
    pub source_value: String,
    pub class: FieldClass,
}

/// Classify a single key from its two effective values.
///
/// Returns `None` when neither side has a value: such a key is dropped
/// entirely rather than classified.
#[must_use]
pub fn classify(target: Option<&str>, source: Option<&str>) -> Option<FieldClass> {
    match (target, source) {
        (None, None) => None,
        (None, Some(_)) => Some(FieldClass::Added),
        (Some(_), None) => Some(FieldClass::TargetOnly),
        (Some(t), Some(s)) if t == s => Some(FieldClass::Identical),
        (Some(_), Some(_)) => Some(FieldClass::Conflicting),
    }
}

/// Compute the field diff between a target and a source property map.
///
/// Keys are visited in target order, then source-only keys in source order.
#[must_use]
pub fn diff_fields(target: &Props, source: &Props) -> Vec<FieldDiff> {
    let union = target
        .keys()
        .chain(source.keys().filter(|k| !target.contains_key(k)));

    union
        .filter_map(|key| {
            let t = target.value(key);
            let s = source.value(key);
            let class = classify(t, s)?;
            if !class.is_change() {
                return None;
            }
            Some(FieldDiff {
                key: key.to_string(),
                target_value: t.map(str::to_string),
                source_value: s?.to_string(),
                class,
            })
        })
        .collect()
}
