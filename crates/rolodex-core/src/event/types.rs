//! Event state enum covering every audit state a contact can record.
//!
//! The string form is the SCREAMING_SNAKE_CASE name stored in the audit log
//! (`MERGE_PROP_ADD`, `TAG_ADD`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The 13 audit states in the contact event catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventState {
    /// Contact was created.
    Created,
    /// A field (usually the title) changed outside a merge.
    Updated,
    /// Contact was deleted.
    Deleted,
    /// A tag was added outside a merge.
    TagAdd,
    /// A tag was removed.
    TagRemoved,
    /// A property key was introduced outside a merge.
    PropAdd,
    /// A property key was removed.
    PropRemoved,
    /// A previous change was reverted.
    Reverted,
    /// Contact was created despite a duplicate warning.
    Duplicated,
    /// Contact was absorbed into another by a merge.
    Merged,
    /// A merge added a tag.
    MergeTagAdd,
    /// A merge introduced a property key that was absent on the target.
    MergePropAdd,
    /// A merge replaced one non-empty property value with another.
    MergeUpdated,
}

/// Error returned when parsing an unknown event state string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventState {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = EventState::ALL.map(EventState::as_str).join(", ");
        write!(
            f,
            "unknown event state '{}': expected one of {expected}",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventState {}

impl EventState {
    /// All known states in catalog order.
    pub const ALL: [Self; 13] = [
        Self::Created,
        Self::Updated,
        Self::Deleted,
        Self::TagAdd,
        Self::TagRemoved,
        Self::PropAdd,
        Self::PropRemoved,
        Self::Reverted,
        Self::Duplicated,
        Self::Merged,
        Self::MergeTagAdd,
        Self::MergePropAdd,
        Self::MergeUpdated,
    ];

    /// Return the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
            Self::TagAdd => "TAG_ADD",
            Self::TagRemoved => "TAG_REMOVED",
            Self::PropAdd => "PROP_ADD",
            Self::PropRemoved => "PROP_REMOVED",
            Self::Reverted => "REVERTED",
            Self::Duplicated => "DUPLICATED",
            Self::Merged => "MERGED",
            Self::MergeTagAdd => "MERGE_TAG_ADD",
            Self::MergePropAdd => "MERGE_PROP_ADD",
            Self::MergeUpdated => "MERGE_UPDATED",
        }
    }

    /// States produced by the merge executor.
    #[must_use]
    pub const fn is_merge(self) -> bool {
        matches!(
            self,
            Self::MergeTagAdd | Self::MergePropAdd | Self::MergeUpdated
        )
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventState {
    type Err = UnknownEventState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownEventState { raw: s.to_string() })
    }
}

// Custom serde: serialize as the canonical string.
impl Serialize for EventState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_merge_states() {
        assert_eq!(EventState::MergePropAdd.to_string(), "MERGE_PROP_ADD");
        assert_eq!(EventState::MergeTagAdd.to_string(), "MERGE_TAG_ADD");
        assert_eq!(EventState::MergeUpdated.to_string(), "MERGE_UPDATED");
    }

    #[test]
    fn display_fromstr_roundtrip() {
        for state in EventState::ALL {
            let reparsed: EventState = state.to_string().parse().expect("should roundtrip");
            assert_eq!(state, reparsed);
        }
    }

    #[test]
    fn fromstr_rejects_unknown_and_lowercase() {
        let err = "MERGE_EVERYTHING".parse::<EventState>().unwrap_err();
        assert_eq!(err.raw, "MERGE_EVERYTHING");
        assert!(err.to_string().contains("expected one of"));
        assert!("created".parse::<EventState>().is_err());
        assert!("".parse::<EventState>().is_err());
    }

    #[test]
    fn serde_json_uses_canonical_string() {
        let json = serde_json::to_string(&EventState::TagRemoved).expect("serialize");
        assert_eq!(json, "\"TAG_REMOVED\"");
        let back: EventState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, EventState::TagRemoved);
        assert!(serde_json::from_str::<EventState>("\"NOPE\"").is_err());
    }

    #[test]
    fn only_merge_states_are_flagged() {
        let merge: Vec<_> = EventState::ALL.into_iter().filter(|s| s.is_merge()).collect();
        assert_eq!(
            merge,
            vec![
                EventState::MergeTagAdd,
                EventState::MergePropAdd,
                EventState::MergeUpdated
            ]
        );
    }

    #[test]
    fn error_display_includes_valid_options() {
        let msg = UnknownEventState { raw: "nope".into() }.to_string();
        for state in EventState::ALL {
            assert!(msg.contains(state.as_str()), "missing {}", state.as_str());
        }
    }
}
