use serde::{Deserialize, Serialize};

use crate::model::Tags;

/// Set difference between a target's and a source's tags.
///
/// `added_tags` is what a merge would bring in; `removed_tags` is only
/// informational since merges never drop target tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDiff {
    /// Source − target, in source order.
    pub added_tags: Vec<String>,
    /// Target − source, in target order.
    pub removed_tags: Vec<String>,
}

impl TagDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_tags.is_empty() && self.removed_tags.is_empty()
    }
}

/// Exact, case-sensitive tag difference. No normalization is applied.
#[must_use]
pub fn diff_tags(target: &Tags, source: &Tags) -> TagDiff {
    TagDiff {
        added_tags: source.difference(target),
        removed_tags: target.difference(source),
    }
}
