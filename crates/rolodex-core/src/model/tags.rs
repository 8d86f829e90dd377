use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Ordered tag set.
///
/// Tags are matched exactly (case-sensitive, no normalization). Duplicates
/// collapse on construction with the first occurrence keeping its position.
/// Merging is a plain union, so it is commutative on membership,
/// associative and idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Tags {
    items: Vec<String>,
}

impl Tags {
    /// Create an empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a tag set, collapsing repeats.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTag`] if any tag is blank.
    pub fn from_vec<I, T>(tags: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut out = Self::new();
        for tag in tags {
            out.insert(tag)?;
        }
        Ok(out)
    }

    /// Insert a tag. Returns `true` if it was not already present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTag`] for a blank tag.
    pub fn insert(&mut self, tag: impl Into<String>) -> Result<bool, ValidationError> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(ValidationError::EmptyTag);
        }
        if self.contains(&tag) {
            return Ok(false);
        }
        self.items.push(tag);
        Ok(true)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.items.iter().any(|t| t == tag)
    }

    /// Merge another set into this one (set union, appended in `other`'s order).
    pub fn merge(&mut self, other: &Self) {
        for tag in &other.items {
            if !self.contains(tag) {
                self.items.push(tag.clone());
            }
        }
    }

    /// Tags in `self` that are missing from `other`, in `self`'s order.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Vec<String> {
        self.items
            .iter()
            .filter(|t| !other.contains(t))
            .cloned()
            .collect()
    }

    /// Whether every tag of `other` is present in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.items.iter().all(|t| self.contains(t))
    }

    /// Membership equality, ignoring order.
    #[must_use]
    pub fn same_members(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_superset(other)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<String>> for Tags {
    type Error = ValidationError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_vec(value)
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.items
    }
}
