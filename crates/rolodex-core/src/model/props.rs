//! Ordered property map for tenant-defined contact fields.
//!
//! Keys are unique and kept in insertion order for display. Values are plain
//! strings; an empty or whitespace-only value is treated exactly like an
//! absent key by every diff and merge operation (see [`Props::value`]).

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::ValidationError;

/// Insertion-ordered `key -> value` map with unique, non-empty keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Props {
    entries: Vec<(String, String)>,
}

impl Props {
    /// Create an empty property map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a map from `(key, value)` pairs, rejecting empty or repeated keys.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPropKey`] or
    /// [`ValidationError::DuplicatePropKey`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut props = Self::new();
        for (key, value) in pairs {
            let key = key.into();
            if props.contains_key(&key) {
                return Err(ValidationError::DuplicatePropKey(key));
            }
            props.insert(key, value)?;
        }
        Ok(props)
    }

    /// Insert or replace a value. A replaced key keeps its original position.
    ///
    /// Returns the previous raw value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPropKey`] for a blank key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::EmptyPropKey);
        }
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Ok(Some(std::mem::replace(&mut slot.1, value)));
        }
        self.entries.push((key, value));
        Ok(None)
    }

    /// Remove a key, returning its raw value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Raw stored value, including empty strings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Effective value: trimmed, and `None` when absent or blank.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Whether the key is stored at all (even with an empty value).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Raw `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pairs whose effective value is present, trimmed, in insertion order.
    pub fn effective(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, v)| {
            let v = v.trim();
            (!v.is_empty()).then_some((k.as_str(), v))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Props {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Props {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropsVisitor;

        impl<'de> Visitor<'de> for PropsVisitor {
            type Value = Props;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of property keys to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Props, A::Error> {
                let mut props = Props::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    if props.contains_key(&key) {
                        return Err(serde::de::Error::custom(
                            ValidationError::DuplicatePropKey(key),
                        ));
                    }
                    props.insert(key, value).map_err(serde::de::Error::custom)?;
                }
                Ok(props)
            }
        }

        deserializer.deserialize_map(PropsVisitor)
    }
}
