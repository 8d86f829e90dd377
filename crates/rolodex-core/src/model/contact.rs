use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Props, Tags, ValidationError};

// ---------------------------------------------------------------------------
// ContactId
// ---------------------------------------------------------------------------

/// Opaque, non-empty contact identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactId(String);

impl ContactId {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] for empty or blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContactId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContactId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContactId> for String {
    fn from(id: ContactId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Content fingerprint of a contact snapshot, formatted `blake3:<hex>`.
///
/// Two snapshots with the same effective content share a version; a blank
/// property value and a missing key fingerprint identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// A tenant-scoped contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Immutable identifier.
    pub id: ContactId,
    /// Display name.
    #[serde(default)]
    pub title: String,
    /// Tenant unique name the record belongs to.
    #[serde(default)]
    pub tenant: String,
    /// User that owns the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Creation time, immutable.
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// Create a contact with no props, tags or comments.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] if `id` is blank.
    pub fn new(
        id: &str,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: ContactId::new(id)?,
            title: title.into(),
            tenant: String::new(),
            user: None,
            props: Props::new(),
            tags: Tags::new(),
            comments: None,
            created_at,
        })
    }

    /// Builder-style property setter.
    ///
    /// # Errors
    ///
    /// Propagates [`Props::insert`] validation.
    pub fn with_prop(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        self.props.insert(key, value)?;
        Ok(self)
    }

    /// Builder-style tag setter.
    ///
    /// # Errors
    ///
    /// Propagates [`Tags::insert`] validation.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Result<Self, ValidationError> {
        self.tags.insert(tag)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Compute the content fingerprint used for stale-plan detection.
    ///
    /// The snapshot is hashed as a canonical JSON array so keys, values and
    /// tags containing separators cannot collide. Props and tags are sorted
    /// first so display order does not change the version.
    #[must_use]
    pub fn fingerprint(&self) -> Version {
        let mut props: Vec<(&str, &str)> = self.props.effective().collect();
        props.sort_unstable();

        let mut tags: Vec<&str> = self.tags.iter().collect();
        tags.sort_unstable();

        let canonical = serde_json::json!([
            self.id.as_str(),
            self.tenant,
            self.title,
            self.user,
            props,
            tags,
            self.comments,
            self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        ]);

        let hash = blake3::hash(canonical.to_string().as_bytes());
        Version(format!("blake3:{hash}"))
    }
}
