//! Duplicate grouping by shared title and shared email address.
//!
//! Two passes over a tenant's contacts:
//!
//! 1. **Title**: contacts whose normalized titles match (case-insensitive,
//!    surrounding and repeated whitespace ignored).
//! 2. **Email**: contacts sharing an address under the configured property
//!    key. An email group is reported only if none of its members already
//!    appear in a title group, so one person is not listed twice.
//!
//! Groups are reported in key order. Members are ordered oldest first, which
//! makes the first member the natural merge target.

use std::collections::{BTreeMap, BTreeSet};

use rolodex_core::config::DedupConfig;
use rolodex_core::{Contact, ContactId};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Why the members of a group were considered duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupReason {
    Title,
    Email,
}

impl GroupReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Email => "email",
        }
    }
}

/// A set of contacts that share a normalized title or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// `title:<normalized>` or `email:<address>`.
    pub key: String,
    pub reason: GroupReason,
    /// Oldest first; ties broken by id.
    pub members: Vec<ContactId>,
}

/// Group `contacts` into likely duplicates.
///
/// Contacts are expected to belong to one tenant; callers partition first.
#[must_use]
#[instrument(skip_all, fields(contacts = contacts.len()))]
pub fn find_duplicate_groups(contacts: &[Contact], config: &DedupConfig) -> Vec<DuplicateGroup> {
    let min = config.min_group_size.max(2);
    let mut groups = Vec::new();
    let mut grouped: BTreeSet<&ContactId> = BTreeSet::new();

    if config.group_by_title {
        for (key, members) in bucket(contacts, |c| normalize_title(&c.title)) {
            if members.len() < min {
                continue;
            }
            grouped.extend(members.iter().map(|c| &c.id));
            groups.push(group(format!("title:{key}"), GroupReason::Title, members));
        }
    }

    if config.group_by_email {
        let by_email = bucket(contacts, |c| {
            let raw = c.props.value(&config.email_key)?;
            let email = normalize_email(raw);
            if email.is_none() {
                warn!(contact = %c.id, value = raw, "ignoring malformed email address");
            }
            email
        });
        for (key, members) in by_email {
            if members.len() < min {
                continue;
            }
            if members.iter().any(|c| grouped.contains(&c.id)) {
                debug!(key = %key, "email group overlaps a title group; skipped");
                continue;
            }
            groups.push(group(format!("email:{key}"), GroupReason::Email, members));
        }
    }

    groups.sort_by(|a, b| a.key.cmp(&b.key));
    debug!(groups = groups.len(), "duplicate groups found");
    groups
}

/// `(target, source)` pairs for a group: the oldest member absorbs each of
/// the others.
#[must_use]
pub fn candidate_pairs(group: &DuplicateGroup) -> Vec<(ContactId, ContactId)> {
    let Some((target, rest)) = group.members.split_first() else {
        return Vec::new();
    };
    rest.iter()
        .map(|source| (target.clone(), source.clone()))
        .collect()
}

fn bucket<'a, F>(contacts: &'a [Contact], key_of: F) -> BTreeMap<String, Vec<&'a Contact>>
where
    F: Fn(&Contact) -> Option<String>,
{
    let mut buckets: BTreeMap<String, Vec<&Contact>> = BTreeMap::new();
    let mut seen: BTreeSet<&ContactId> = BTreeSet::new();
    for contact in contacts {
        if !seen.insert(&contact.id) {
            warn!(contact = %contact.id, "duplicate contact id in input; ignoring repeat");
            continue;
        }
        if let Some(key) = key_of(contact) {
            buckets.entry(key).or_default().push(contact);
        }
    }
    buckets
}

fn group(key: String, reason: GroupReason, mut members: Vec<&Contact>) -> DuplicateGroup {
    members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    DuplicateGroup {
        key,
        reason,
        members: members.into_iter().map(|c| c.id.clone()).collect(),
    }
}

fn normalize_title(title: &str) -> Option<String> {
    let normalized = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return None;
    }
    Some(email)
}
