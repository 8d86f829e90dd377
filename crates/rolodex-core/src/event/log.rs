//! Append-only audit trail keyed by contact id.
//!
//! Each contact gets its own trail with a strictly increasing sequence
//! number starting at 1. Event times within a trail never go backwards.
//! A batch append is all-or-nothing: if any event in the batch would break
//! an invariant, nothing from the batch is recorded.
//!
//! The on-disk form is JSON Lines, one [`AuditEntry`] per line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Event;
use crate::error::ErrorCode;
use crate::model::ContactId;

/// An event plus its position in the contact's trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub seq: u64,
    #[serde(flatten)]
    pub event: Event,
}

impl AuditEntry {
    /// Serialize as one JSON line (without trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Serialize`] if the entry cannot be encoded.
    pub fn to_json_line(&self) -> Result<String, AuditError> {
        serde_json::to_string(self).map_err(AuditError::Serialize)
    }
}

/// Errors from audit log appends and loads.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("event for {contact} at {got} precedes last recorded event at {last}")]
    NonMonotonicTime {
        contact: ContactId,
        last: DateTime<Utc>,
        got: DateTime<Utc>,
    },

    #[error("audit entry for {contact} has seq {got}, expected {expected}")]
    SequenceGap {
        contact: ContactId,
        expected: u64,
        got: u64,
    },

    #[error("invalid audit line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode audit entry: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl AuditError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NonMonotonicTime { .. } | Self::SequenceGap { .. } => {
                ErrorCode::AuditOrderViolation
            }
            Self::Parse { .. } | Self::Serialize(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// In-memory audit side table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    trails: BTreeMap<ContactId, Vec<AuditEntry>>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of events, returning the recorded entries in order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::NonMonotonicTime`] if any event is older than
    /// the latest event already recorded (or batched) for its contact. The
    /// log is unchanged on error.
    pub fn append(&mut self, events: Vec<Event>) -> Result<Vec<AuditEntry>, AuditError> {
        // Validate the whole batch against a running view of each trail tail.
        let mut tails: BTreeMap<ContactId, (u64, Option<DateTime<Utc>>)> = BTreeMap::new();
        let mut staged = Vec::with_capacity(events.len());
        for event in events {
            let (seq, last_time) = tails
                .entry(event.contact.clone())
                .or_insert_with(|| self.tail(&event.contact));
            if let Some(last) = *last_time
                && event.event_time < last
            {
                return Err(AuditError::NonMonotonicTime {
                    contact: event.contact,
                    last,
                    got: event.event_time,
                });
            }
            *seq += 1;
            *last_time = Some(event.event_time);
            staged.push(AuditEntry { seq: *seq, event });
        }

        for entry in &staged {
            self.trails
                .entry(entry.event.contact.clone())
                .or_default()
                .push(entry.clone());
        }
        Ok(staged)
    }

    /// Rebuild a log from previously recorded entries, checking sequence
    /// continuity and time order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::SequenceGap`] or [`AuditError::NonMonotonicTime`].
    pub fn from_entries(
        entries: impl IntoIterator<Item = AuditEntry>,
    ) -> Result<Self, AuditError> {
        let mut log = Self::new();
        for entry in entries {
            let (last_seq, last_time) = log.tail(&entry.event.contact);
            if entry.seq != last_seq + 1 {
                return Err(AuditError::SequenceGap {
                    contact: entry.event.contact,
                    expected: last_seq + 1,
                    got: entry.seq,
                });
            }
            if let Some(last) = last_time
                && entry.event.event_time < last
            {
                return Err(AuditError::NonMonotonicTime {
                    contact: entry.event.contact,
                    last,
                    got: entry.event.event_time,
                });
            }
            log.trails
                .entry(entry.event.contact.clone())
                .or_default()
                .push(entry);
        }
        Ok(log)
    }

    /// Parse a JSON Lines document. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Parse`] with a 1-based line number, or any
    /// error from [`AuditLog::from_entries`].
    pub fn parse_jsonl(content: &str) -> Result<Self, AuditError> {
        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str::<AuditEntry>(line).map_err(|source| {
                AuditError::Parse {
                    line: idx + 1,
                    source,
                }
            })?;
            entries.push(entry);
        }
        Self::from_entries(entries)
    }

    /// The trail for one contact, oldest first.
    #[must_use]
    pub fn entries(&self, contact: &ContactId) -> &[AuditEntry] {
        self.trails
            .get(contact)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of entries across all contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trails.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    fn tail(&self, contact: &ContactId) -> (u64, Option<DateTime<Utc>>) {
        self.trails
            .get(contact)
            .and_then(|trail| trail.last())
            .map_or((0, None), |e| (e.seq, Some(e.event.event_time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventState;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn id(raw: &str) -> ContactId {
        ContactId::new(raw).expect("valid id")
    }

    fn ev(contact: &str, at: DateTime<Utc>) -> Event {
        Event::new(id(contact), "ops", EventState::Updated, at)
    }

    #[test]
    fn seq_is_per_contact_and_strictly_increasing() {
        let mut log = AuditLog::new();
        let recorded = log
            .append(vec![ev("a", t0()), ev("b", t0()), ev("a", t0())])
            .expect("append");
        let seqs: Vec<_> = recorded.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 1, 2]);

        log.append(vec![ev("a", t0() + Duration::seconds(1))])
            .expect("append");
        let trail: Vec<_> = log.entries(&id("a")).iter().map(|e| e.seq).collect();
        assert_eq!(trail, vec![1, 2, 3]);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn rejected_batch_leaves_log_untouched() {
        let mut log = AuditLog::new();
        log.append(vec![ev("a", t0())]).expect("append");
        let before = log.clone();

        let err = log
            .append(vec![
                ev("b", t0()),
                ev("a", t0() - Duration::seconds(5)),
            ])
            .unwrap_err();
        assert!(matches!(err, AuditError::NonMonotonicTime { .. }));
        assert_eq!(err.code(), ErrorCode::AuditOrderViolation);
        assert_eq!(log, before);
        assert!(log.entries(&id("b")).is_empty());
    }

    #[test]
    fn jsonl_roundtrip_preserves_trails() {
        let mut log = AuditLog::new();
        log.append(vec![ev("a", t0()), ev("a", t0() + Duration::minutes(1))])
            .expect("append");
        let text: String = log
            .entries(&id("a"))
            .iter()
            .map(|e| e.to_json_line().expect("encode") + "\n")
            .collect();

        let reloaded = AuditLog::parse_jsonl(&text).expect("parse");
        assert_eq!(reloaded, log);
    }

    #[test]
    fn jsonl_detects_sequence_gap() {
        let line = AuditEntry {
            seq: 2,
            event: ev("a", t0()),
        }
        .to_json_line()
        .expect("encode");
        let err = AuditLog::parse_jsonl(&line).unwrap_err();
        assert!(matches!(err, AuditError::SequenceGap { expected: 1, got: 2, .. }));
    }

    #[test]
    fn jsonl_reports_bad_line_number() {
        let err = AuditLog::parse_jsonl("\n{not json}\n").unwrap_err();
        assert!(matches!(err, AuditError::Parse { line: 2, .. }));
    }

    #[test]
    fn unknown_contact_has_empty_trail() {
        let log = AuditLog::new();
        assert!(log.entries(&id("nobody")).is_empty());
        assert!(log.is_empty());
    }
}
