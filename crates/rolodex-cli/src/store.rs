//! File-backed, tenant-scoped contact store.
//!
//! ```text
//! .rolodex/
//!   config.toml
//!   tenants/<tenant>/
//!     contacts.json   (JSON array, rewritten atomically via temp + rename)
//!     events.jsonl    (append-only audit log, one entry per line)
//!     store.lock      (advisory lock held by every mutating command)
//!     commit.pending  (staged contacts of an in-flight commit)
//! ```
//!
//! Contacts are only ever mutated while the tenant lock is held, which
//! serializes merge-apply per tenant and therefore per target.
//!
//! A commit stages the new contacts next to the log offsets it expects,
//! appends every audit line in one write, then publishes the contacts. The
//! audit append is the commit point: an interrupted commit is finished if
//! its lines reached the log and rolled back otherwise, the next time the
//! lock is taken. Readers resolve a leftover stage the same way.

use chrono::{DateTime, Utc};
use rolodex_core::event::{AuditEntry, AuditError, AuditLog, Event, EventState};
use rolodex_core::lock::{LockError, StoreLock};
use rolodex_core::{Contact, ContactId, ErrorCode, MergeOutcome};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Failures reading or writing a tenant store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid tenant name '{0}'")]
    InvalidTenant(String),

    #[error("tenant '{0}' is not initialized")]
    NotInitialized(String),

    #[error("contact {0} not found")]
    ContactNotFound(ContactId),

    #[error("contact {0} already exists")]
    ContactExists(ContactId),

    #[error("contact {id} belongs to tenant '{found}', not '{expected}'")]
    TenantMismatch {
        id: ContactId,
        expected: String,
        found: String,
    },

    #[error("malformed contacts in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl StoreError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidTenant(_) => ErrorCode::TenantMissing,
            Self::NotInitialized(_) => ErrorCode::NotInitialized,
            Self::ContactNotFound(_) => ErrorCode::ContactNotFound,
            Self::ContactExists(_) => ErrorCode::ContactExists,
            Self::TenantMismatch { .. } | Self::Malformed { .. } => ErrorCode::InvalidContact,
            Self::Io { .. } => ErrorCode::StoreWriteFailed,
            Self::Audit(e) => e.code(),
            Self::Lock(e) => e.code(),
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a committed merge wrote to the store.
#[derive(Debug, Clone)]
pub struct MergeCommit {
    pub target_entries: Vec<AuditEntry>,
    pub source_entries: Vec<AuditEntry>,
}

/// Contacts staged by a commit, valid once the log reaches `log_end` bytes.
#[derive(Debug, Serialize, Deserialize)]
struct PendingCommit {
    log_start: u64,
    log_end: u64,
    contacts: Vec<Contact>,
}

/// Handle on one tenant's directory.
#[derive(Debug, Clone)]
pub struct TenantStore {
    tenant: String,
    dir: PathBuf,
}

impl TenantStore {
    /// Validate a tenant name: non-empty, a single path component.
    pub(crate) fn checked_name(tenant: &str) -> Result<&str, StoreError> {
        let name = tenant.trim();
        let bad = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || name.chars().any(char::is_control);
        if bad {
            return Err(StoreError::InvalidTenant(tenant.to_string()));
        }
        Ok(name)
    }

    fn locate(project_root: &Path, tenant: &str) -> Result<Self, StoreError> {
        let name = Self::checked_name(tenant)?;
        Ok(Self {
            tenant: name.to_string(),
            dir: project_root.join(".rolodex/tenants").join(name),
        })
    }

    /// Open an existing tenant store.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidTenant`] for a bad name, [`StoreError::NotInitialized`]
    /// if the tenant directory does not exist.
    pub fn open(project_root: &Path, tenant: &str) -> Result<Self, StoreError> {
        let store = Self::locate(project_root, tenant)?;
        if !store.dir.is_dir() {
            return Err(StoreError::NotInitialized(store.tenant));
        }
        Ok(store)
    }

    /// Create the tenant directory and empty files. Returns `true` if anything
    /// was created.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidTenant`] or [`StoreError::Io`].
    pub fn init(project_root: &Path, tenant: &str) -> Result<(Self, bool), StoreError> {
        let store = Self::locate(project_root, tenant)?;
        fs::create_dir_all(&store.dir).map_err(|e| StoreError::io(&store.dir, e))?;

        let mut created = false;
        let contacts = store.contacts_path();
        if !contacts.exists() {
            store.save_contacts(&[])?;
            created = true;
        }
        let events = store.events_path();
        if !events.exists() {
            fs::write(&events, "").map_err(|e| StoreError::io(&events, e))?;
            created = true;
        }
        Ok((store, created))
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn contacts_path(&self) -> PathBuf {
        self.dir.join("contacts.json")
    }

    fn events_path(&self) -> PathBuf {
        self.dir.join("events.jsonl")
    }

    fn pending_path(&self) -> PathBuf {
        self.dir.join("commit.pending")
    }

    /// Take the exclusive tenant lock, settling any interrupted commit.
    ///
    /// # Errors
    ///
    /// [`StoreError::Lock`] on timeout or I/O failure, or any failure while
    /// settling a staged commit.
    pub fn lock(&self, timeout: Duration) -> Result<StoreLock, StoreError> {
        let lock = StoreLock::acquire(&self.dir.join("store.lock"), timeout)?;
        self.recover()?;
        Ok(lock)
    }

    /// Load every contact in the tenant.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] or [`StoreError::Malformed`].
    pub fn load_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        let log_len = self.log_len()?;
        if let Some(pending) = self.read_pending()?.filter(|p| log_len >= p.log_end) {
            return Ok(pending.contacts);
        }
        let path = self.contacts_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Malformed { path, source })
    }

    /// Replace the contacts file atomically.
    fn save_contacts(&self, contacts: &[Contact]) -> Result<(), StoreError> {
        let path = self.contacts_path();
        let tmp = self.dir.join("contacts.json.tmp");
        let body = serde_json::to_string_pretty(contacts).map_err(|source| {
            StoreError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&tmp, format!("{body}\n")).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))
    }

    /// Load the tenant's audit log.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] or [`StoreError::Audit`] for a corrupt log.
    pub fn load_audit(&self) -> Result<AuditLog, StoreError> {
        let path = self.events_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(AuditLog::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        let committed = match self.read_pending()? {
            Some(pending) if (content.len() as u64) < pending.log_end => {
                let start = usize::try_from(pending.log_start).unwrap_or(usize::MAX);
                content.get(..start).unwrap_or(&content)
            }
            _ => content.as_str(),
        };
        Ok(AuditLog::parse_jsonl(committed)?)
    }

    fn log_len(&self) -> Result<u64, StoreError> {
        let path = self.events_path();
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn read_pending(&self) -> Result<Option<PendingCommit>, StoreError> {
        let path = self.pending_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Malformed { path, source })
    }

    fn clear_pending(&self) -> Result<(), StoreError> {
        let path = self.pending_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Finish or roll back a commit left behind by a crashed writer.
    fn recover(&self) -> Result<(), StoreError> {
        let Some(pending) = self.read_pending()? else {
            return Ok(());
        };
        let len = self.log_len()?;
        if len >= pending.log_end {
            self.save_contacts(&pending.contacts)?;
            info!(tenant = %self.tenant, "finished interrupted commit");
        } else {
            if len > pending.log_start {
                let path = self.events_path();
                OpenOptions::new()
                    .write(true)
                    .open(&path)
                    .and_then(|f| f.set_len(pending.log_start))
                    .map_err(|e| StoreError::io(&path, e))?;
            }
            warn!(tenant = %self.tenant, "rolled back interrupted commit");
        }
        self.clear_pending()
    }

    /// Stage `contacts`, append `entries` in one write, then publish.
    fn commit(&self, contacts: Vec<Contact>, entries: &[AuditEntry]) -> Result<(), StoreError> {
        let lines = encode_lines(entries)?;
        let pending = self.stage(contacts, lines.len())?;
        self.append_lines(&lines)?;
        self.save_contacts(&pending.contacts)?;
        self.clear_pending()
    }

    fn stage(
        &self,
        contacts: Vec<Contact>,
        line_bytes: usize,
    ) -> Result<PendingCommit, StoreError> {
        let log_start = self.log_len()?;
        let pending = PendingCommit {
            log_start,
            log_end: log_start + line_bytes as u64,
            contacts,
        };
        let path = self.pending_path();
        let tmp = self.dir.join("commit.pending.tmp");
        let body = serde_json::to_string(&pending).map_err(|source| StoreError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp, body).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;
        Ok(pending)
    }

    fn append_lines(&self, lines: &str) -> Result<(), StoreError> {
        if lines.is_empty() {
            return Ok(());
        }
        let path = self.events_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        file.write_all(lines.as_bytes())
            .map_err(|e| StoreError::io(&path, e))
    }

    /// Add new contacts, recording a `CREATED` event for each.
    ///
    /// Contacts without a tenant are stamped with this store's tenant. The
    /// batch is rejected as a whole if any id already exists.
    ///
    /// # Errors
    ///
    /// [`StoreError::ContactExists`], [`StoreError::TenantMismatch`], or any
    /// load/save failure.
    pub fn import(
        &self,
        incoming: Vec<Contact>,
        actor: &str,
        at: DateTime<Utc>,
        _lock: &StoreLock,
    ) -> Result<Vec<ContactId>, StoreError> {
        let mut contacts = self.load_contacts()?;
        let mut audit = self.load_audit()?;

        let mut added = Vec::with_capacity(incoming.len());
        let mut events = Vec::with_capacity(incoming.len());
        for mut contact in incoming {
            if contact.tenant.trim().is_empty() {
                contact.tenant.clone_from(&self.tenant);
            } else if contact.tenant != self.tenant {
                return Err(StoreError::TenantMismatch {
                    id: contact.id,
                    expected: self.tenant.clone(),
                    found: contact.tenant,
                });
            }
            if contacts.iter().any(|c| c.id == contact.id) {
                return Err(StoreError::ContactExists(contact.id));
            }
            events.push(
                Event::new(contact.id.clone(), actor, EventState::Created, at)
                    .with_change("", contact.title.as_str()),
            );
            added.push(contact.id.clone());
            contacts.push(contact);
        }

        let entries = audit.append(events)?;
        self.commit(contacts, &entries)?;
        info!(tenant = %self.tenant, imported = added.len(), "contacts imported");
        Ok(added)
    }

    /// Persist an applied merge: replace the target, retire the source and
    /// append the audit entries.
    ///
    /// Whenever the source is retired its trail gets one `MERGED` event
    /// naming the target, including after an idempotent re-apply.
    ///
    /// # Errors
    ///
    /// [`StoreError::ContactNotFound`] if the target vanished, or any
    /// load/save/audit failure. Nothing is committed on error.
    pub fn commit_merge(
        &self,
        outcome: &MergeOutcome,
        actor: &str,
        at: DateTime<Utc>,
        _lock: &StoreLock,
    ) -> Result<MergeCommit, StoreError> {
        let mut contacts = self.load_contacts()?;
        let mut audit = self.load_audit()?;

        let slot = contacts
            .iter_mut()
            .find(|c| c.id == outcome.contact.id)
            .ok_or_else(|| StoreError::ContactNotFound(outcome.contact.id.clone()))?;
        slot.clone_from(&outcome.contact);
        let before = contacts.len();
        contacts.retain(|c| c.id != outcome.absorbed);
        let retired = contacts.len() < before;

        let target_entries = audit.append(outcome.events.clone())?;
        let source_entries = if retired {
            audit.append(vec![
                Event::new(outcome.absorbed.clone(), actor, EventState::Merged, at).with_change(
                    outcome.absorbed.as_str(),
                    outcome.contact.id.as_str(),
                ),
            ])?
        } else {
            Vec::new()
        };

        let entries: Vec<AuditEntry> = target_entries
            .iter()
            .chain(&source_entries)
            .cloned()
            .collect();
        self.commit(contacts, &entries)?;

        debug!(
            target_events = target_entries.len(),
            retired, "merge committed to store"
        );
        Ok(MergeCommit {
            target_entries,
            source_entries,
        })
    }
}

fn encode_lines(entries: &[AuditEntry]) -> Result<String, StoreError> {
    let mut buf = String::new();
    for entry in entries {
        buf.push_str(&entry.to_json_line()?);
        buf.push('\n');
    }
    Ok(buf)
}

/// Look up a contact by id.
///
/// # Errors
///
/// [`StoreError::ContactNotFound`].
pub fn find<'a>(contacts: &'a [Contact], id: &ContactId) -> Result<&'a Contact, StoreError> {
    contacts
        .iter()
        .find(|c| &c.id == id)
        .ok_or_else(|| StoreError::ContactNotFound(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::{apply_plan, plan_merge};

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn contact(id: &str, props: &[(&str, &str)], tags: &[&str]) -> Contact {
        let mut c = Contact::new(id, "Ana Novak", at()).expect("valid contact");
        for (k, v) in props {
            c.props.insert(*k, *v).expect("valid prop");
        }
        for t in tags {
            c.tags.insert(*t).expect("valid tag");
        }
        c
    }

    fn timeout() -> Duration {
        Duration::from_millis(200)
    }

    #[test]
    fn tenant_names_are_validated() {
        let root = tempfile::tempdir().expect("temp dir");
        for bad in ["", "  ", "..", "a/b", "a\\b"] {
            assert!(matches!(
                TenantStore::init(root.path(), bad),
                Err(StoreError::InvalidTenant(_))
            ));
        }
        assert!(matches!(
            TenantStore::open(root.path(), "nobody"),
            Err(StoreError::NotInitialized(_))
        ));
    }

    #[test]
    fn init_is_idempotent() {
        let root = tempfile::tempdir().expect("temp dir");
        let (_, created) = TenantStore::init(root.path(), "acme").expect("init");
        assert!(created);
        let (store, created) = TenantStore::init(root.path(), "acme").expect("re-init");
        assert!(!created);
        assert!(store.load_contacts().expect("load").is_empty());
        assert!(store.load_audit().expect("audit").is_empty());
    }

    #[test]
    fn import_stamps_tenant_and_rejects_existing_ids() {
        let root = tempfile::tempdir().expect("temp dir");
        let (store, _) = TenantStore::init(root.path(), "acme").expect("init");
        let lock = store.lock(timeout()).expect("lock");

        let ids = store
            .import(vec![contact("a", &[], &[])], "ops", at(), &lock)
            .expect("import");
        assert_eq!(ids.len(), 1);
        let loaded = store.load_contacts().expect("load");
        assert_eq!(loaded[0].tenant, "acme");

        let err = store
            .import(vec![contact("b", &[], &[]), contact("a", &[], &[])], "ops", at(), &lock)
            .unwrap_err();
        assert!(matches!(err, StoreError::ContactExists(_)));
        assert_eq!(store.load_contacts().expect("load").len(), 1, "batch is all-or-nothing");

        let foreign = contact("c", &[], &[]).with_tenant("globex");
        let err = store.import(vec![foreign], "ops", at(), &lock).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidContact);
    }

    #[test]
    fn commit_merge_retires_source_and_records_both_trails() {
        let root = tempfile::tempdir().expect("temp dir");
        let (store, _) = TenantStore::init(root.path(), "acme").expect("init");
        let lock = store.lock(timeout()).expect("lock");
        store
            .import(
                vec![
                    contact("t", &[("email", "")], &["vip"]),
                    contact("s", &[("email", "a@b.com")], &["lead"]),
                ],
                "ops",
                at(),
                &lock,
            )
            .expect("import");

        let contacts = store.load_contacts().expect("load");
        let target = find(&contacts, &"t".parse().expect("id")).expect("target");
        let source = find(&contacts, &"s".parse().expect("id")).expect("source");
        let plan = plan_merge(target, source).expect("plan");
        let outcome = apply_plan(&plan, target, source, "ops", at()).expect("apply");
        let commit = store.commit_merge(&outcome, "ops", at(), &lock).expect("commit");

        assert_eq!(commit.target_entries.len(), 2);
        assert_eq!(commit.source_entries.len(), 1);

        let contacts = store.load_contacts().expect("reload");
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].props.get("email"), Some("a@b.com"));

        let audit = store.load_audit().expect("audit");
        let source_trail = audit.entries(&"s".parse().expect("id"));
        assert_eq!(
            source_trail.iter().map(|e| e.event.event_state).collect::<Vec<_>>(),
            vec![EventState::Created, EventState::Merged]
        );
        assert_eq!(source_trail[1].event.current_state, "t");
        let target_trail = audit.entries(&"t".parse().expect("id"));
        assert_eq!(target_trail.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    fn seeded_merge(root: &Path) -> (TenantStore, MergeOutcome) {
        let (store, _) = TenantStore::init(root, "acme").expect("init");
        {
            let lock = store.lock(timeout()).expect("lock");
            store
                .import(
                    vec![
                        contact("t", &[("email", "")], &["vip"]),
                        contact("s", &[("email", "a@b.com")], &["lead"]),
                    ],
                    "ops",
                    at(),
                    &lock,
                )
                .expect("import");
        }
        let contacts = store.load_contacts().expect("load");
        let target = find(&contacts, &"t".parse().expect("id")).expect("target");
        let source = find(&contacts, &"s".parse().expect("id")).expect("source");
        let plan = plan_merge(target, source).expect("plan");
        let outcome = apply_plan(&plan, target, source, "ops", at()).expect("apply");
        (store, outcome)
    }

    /// Stage the merged contacts and the encoded audit lines the way a
    /// commit would, without running any later step.
    fn stage_merge(store: &TenantStore, outcome: &MergeOutcome) -> String {
        let mut audit = store.load_audit().expect("audit");
        let entries = audit.append(outcome.events.clone()).expect("append");
        let lines = encode_lines(&entries).expect("encode");
        store
            .stage(vec![outcome.contact.clone()], lines.len())
            .expect("stage");
        lines
    }

    fn trail_states(store: &TenantStore, id: &str) -> Vec<EventState> {
        store
            .load_audit()
            .expect("audit")
            .entries(&id.parse().expect("id"))
            .iter()
            .map(|e| e.event.event_state)
            .collect()
    }

    #[test]
    fn commit_cut_short_during_log_append_is_rolled_back() {
        let root = tempfile::tempdir().expect("temp dir");
        let (store, outcome) = seeded_merge(root.path());
        let events_before = fs::read(store.dir().join("events.jsonl")).expect("read log");

        let lines = stage_merge(&store, &outcome);
        // Half a batch reaches the log, then the writer dies.
        store
            .append_lines(&lines[..lines.len() / 2])
            .expect("partial append");

        assert_eq!(store.load_contacts().expect("load").len(), 2);
        assert_eq!(trail_states(&store, "t"), vec![EventState::Created]);

        let lock = store.lock(timeout()).expect("lock settles the stage");
        assert!(!store.dir().join("commit.pending").exists());
        assert_eq!(
            fs::read(store.dir().join("events.jsonl")).expect("read log"),
            events_before
        );
        assert_eq!(store.load_contacts().expect("load").len(), 2);

        let commit = store.commit_merge(&outcome, "ops", at(), &lock).expect("commit");
        assert_eq!(commit.target_entries.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn commit_cut_short_after_log_append_is_finished() {
        let root = tempfile::tempdir().expect("temp dir");
        let (store, outcome) = seeded_merge(root.path());

        let lines = stage_merge(&store, &outcome);
        store.append_lines(&lines).expect("append");

        // Readers already see the committed state.
        let contacts = store.load_contacts().expect("load");
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].props.get("email"), Some("a@b.com"));
        assert_eq!(
            trail_states(&store, "t"),
            vec![EventState::Created, EventState::MergePropAdd, EventState::MergeTagAdd]
        );

        let _lock = store.lock(timeout()).expect("lock settles the stage");
        assert!(!store.dir().join("commit.pending").exists());
        let on_disk: Vec<Contact> = serde_json::from_str(
            &fs::read_to_string(store.dir().join("contacts.json")).expect("read contacts"),
        )
        .expect("parse contacts");
        assert_eq!(on_disk, vec![outcome.contact]);
    }

    #[test]
    fn retiring_source_after_idempotent_apply_records_absorption() {
        let root = tempfile::tempdir().expect("temp dir");
        let (store, outcome) = seeded_merge(root.path());
        let contacts = store.load_contacts().expect("load");
        let target = find(&contacts, &"t".parse().expect("id")).expect("target");
        let noop = MergeOutcome {
            contact: target.clone(),
            events: Vec::new(),
            absorbed: outcome.absorbed.clone(),
            already_applied: true,
        };

        let lock = store.lock(timeout()).expect("lock");
        let commit = store.commit_merge(&noop, "ops", at(), &lock).expect("commit");
        assert!(commit.target_entries.is_empty());
        assert_eq!(commit.source_entries.len(), 1);
        assert_eq!(store.load_contacts().expect("load").len(), 1);
        assert_eq!(
            trail_states(&store, "s"),
            vec![EventState::Created, EventState::Merged]
        );
    }

    #[test]
    fn corrupt_contacts_file_is_reported() {
        let root = tempfile::tempdir().expect("temp dir");
        let (store, _) = TenantStore::init(root.path(), "acme").expect("init");
        fs::write(store.dir().join("contacts.json"), "[{\"id\": \"\"}]").expect("write");
        let err = store.load_contacts().unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}
