pub mod completions;
pub mod diff;
pub mod dups;
pub mod import;
pub mod init;
pub mod log;
pub mod merge;

use crate::output::OutputMode;
use crate::store::{StoreError, TenantStore};
use rolodex_core::config::EffectiveConfig;
use std::path::Path;
use std::time::Duration;

/// Per-invocation settings shared by every command.
#[derive(Debug)]
pub struct Session<'a> {
    pub project_root: &'a Path,
    pub output: OutputMode,
    pub config: &'a EffectiveConfig,
    pub tenant: Option<&'a str>,
    /// Operator recorded on audit events.
    pub actor: &'a str,
}

impl Session<'_> {
    /// The `--tenant` value; data commands cannot run without one.
    pub fn tenant(&self) -> Result<&str, StoreError> {
        self.tenant
            .ok_or_else(|| StoreError::InvalidTenant(String::new()))
    }

    /// Open the selected tenant's store.
    pub fn store(&self) -> Result<TenantStore, StoreError> {
        TenantStore::open(self.project_root, self.tenant()?)
    }

    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.config.project.merge.lock_timeout_ms)
    }
}
