//! `rdx init`: create the project config and a tenant store.

use super::Session;
use crate::output::{pretty_kv, render};
use crate::store::TenantStore;
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write as _;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitArgs {}

const CONFIG_TOML: &str = "[merge]\n\
    allow_source_override = true\n\
    lock_timeout_ms = 5000\n\
    \n\
    [dedup]\n\
    group_by_title = true\n\
    group_by_email = true\n\
    email_key = \"email\"\n\
    min_group_size = 2\n";

#[derive(Debug, Serialize)]
struct InitOutput {
    tenant: String,
    path: String,
    created: bool,
}

/// Execute `rdx init`. Safe to re-run; existing files are left alone.
///
/// # Errors
///
/// Returns an error if the tenant name is invalid or a file cannot be written.
pub fn run_init(_args: &InitArgs, session: &Session<'_>) -> Result<()> {
    let tenant = TenantStore::checked_name(session.tenant()?)?;

    let rolodex_dir = session.project_root.join(".rolodex");
    std::fs::create_dir_all(&rolodex_dir)
        .with_context(|| format!("Failed to create {}", rolodex_dir.display()))?;

    let config_path = rolodex_dir.join("config.toml");
    let mut created = false;
    if !config_path.exists() {
        std::fs::write(&config_path, CONFIG_TOML)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        created = true;
    }

    let (store, store_created) = TenantStore::init(session.project_root, tenant)?;
    created |= store_created;
    if created {
        info!(tenant = store.tenant(), "tenant store initialized");
    }

    let out = InitOutput {
        tenant: store.tenant().to_string(),
        path: store.dir().display().to_string(),
        created,
    };
    render(session.output, &out, |o, _, w| {
        let verb = if o.created { "initialized" } else { "already initialized" };
        writeln!(w, "tenant {} {verb}", o.tenant)?;
        pretty_kv(w, "path", &o.path)
    })
}
