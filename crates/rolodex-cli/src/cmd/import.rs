//! `rdx import`: load contacts from a JSON file into a tenant.

use super::Session;
use crate::output::render;
use crate::store::StoreError;
use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;
use rolodex_core::Contact;
use serde::Serialize;
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:\n    rdx --tenant acme import contacts.json\n\n\
                  The file holds a JSON array of contacts:\n    \
                  [{\"id\": \"c-1\", \"title\": \"Ana Novak\", \"props\": {\"email\": \"ana@acme.si\"},\n      \
                  \"tags\": [\"vip\"], \"created_at\": \"2024-01-01T00:00:00Z\"}]")]
pub struct ImportArgs {
    /// JSON file with an array of contacts.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ImportOutput {
    tenant: String,
    imported: Vec<String>,
}

/// Execute `rdx import`.
///
/// # Errors
///
/// Fails on unreadable or malformed input, ids that already exist, or store
/// write failures. Nothing is imported on error.
pub fn run_import(args: &ImportArgs, session: &Session<'_>) -> Result<()> {
    let store = session.store()?;
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let incoming: Vec<Contact> =
        serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
            path: args.file.clone(),
            source,
        })?;

    let lock = store.lock(session.lock_timeout())?;
    let ids = store.import(incoming, session.actor, Utc::now(), &lock)?;
    lock.release();

    let out = ImportOutput {
        tenant: store.tenant().to_string(),
        imported: ids.iter().map(ToString::to_string).collect(),
    };
    render(session.output, &out, |o, _, w| {
        writeln!(w, "imported {} contact(s) into {}", o.imported.len(), o.tenant)
    })
}
