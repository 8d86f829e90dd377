//! `rdx diff`: show how a source contact differs from a target.

use super::Session;
use crate::output::{OutputMode, pretty_kv, pretty_section, render};
use crate::store::find;
use anyhow::Result;
use clap::Args;
use rolodex_core::{ContactDiff, ContactId, FieldClass};
use std::io::Write;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Surviving contact.
    pub target: ContactId,
    /// Contact that would be absorbed.
    pub source: ContactId,
}

/// Execute `rdx diff`.
///
/// # Errors
///
/// Fails if the store cannot be read or either contact is missing.
pub fn run_diff(args: &DiffArgs, session: &Session<'_>) -> Result<()> {
    let store = session.store()?;
    let contacts = store.load_contacts()?;
    let target = find(&contacts, &args.target)?;
    let source = find(&contacts, &args.source)?;

    let diff = ContactDiff::between(target, source);
    render(session.output, &diff, render_diff)
}

/// Shared by `diff` and `merge --dry-run`.
pub fn render_diff(diff: &ContactDiff, mode: OutputMode, w: &mut dyn Write) -> std::io::Result<()> {
    if mode == OutputMode::Text {
        for field in &diff.fields {
            writeln!(
                w,
                "field\t{}\t{}\t{}\t{}",
                field.class.as_str(),
                field.key,
                field.target_value.as_deref().unwrap_or(""),
                field.source_value
            )?;
        }
        for tag in &diff.tags.added_tags {
            writeln!(w, "tag\tadded\t{tag}")?;
        }
        for tag in &diff.tags.removed_tags {
            writeln!(w, "tag\ttarget_only\t{tag}")?;
        }
        return Ok(());
    }

    pretty_section(w, &format!("Diff {} <- {}", diff.target_id, diff.source_id))?;
    if diff.fields.is_empty() {
        writeln!(w, "  no field differences")?;
    }
    for field in &diff.fields {
        match field.class {
            FieldClass::Conflicting => writeln!(
                w,
                "  ~ {:<16} {} (target, kept) | {} (source)",
                field.key,
                field.target_value.as_deref().unwrap_or(""),
                field.source_value
            )?,
            _ => writeln!(w, "  + {:<16} {}", field.key, field.source_value)?,
        }
    }
    if !diff.tags.is_empty() {
        writeln!(w)?;
        pretty_kv(w, "tags added", diff.tags.added_tags.join(", "))?;
        pretty_kv(w, "target only", diff.tags.removed_tags.join(", "))?;
    }
    if diff.title_differs {
        writeln!(w, "  note: titles differ; the target's title is kept")?;
    }
    if let Some(comments) = &diff.source_comments {
        pretty_kv(w, "source note", comments)?;
    }
    Ok(())
}
