//! `rdx log`: print the audit trail of one contact.

use super::Session;
use crate::output::{OutputMode, pretty_section, render};
use anyhow::Result;
use clap::Args;
use rolodex_core::{AuditEntry, ContactId};
use std::io::Write;

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Contact id, including contacts absorbed by a merge.
    pub id: ContactId,

    /// Show only the most recent N entries.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Execute `rdx log`.
///
/// # Errors
///
/// Fails if the store or its audit log cannot be read.
pub fn run_log(args: &LogArgs, session: &Session<'_>) -> Result<()> {
    let store = session.store()?;
    let audit = store.load_audit()?;
    let trail = audit.entries(&args.id);
    let skip = args
        .limit
        .map_or(0, |limit| trail.len().saturating_sub(limit));
    let rows: Vec<AuditEntry> = trail[skip..].to_vec();

    render(session.output, &rows, |rows, mode, w| {
        render_rows(&args.id, rows, mode, w)
    })
}

fn render_rows(
    id: &ContactId,
    rows: &[AuditEntry],
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if mode == OutputMode::Pretty {
        pretty_section(w, &format!("Audit trail for {id}"))?;
        if rows.is_empty() {
            writeln!(w, "  no events recorded")?;
        }
    }
    for entry in rows {
        let e = &entry.event;
        let change = match (e.prev_state.is_empty(), e.current_state.is_empty()) {
            (true, true) => String::new(),
            (true, false) => e.current_state.clone(),
            (false, true) => format!("{} ->", e.prev_state),
            (false, false) => format!("{} -> {}", e.prev_state, e.current_state),
        };
        match mode {
            OutputMode::Pretty => writeln!(
                w,
                "{:>4}  {}  {:<16} {:<12} {:<12} {}",
                entry.seq,
                e.event_time.format("%Y-%m-%d %H:%M:%S"),
                e.event_state.as_str(),
                e.user,
                e.prop_key,
                change
            )?,
            _ => writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                entry.seq,
                e.event_time.to_rfc3339(),
                e.event_state.as_str(),
                e.user,
                e.prop_key,
                change
            )?,
        }
    }
    Ok(())
}
