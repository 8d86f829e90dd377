//! `rdx merge`: fold a source contact into a target.
//!
//! Plan, review overrides, apply and commit all happen under the tenant
//! lock, so the snapshots the plan was built from are the ones it is
//! applied to.

use super::Session;
use super::diff::render_diff;
use crate::output::{OutputMode, pretty_kv, render};
use crate::store::find;
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use rolodex_core::{AuditEntry, Contact, ContactId, MergeError, MergePlan, apply_plan, plan_merge};
use serde::Serialize;
use std::io::Write;
use tracing::info;

#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:\n    # Merge c-2 into c-1 (c-1 survives)\n    rdx --tenant acme merge c-1 c-2\n\n\
                  # Let the source's phone number win\n    rdx --tenant acme merge c-1 c-2 --prefer-source phone\n\n\
                  # Preview only\n    rdx --tenant acme merge c-1 c-2 --dry-run --json")]
pub struct MergeArgs {
    /// Surviving contact.
    pub target: ContactId,
    /// Contact to absorb and retire.
    pub source: ContactId,

    /// Take the source's value for this conflicting property (repeatable).
    #[arg(long = "prefer-source", value_name = "KEY")]
    pub prefer_source: Vec<String>,

    /// Print the plan without applying it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct DryRunOutput<'a> {
    dry_run: bool,
    plan: &'a MergePlan,
}

#[derive(Debug, Serialize)]
struct MergeOutput {
    target: String,
    absorbed: String,
    already_applied: bool,
    contact: Contact,
    events: Vec<AuditEntry>,
}

/// Execute `rdx merge`.
///
/// # Errors
///
/// Fails with a typed error for missing contacts, invalid plans, unknown
/// override keys, stale snapshots, lock timeouts and store failures. The
/// store is left unchanged on error.
pub fn run_merge(args: &MergeArgs, session: &Session<'_>) -> Result<()> {
    let store = session.store()?;
    let lock = store.lock(session.lock_timeout())?;

    let contacts = store.load_contacts()?;
    let target = find(&contacts, &args.target)?;
    let source = find(&contacts, &args.source)?;

    let mut plan = plan_merge(target, source)?;
    if !args.prefer_source.is_empty() && !session.config.project.merge.allow_source_override {
        return Err(MergeError::InvalidPlan(
            "source overrides are disabled (merge.allow_source_override = false)".to_string(),
        )
        .into());
    }
    for key in &args.prefer_source {
        plan.prefer_source(key)?;
    }

    if args.dry_run {
        let out = DryRunOutput {
            dry_run: true,
            plan: &plan,
        };
        return render(session.output, &out, |o, mode, w| render_plan(o.plan, mode, w));
    }

    let now = Utc::now();
    let outcome = apply_plan(&plan, target, source, session.actor, now)?;
    let commit = store.commit_merge(&outcome, session.actor, now, &lock)?;
    lock.release();

    info!(
        tenant = store.tenant(),
        target = %outcome.contact.id,
        absorbed = %outcome.absorbed,
        events = outcome.events.len(),
        "merge committed"
    );

    let mut events = commit.target_entries;
    events.extend(commit.source_entries);
    let out = MergeOutput {
        target: outcome.contact.id.to_string(),
        absorbed: outcome.absorbed.to_string(),
        already_applied: outcome.already_applied,
        contact: outcome.contact,
        events,
    };
    render(session.output, &out, render_result)
}

fn render_plan(plan: &MergePlan, mode: OutputMode, w: &mut dyn Write) -> std::io::Result<()> {
    render_diff(&plan.diff, mode, w)?;
    let overrides: Vec<_> = plan
        .adopted()
        .filter(|r| plan.diff.conflicts().any(|c| c.key == r.key))
        .map(|r| r.key.as_str())
        .collect();
    if mode == OutputMode::Pretty {
        writeln!(w)?;
        if !overrides.is_empty() {
            pretty_kv(w, "overrides", overrides.join(", "))?;
        }
        writeln!(w, "dry run: nothing was changed")?;
    } else {
        for key in overrides {
            writeln!(w, "override\t{key}")?;
        }
    }
    Ok(())
}

fn render_result(out: &MergeOutput, mode: OutputMode, w: &mut dyn Write) -> std::io::Result<()> {
    if mode == OutputMode::Text {
        writeln!(w, "merged\t{}\t{}\t{}", out.target, out.absorbed, out.events.len())?;
        for entry in &out.events {
            let e = &entry.event;
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                e.contact,
                e.event_state.as_str(),
                e.prop_key,
                e.current_state
            )?;
        }
        return Ok(());
    }

    writeln!(w, "merged {} into {}", out.absorbed, out.target)?;
    if out.already_applied {
        writeln!(w, "  target already reflected this merge; no changes")?;
    }
    for entry in &out.events {
        let e = &entry.event;
        if e.prop_key.is_empty() {
            writeln!(w, "  {:<15} {}", e.event_state.as_str(), e.current_state)?;
        } else {
            writeln!(
                w,
                "  {:<15} {} = {}",
                e.event_state.as_str(),
                e.prop_key,
                e.current_state
            )?;
        }
    }
    Ok(())
}
