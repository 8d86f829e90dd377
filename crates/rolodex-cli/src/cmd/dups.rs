//! `rdx dups`: list groups of likely duplicate contacts.

use super::Session;
use crate::output::{OutputMode, pretty_rule, render};
use anyhow::Result;
use clap::Args;
use rolodex_core::Contact;
use rolodex_search::{candidate_pairs, find_duplicate_groups};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:\n    # List every group\n    rdx --tenant acme dups\n\n\
                  # First ten groups as JSON\n    rdx --tenant acme dups --limit 10 --json")]
pub struct DupsArgs {
    /// Maximum number of groups to report.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    pub id: String,
    pub title: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DupGroupOutput {
    pub key: String,
    pub reason: &'static str,
    pub members: Vec<GroupMember>,
    /// Suggested `(target, source)` merges, oldest member as target.
    pub pairs: Vec<[String; 2]>,
}

/// Execute `rdx dups`.
///
/// # Errors
///
/// Fails if the tenant store cannot be opened or read.
pub fn run_dups(args: &DupsArgs, session: &Session<'_>) -> Result<()> {
    let store = session.store()?;
    let contacts = store.load_contacts()?;
    let by_id: HashMap<_, &Contact> = contacts.iter().map(|c| (&c.id, c)).collect();

    let mut groups = find_duplicate_groups(&contacts, &session.config.project.dedup);
    if let Some(limit) = args.limit {
        groups.truncate(limit);
    }

    let rendered: Vec<DupGroupOutput> = groups
        .iter()
        .map(|g| DupGroupOutput {
            key: g.key.clone(),
            reason: g.reason.as_str(),
            members: g
                .members
                .iter()
                .filter_map(|id| by_id.get(id))
                .map(|c| GroupMember {
                    id: c.id.to_string(),
                    title: c.title.clone(),
                    created_at: c.created_at.to_rfc3339(),
                })
                .collect(),
            pairs: candidate_pairs(g)
                .into_iter()
                .map(|(t, s)| [t.to_string(), s.to_string()])
                .collect(),
        })
        .collect();

    render(session.output, rendered.as_slice(), render_human)
}

fn render_human(
    groups: &[DupGroupOutput],
    mode: OutputMode,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if groups.is_empty() {
        return writeln!(w, "no duplicate groups found");
    }
    if mode == OutputMode::Text {
        for group in groups {
            let ids: Vec<_> = group.members.iter().map(|m| m.id.as_str()).collect();
            writeln!(w, "{}\t{}\t{}", group.key, group.reason, ids.join(","))?;
        }
        return Ok(());
    }
    for (i, group) in groups.iter().enumerate() {
        writeln!(w, "Group {} ({} by {})", i + 1, group.members.len(), group.reason)?;
        pretty_rule(w)?;
        for (j, member) in group.members.iter().enumerate() {
            let role = if j == 0 { "target" } else { "source" };
            writeln!(w, "  {:<7} {:<20} {}", role, member.id, member.title)?;
        }
        for [target, source] in &group.pairs {
            writeln!(w, "  merge:  rdx merge {target} {source}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(key: &str, ids: &[&str]) -> DupGroupOutput {
        DupGroupOutput {
            key: key.to_string(),
            reason: "title",
            members: ids
                .iter()
                .map(|id| GroupMember {
                    id: (*id).to_string(),
                    title: "Ana Novak".to_string(),
                    created_at: "2024-05-01T12:00:00+00:00".to_string(),
                })
                .collect(),
            pairs: ids
                .iter()
                .skip(1)
                .map(|s| [ids[0].to_string(), (*s).to_string()])
                .collect(),
        }
    }

    #[test]
    fn text_rows_list_members_oldest_first() {
        let groups = vec![group("title:ana novak", &["c-1", "c-2", "c-3"])];
        let mut buf = Vec::new();
        render_human(groups.as_slice(), OutputMode::Text, &mut buf).expect("render");
        assert_eq!(
            String::from_utf8(buf).expect("utf8"),
            "title:ana novak\ttitle\tc-1,c-2,c-3\n"
        );
    }

    #[test]
    fn pretty_output_suggests_one_merge_per_source() {
        let groups = [group("title:ana novak", &["c-1", "c-2"])];
        let mut buf = Vec::new();
        render_human(&groups, OutputMode::Pretty, &mut buf).expect("render");
        let out = String::from_utf8(buf).expect("utf8");
        assert!(out.contains("Group 1 (2 by title)"));
        assert!(out.contains("rdx merge c-1 c-2"));
    }

    #[test]
    fn empty_slice_reports_no_groups() {
        let mut buf = Vec::new();
        render_human(&[], OutputMode::Text, &mut buf).expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "no duplicate groups found\n");
    }
}
