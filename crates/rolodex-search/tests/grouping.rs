//! Duplicate grouping over realistic tenant snapshots.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rolodex_core::config::DedupConfig;
use rolodex_core::{Contact, ContactId};
use rolodex_search::{GroupReason, candidate_pairs, find_duplicate_groups};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn contact(id: &str, title: &str, email: Option<&str>, age_days: i64) -> Contact {
    let mut c = Contact::new(id, title, base() - Duration::days(age_days)).expect("valid contact");
    if let Some(email) = email {
        c.props.insert("email", email).expect("valid prop");
    }
    c
}

fn ids(raw: &[&str]) -> Vec<ContactId> {
    raw.iter()
        .map(|id| ContactId::new(*id).expect("valid id"))
        .collect()
}

#[test]
fn groups_by_title_oldest_first() {
    let contacts = vec![
        contact("c-2", "Ana Novak", None, 1),
        contact("c-1", "  ana   NOVAK", None, 10),
        contact("c-3", "Boris Horvat", None, 5),
    ];
    let groups = find_duplicate_groups(&contacts, &DedupConfig::default());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, "title:ana novak");
    assert_eq!(groups[0].reason, GroupReason::Title);
    assert_eq!(groups[0].members, ids(&["c-1", "c-2"]));
}

#[test]
fn email_group_only_when_disjoint_from_title_groups() {
    let contacts = vec![
        contact("a", "Ana Novak", Some("ana@acme.si"), 3),
        contact("b", "Ana Novak", Some("ana@acme.si"), 2),
        contact("c", "A. Novak", Some("ANA@acme.si"), 1),
        contact("d", "Dora", Some("dora@acme.si"), 4),
        contact("e", "D. Kos", Some("dora@acme.si "), 2),
    ];
    let groups = find_duplicate_groups(&contacts, &DedupConfig::default());

    let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["email:dora@acme.si", "title:ana novak"]);
    assert_eq!(groups[0].reason, GroupReason::Email);
    assert_eq!(groups[0].members, ids(&["d", "e"]));
}

#[test]
fn blank_and_malformed_emails_never_group() {
    let contacts = vec![
        contact("a", "One", Some(""), 1),
        contact("b", "Two", Some("  "), 2),
        contact("c", "Three", Some("not-an-address"), 3),
        contact("d", "Four", Some("not-an-address"), 4),
    ];
    assert!(find_duplicate_groups(&contacts, &DedupConfig::default()).is_empty());
}

#[test]
fn config_switches_and_custom_email_key() {
    let mut a = contact("a", "Same", None, 2);
    a.props.insert("mail", "x@y.com").expect("valid prop");
    let mut b = contact("b", "Same", None, 1);
    b.props.insert("mail", "x@y.com").expect("valid prop");
    let contacts = vec![a, b];

    let config = DedupConfig {
        group_by_title: false,
        email_key: "mail".into(),
        ..DedupConfig::default()
    };
    let groups = find_duplicate_groups(&contacts, &config);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, "email:x@y.com");

    let off = DedupConfig {
        group_by_title: false,
        group_by_email: false,
        ..DedupConfig::default()
    };
    assert!(find_duplicate_groups(&contacts, &off).is_empty());
}

#[test]
fn min_group_size_filters_small_groups() {
    let contacts = vec![
        contact("a", "Pair", None, 1),
        contact("b", "Pair", None, 2),
        contact("c", "Trio", None, 1),
        contact("d", "Trio", None, 2),
        contact("e", "Trio", None, 3),
    ];
    let config = DedupConfig {
        min_group_size: 3,
        ..DedupConfig::default()
    };
    let groups = find_duplicate_groups(&contacts, &config);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, "title:trio");
}

#[test]
fn oldest_member_absorbs_the_rest() {
    let contacts = vec![
        contact("new", "Trio", None, 1),
        contact("old", "Trio", None, 30),
        contact("mid", "Trio", None, 7),
    ];
    let groups = find_duplicate_groups(&contacts, &DedupConfig::default());
    let pairs = candidate_pairs(&groups[0]);

    let old = ContactId::new("old").expect("valid id");
    assert_eq!(
        pairs,
        vec![
            (old.clone(), ContactId::new("mid").expect("valid id")),
            (old, ContactId::new("new").expect("valid id")),
        ]
    );
}

#[test]
fn repeated_ids_are_counted_once() {
    let contacts = vec![
        contact("a", "Solo", None, 1),
        contact("a", "Solo", None, 1),
    ];
    assert!(find_duplicate_groups(&contacts, &DedupConfig::default()).is_empty());
}

const TITLES: [&str; 4] = ["Ana", "ana ", "Boris", "Cene"];
const EMAILS: [&str; 4] = ["", "a@x.si", "b@x.si", "A@X.si"];

fn arb_contacts() -> impl Strategy<Value = Vec<Contact>> {
    prop::collection::vec((0..TITLES.len(), 0..EMAILS.len(), 0i64..50), 0..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (t, e, age))| contact(&format!("c-{i}"), TITLES[t], Some(EMAILS[e]), age))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn every_contact_lands_in_at_most_one_group(contacts in arb_contacts()) {
        let groups = find_duplicate_groups(&contacts, &DedupConfig::default());
        let mut seen = std::collections::BTreeSet::new();
        for group in &groups {
            prop_assert!(group.members.len() >= 2);
            for member in &group.members {
                prop_assert!(seen.insert(member.clone()), "{member} listed twice");
            }
        }
    }

    #[test]
    fn groups_are_sorted_and_members_oldest_first(contacts in arb_contacts()) {
        let groups = find_duplicate_groups(&contacts, &DedupConfig::default());
        prop_assert!(groups.windows(2).all(|w| w[0].key < w[1].key));
        let created: std::collections::BTreeMap<_, _> =
            contacts.iter().map(|c| (c.id.clone(), c.created_at)).collect();
        for group in &groups {
            prop_assert!(group.members.windows(2).all(|w| created[&w[0]] <= created[&w[1]]));
        }
    }
}
