#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rolodex_core::{Contact, Props, Tags};

const KEYS: [&str; 6] = ["email", "phone", "city", "company", "website", "note"];
const VALUES: [&str; 8] = ["", "  ", "a@b.com", "x@y.com", "Ljubljana", "Maribor", "+386 1", " padded "];
const TAGS: [&str; 6] = ["vip", "lead", "cold", "VIP", "partner", "newsletter"];

pub fn arb_props() -> impl Strategy<Value = Props> + Clone {
    prop::collection::vec((0..KEYS.len(), 0..VALUES.len()), 0..KEYS.len()).prop_map(|pairs| {
        let mut props = Props::new();
        for (k, v) in pairs {
            props.insert(KEYS[k], VALUES[v]).expect("pool keys are valid");
        }
        props
    })
}

pub fn arb_tags() -> impl Strategy<Value = Tags> + Clone {
    prop::collection::vec(0..TAGS.len(), 0..TAGS.len())
        .prop_map(|idx| Tags::from_vec(idx.into_iter().map(|i| TAGS[i])).expect("pool tags are valid"))
}

pub fn arb_contact(id: &'static str) -> impl Strategy<Value = Contact> + Clone {
    (arb_props(), arb_tags(), 0i64..2_000_000_000, prop::option::of("[a-z ]{0,12}")).prop_map(
        move |(props, tags, secs, comments)| {
            let created_at = Utc.timestamp_opt(secs, 0).single().expect("in range");
            let mut contact = Contact::new(id, format!("Contact {id}"), created_at)
                .expect("static ids are valid");
            contact.props = props;
            contact.tags = tags;
            contact.comments = comments;
            contact
        },
    )
}

/// A target/source pair with distinct ids.
pub fn arb_pair() -> impl Strategy<Value = (Contact, Contact)> + Clone {
    (arb_contact("target"), arb_contact("source"))
}
