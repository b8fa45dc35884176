//! Testing utilities for GrindCount workspace
//!
//! Shared fixtures: a small roster, message builders, store assertions.

#![allow(missing_docs)]

use grind_core::{AggregateStore, CounterRow, Message, PersonKey, Roster, Timestamp};

pub const ADA: &str = "U1AAAAAAAAA";
pub const BOB: &str = "U2ABCDEFGHI";
pub const CY: &str = "U3CCCCCCCCC";

pub const ADA_NAME: &str = "Ada Lovelace";
pub const BOB_NAME: &str = "Bob Ross";
pub const CY_NAME: &str = "Cy Young";

/// Roster with Ada, Bob and Cy
pub fn test_roster() -> Roster {
    Roster::from_pairs([(ADA, ADA_NAME), (BOB, BOB_NAME), (CY, CY_NAME)])
}

pub fn ts(secs: f64) -> Timestamp {
    Timestamp::from_secs(secs).unwrap()
}

pub fn msg(author: &str, text: &str, secs: f64) -> Message {
    Message::new(author, text, ts(secs))
}

/// Text mentioning each of `ids` once
pub fn mentioning(ids: &[&str]) -> String {
    ids.iter().map(|id| format!("<@{id}>")).collect::<Vec<_>>().join(" ")
}

pub fn row(store: &AggregateStore, name: &str) -> CounterRow {
    *store
        .get(&PersonKey::new(name))
        .unwrap_or_else(|| panic!("no row for {name}"))
}

/// Assert `(total, posts, mentions)` for `name`
pub fn assert_counts(store: &AggregateStore, name: &str, expected: (u64, u64, u64)) {
    let r = row(store, name);
    assert_eq!(
        (r.total, r.posts, r.mentions),
        expected,
        "counts for {name} (total, posts, mentions)"
    );
}

/// Store holding one row hydrated as if from a snapshot
pub fn store_with_row(name: &str, row: CounterRow) -> AggregateStore {
    let mut store = AggregateStore::new();
    store.insert_row(PersonKey::new(name), row);
    store
}
