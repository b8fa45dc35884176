//! Aggregate store
//!
//! Per-person counter rows keyed by display name. Rows keep insertion order,
//! so a store hydrated from a snapshot writes back in the same order with
//! new people appended.

use crate::types::{CounterRow, PersonKey, Timestamp};
use indexmap::IndexMap;

/// One unit of credit for a person
///
/// Built only through [`CreditDelta::post`] or [`CreditDelta::mention`]:
/// every credit adds one to `total` and one to exactly one of `posts` or
/// `mentions`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditDelta {
    posts: u64,
    mentions: u64,
    timestamp: Timestamp,
}

impl CreditDelta {
    /// Credit for authoring a message posted at `ts`
    ///
    /// A zero `ts` leaves the dedup clock unchanged.
    #[inline]
    #[must_use]
    pub fn post(ts: Timestamp) -> Self {
        Self {
            posts: 1,
            mentions: 0,
            timestamp: ts,
        }
    }

    /// Credit for being mentioned; never moves the dedup clock
    #[inline]
    #[must_use]
    pub fn mention() -> Self {
        Self {
            posts: 0,
            mentions: 1,
            timestamp: Timestamp::ZERO,
        }
    }

    /// Timestamp carried by this credit
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// In-memory table of counters, exclusively owned by one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStore {
    rows: IndexMap<PersonKey, CounterRow>,
}

impl AggregateStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one credit to `person`, creating the row if needed
    pub fn credit(&mut self, person: PersonKey, delta: CreditDelta) {
        let row = self.rows.entry(person).or_default();
        row.total += 1;
        row.posts += delta.posts;
        row.mentions += delta.mentions;
        if delta.timestamp.is_set() {
            row.last_seen = delta.timestamp;
        }
    }

    /// Insert a row as-is, replacing any existing row for `person`
    ///
    /// Used when hydrating from a persisted snapshot.
    pub fn insert_row(&mut self, person: PersonKey, row: CounterRow) -> Option<CounterRow> {
        self.rows.insert(person, row)
    }

    /// Row for `person`
    #[inline]
    #[must_use]
    pub fn get(&self, person: &PersonKey) -> Option<&CounterRow> {
        self.rows.get(person)
    }

    /// Whether `person` has a row
    #[inline]
    #[must_use]
    pub fn contains(&self, person: &PersonKey) -> bool {
        self.rows.contains_key(person)
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the store has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&PersonKey, &CounterRow)> {
        self.rows.iter()
    }

    /// Rows by `total` descending, ties broken by name
    #[must_use]
    pub fn sorted_by_total(&self) -> Vec<(&PersonKey, &CounterRow)> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by(|(ka, a), (kb, b)| b.total.cmp(&a.total).then_with(|| ka.cmp(kb)));
        rows
    }

    /// People whose stored `total` differs from `posts + mentions`
    ///
    /// Only hand-edited snapshots produce these; credits keep rows consistent.
    #[must_use]
    pub fn inconsistent_rows(&self) -> Vec<&PersonKey> {
        self.rows
            .iter()
            .filter(|(_, row)| !row.is_consistent())
            .map(|(key, _)| key)
            .collect()
    }
}

impl FromIterator<(PersonKey, CounterRow)> for AggregateStore {
    fn from_iter<T: IntoIterator<Item = (PersonKey, CounterRow)>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
