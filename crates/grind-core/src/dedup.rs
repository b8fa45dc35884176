//! Dedup oracle
//!
//! A person's dedup clock moves only on their own counted posts, so any
//! message of theirs at or before the clock was already counted.

use crate::store::AggregateStore;
use crate::types::{PersonKey, Timestamp};

/// Whether a message by `author` at `ts` was counted by an earlier run
///
/// The boundary is inclusive: a replay at exactly the stored clock is
/// skipped. Unknown authors were never counted.
#[must_use]
pub fn already_counted(author: &PersonKey, ts: Timestamp, store: &AggregateStore) -> bool {
    store
        .get(author)
        .is_some_and(|row| ts <= row.last_seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CreditDelta;

    fn ts(secs: f64) -> Timestamp {
        Timestamp::from_secs(secs).unwrap()
    }

    fn store_with(name: &str, clock: f64) -> AggregateStore {
        let mut store = AggregateStore::new();
        store.credit(PersonKey::new(name), CreditDelta::post(ts(clock)));
        store
    }

    #[test]
    fn unknown_author_not_counted() {
        let store = AggregateStore::new();
        assert!(!already_counted(&PersonKey::new("Ada"), ts(1.0), &store));
    }

    #[test]
    fn older_message_counted() {
        let store = store_with("Ada", 100.0);
        assert!(already_counted(&PersonKey::new("Ada"), ts(50.0), &store));
    }

    #[test]
    fn equal_timestamp_counted() {
        let store = store_with("Ada", 100.0);
        assert!(already_counted(&PersonKey::new("Ada"), ts(100.0), &store));
    }

    #[test]
    fn newer_message_not_counted() {
        let store = store_with("Ada", 100.0);
        assert!(!already_counted(&PersonKey::new("Ada"), ts(100.5), &store));
    }

    #[test]
    fn mention_only_row_has_zero_clock() {
        let mut store = AggregateStore::new();
        store.credit(PersonKey::new("Bob"), CreditDelta::mention());
        assert!(!already_counted(&PersonKey::new("Bob"), ts(1.0), &store));
        assert!(already_counted(&PersonKey::new("Bob"), Timestamp::ZERO, &store));
    }
}
