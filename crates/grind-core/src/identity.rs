//! Identity resolution
//!
//! Maps platform identifiers to display names using a roster fetched once
//! per run.

use crate::error::{AggregateError, AggregateResult, UserRole};
use crate::types::{PersonKey, UserId};
use std::collections::HashMap;

/// Snapshot of the platform user list: identifier → display name
#[derive(Debug, Clone, Default)]
pub struct Roster {
    names: HashMap<UserId, PersonKey>,
}

impl Roster {
    /// Create empty roster
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build roster from `(identifier, name)` pairs
    ///
    /// Later pairs win when an identifier repeats.
    pub fn from_pairs<I, U, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, N)>,
        U: Into<UserId>,
        N: Into<String>,
    {
        let names = pairs
            .into_iter()
            .map(|(id, name)| (id.into(), PersonKey::new(name)))
            .collect();
        Self { names }
    }

    /// Add or replace one entry
    pub fn insert(&mut self, id: UserId, name: impl Into<String>) {
        self.names.insert(id, PersonKey::new(name));
    }

    /// Resolve identifier to its person key
    ///
    /// # Errors
    /// `AggregateError::UnknownUser` when the identifier is absent. There
    /// is no fallback name: crediting a guessed row would corrupt counts.
    pub fn resolve(&self, id: &UserId, role: UserRole) -> AggregateResult<&PersonKey> {
        self.names
            .get(id)
            .ok_or_else(|| AggregateError::unknown_user(id.clone(), role))
    }

    /// Number of known users
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no users are known
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_user() {
        let roster = Roster::from_pairs([("U1AAAAAAAAA", "Ada Lovelace")]);
        let key = roster
            .resolve(&UserId::new("U1AAAAAAAAA"), UserRole::Author)
            .unwrap();
        assert_eq!(key.as_str(), "Ada Lovelace");
    }

    #[test]
    fn unknown_user_is_error() {
        let roster = Roster::new();
        let err = roster
            .resolve(&UserId::new("U404"), UserRole::Author)
            .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::UnknownUser { role: UserRole::Author, .. }
        ));
    }

    #[test]
    fn insert_replaces_name() {
        let mut roster = Roster::from_pairs([("U1", "Old Name")]);
        roster.insert(UserId::new("U1"), "New Name");
        assert_eq!(roster.len(), 1);
        assert_eq!(
            roster.resolve(&UserId::new("U1"), UserRole::Author).unwrap(),
            &PersonKey::new("New Name")
        );
    }

    #[test]
    fn colliding_names_share_key() {
        let roster = Roster::from_pairs([("U1", "Sam Smith"), ("U2", "Sam Smith")]);
        let a = roster.resolve(&UserId::new("U1"), UserRole::Author).unwrap();
        let b = roster.resolve(&UserId::new("U2"), UserRole::Author).unwrap();
        assert_eq!(a, b);
    }
}
