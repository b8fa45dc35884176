//! Core value types
//!
//! Identifiers, timestamps, messages and the per-person counter row.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::TimestampError;

/// Opaque platform user identifier (e.g. `U2ABCDEFGHI`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Display name used as the unique row key of the aggregate
///
/// Two distinct platform users with the same display name share a row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonKey(String);

impl PersonKey {
    /// Wrap a display name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PersonKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Platform message time in seconds, as a float
///
/// Zero means "no timestamp" and never moves the dedup clock.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Timestamp(f64);

impl Timestamp {
    /// The absent timestamp
    pub const ZERO: Self = Self(0.0);

    /// Create from seconds
    ///
    /// # Errors
    /// Returns error for negative or non-finite values
    pub fn from_secs(secs: f64) -> Result<Self, TimestampError> {
        if !secs.is_finite() {
            return Err(TimestampError::NotFinite);
        }
        if secs < 0.0 {
            return Err(TimestampError::Negative(secs));
        }
        Ok(Self(secs))
    }

    /// Seconds value
    #[inline]
    #[must_use]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// True unless this is the absent timestamp
    #[inline]
    #[must_use]
    pub fn is_set(self) -> bool {
        self.0 != 0.0
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    /// Parse the platform's decimal form, e.g. `"1700000000.000200"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: f64 = s
            .trim()
            .parse()
            .map_err(|_| TimestampError::Malformed(s.to_string()))?;
        Self::from_secs(secs)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Shortest representation that parses back to the same f64
        write!(f, "{:?}", self.0)
    }
}

/// A chat message as delivered by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author identifier
    pub author: UserId,
    /// Raw text body, including mention markers
    pub text: String,
    /// Platform time the message was posted
    pub ts: Timestamp,
}

impl Message {
    /// Create message
    #[inline]
    #[must_use]
    pub fn new(author: impl Into<UserId>, text: impl Into<String>, ts: Timestamp) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            ts,
        }
    }
}

/// Running counters for one person
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CounterRow {
    /// Post credits plus mention credits
    pub total: u64,
    /// Messages authored and counted
    pub posts: u64,
    /// Times mentioned in a counted message
    pub mentions: u64,
    /// Reserved; never incremented
    pub highest_react: u64,
    /// Dedup clock: time of the newest counted post by this person
    pub last_seen: Timestamp,
}

impl CounterRow {
    /// Whether the stored counters satisfy `total == posts + mentions`
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.posts.checked_add(self.mentions) == Some(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_parses_platform_form() {
        let ts: Timestamp = "1700000000.000200".parse().unwrap();
        assert!(ts.is_set());
        assert!((ts.as_secs() - 1_700_000_000.0002).abs() < 1e-6);
    }

    #[test]
    fn timestamp_display_round_trips() {
        let ts: Timestamp = "1699999999.123456".parse().unwrap();
        let back: Timestamp = ts.to_string().parse().unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert!(matches!(
            "abc".parse::<Timestamp>(),
            Err(TimestampError::Malformed(_))
        ));
        assert!(matches!(
            "-1".parse::<Timestamp>(),
            Err(TimestampError::Negative(_))
        ));
        assert!(matches!(
            "inf".parse::<Timestamp>(),
            Err(TimestampError::NotFinite)
        ));
    }

    #[test]
    fn zero_is_unset() {
        assert!(!Timestamp::ZERO.is_set());
        assert_eq!(Timestamp::default(), Timestamp::ZERO);
    }

    #[test]
    fn row_consistency() {
        let row = CounterRow {
            total: 3,
            posts: 2,
            mentions: 1,
            ..CounterRow::default()
        };
        assert!(row.is_consistent());
        assert!(!CounterRow { total: 4, ..row }.is_consistent());
    }
}
