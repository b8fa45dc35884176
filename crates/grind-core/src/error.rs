//! Error types for the aggregation engine
//!
//! Only identity resolution can fail a run. Malformed mention markers,
//! zero timestamps and empty batches are not errors.

use crate::types::UserId;

/// Fatal errors that abort an aggregation run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// Identifier missing from the roster snapshot
    #[error("unknown {role} '{id}': not present in roster")]
    UnknownUser {
        /// The identifier that failed to resolve
        id: UserId,
        /// Where the identifier appeared
        role: UserRole,
    },
}

impl AggregateError {
    /// Create unknown-user error
    #[inline]
    pub fn unknown_user(id: UserId, role: UserRole) -> Self {
        Self::UnknownUser { id, role }
    }
}

/// Where an identifier was found in a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    /// Message author
    Author,
    /// Mentioned in the message text
    Mention,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Author => f.write_str("author"),
            Self::Mention => f.write_str("mention"),
        }
    }
}

/// Timestamp parsing errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimestampError {
    /// Not a decimal number
    #[error("malformed timestamp: '{0}'")]
    Malformed(String),

    /// NaN or infinite
    #[error("timestamp is not finite")]
    NotFinite,

    /// Before the epoch
    #[error("negative timestamp: {0}")]
    Negative(f64),
}

/// Result type alias for aggregation operations
pub type AggregateResult<T> = Result<T, AggregateError>;
