//! Error types for the I/O adapters
//!
//! Provides error handling for:
//! - Chat platform and spreadsheet HTTP calls
//! - Snapshot file reads and writes
//! - Aggregation failures surfaced through the pipeline

use grind_core::AggregateError;
use std::path::PathBuf;

/// Adapter and pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API reported a failure
    #[error("{service} API {method} failed: {error}")]
    Api {
        service: &'static str,
        method: String,
        error: String,
    },

    /// Response body did not have the expected shape
    #[error("unexpected payload: {0}")]
    Payload(String),

    /// Configured channel does not exist
    #[error("channel not found: '{0}'")]
    ChannelNotFound(String),

    /// IO error on the snapshot file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file content is invalid
    #[error("invalid snapshot at line {line}: {message}")]
    Snapshot { line: usize, message: String },

    /// Aggregation aborted
    #[error("aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
}

impl AdapterError {
    /// Create API error
    pub fn api(service: &'static str, method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Api {
            service,
            method: method.into(),
            error: error.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create snapshot format error
    pub fn snapshot(line: usize, message: impl Into<String>) -> Self {
        Self::Snapshot {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use grind_core::{UserId, UserRole};

    #[test]
    fn api_error_display() {
        let err = AdapterError::api("slack", "users.list", "invalid_auth");
        assert_eq!(err.to_string(), "slack API users.list failed: invalid_auth");
    }

    #[test]
    fn snapshot_error_display() {
        let err = AdapterError::snapshot(3, "bad Total");
        assert_eq!(err.to_string(), "invalid snapshot at line 3: bad Total");
    }

    #[test]
    fn aggregate_conversion() {
        let err: AdapterError =
            AggregateError::unknown_user(UserId::new("U1"), UserRole::Author).into();
        assert!(matches!(err, AdapterError::Aggregate(_)));
    }
}
