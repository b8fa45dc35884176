//! Collaborator seams
//!
//! The pipeline talks to the outside world only through these traits, so it
//! can be driven by in-memory fakes in tests.

use crate::error::AdapterResult;
use async_trait::async_trait;
use grind_core::{AggregateStore, Message, ReportTable, Roster};

/// Source of the roster and the message batch
#[async_trait]
pub trait ChatSource: Send + Sync {
    /// Identifier → display name for every user
    async fn roster(&self) -> AdapterResult<Roster>;

    /// Messages of the tracked channel, oldest first
    async fn batch(&self) -> AdapterResult<Vec<Message>>;
}

/// Persisted aggregate between runs
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Prior store, or `None` on the first run
    async fn load(&self) -> AdapterResult<Option<AggregateStore>>;

    /// Replace the persisted store
    async fn save(&self, store: &AggregateStore) -> AdapterResult<()>;
}

/// Destination of the published table
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Replace the published table
    async fn publish(&self, table: &ReportTable) -> AdapterResult<()>;
}
