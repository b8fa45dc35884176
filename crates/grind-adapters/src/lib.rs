//! GrindCount Adapters
//!
//! The thin I/O layer around the aggregation engine.
//!
//! # Architecture
//!
//! ```text
//! SlackSource ──► roster + batch ─┐
//!                                 ├─► BatchAggregator ─► CsvSnapshot (save)
//! CsvSnapshot ──► prior store ────┘                  └─► SheetsSink (publish)
//! ```
//!
//! Every collaborator sits behind a trait ([`ChatSource`], [`SnapshotStore`],
//! [`ReportSink`]) and [`run_pipeline`] only sees the traits.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod pipeline;
pub mod sheets;
pub mod slack;
pub mod snapshot;
pub mod traits;

// Re-exports
pub use error::{AdapterError, AdapterResult};
pub use pipeline::{run_pipeline, PipelineOptions, PipelineReport};
pub use sheets::{SheetsSink, DEFAULT_WORKSHEET};
pub use slack::{SlackSource, DEFAULT_HISTORY_LIMIT};
pub use snapshot::{CsvSnapshot, DEFAULT_SNAPSHOT_FILE};
pub use traits::{ChatSource, ReportSink, SnapshotStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
