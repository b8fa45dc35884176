//! GrindCount Core
//!
//! Incremental aggregation of chat participation: who posted, who was
//! mentioned, and running per-person totals that survive across runs.
//!
//! # Core Concepts
//!
//! - [`Roster`]: identifier → display name lookup, fetched once per run
//! - [`mention::extract`]: distinct `<@XXXXXXXXXXX>` mentions in a message
//! - [`already_counted`]: per-author timestamp dedup against prior runs
//! - [`AggregateStore`]: per-person [`CounterRow`]s updated by [`AggregateStore::credit`]
//! - [`BatchAggregator`]: applies an oldest-first batch to the prior store
//! - [`ReportTable`]: the flat table handed to publishers
//!
//! # Example
//!
//! ```rust
//! use grind_core::{AggregateStore, BatchAggregator, Message, PersonKey, Roster, Timestamp};
//!
//! let roster = Roster::from_pairs([("U1AAAAAAAAA", "Ada Lovelace")]);
//! let batch = vec![Message::new("U1AAAAAAAAA", "hello", Timestamp::from_secs(100.0)?)];
//!
//! let outcome = BatchAggregator::new(&roster).run(&AggregateStore::new(), &batch)?;
//! let row = outcome.store.get(&PersonKey::new("Ada Lovelace")).unwrap();
//! assert_eq!(row.posts, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod aggregator;
pub mod dedup;
pub mod error;
pub mod identity;
pub mod mention;
pub mod report;
pub mod store;
pub mod types;

// Re-exports
pub use aggregator::{BatchAggregator, RunOutcome, RunPhase, RunSummary};
pub use dedup::already_counted;
pub use error::{AggregateError, AggregateResult, TimestampError, UserRole};
pub use identity::Roster;
pub use report::{ReportOrder, ReportRow, ReportTable, REPORT_HEADER};
pub use store::{AggregateStore, CreditDelta};
pub use types::{CounterRow, Message, PersonKey, Timestamp, UserId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running an aggregation
    pub use crate::{
        AggregateError, AggregateStore, BatchAggregator, CounterRow, CreditDelta, Message,
        PersonKey, ReportOrder, ReportTable, Roster, Timestamp, UserId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
