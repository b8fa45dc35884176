//! Batch aggregator
//!
//! Runs one batch of messages against the prior store:
//!
//! ```text
//! Loading ──► Processing ──► done (new store)
//!                 │
//!                 └──► Failed (unknown identifier, prior store untouched)
//! ```
//!
//! The batch must be ordered oldest to newest. The dedup clock of an author
//! only advances on their own posts, so iterating out of order can skip
//! messages that were never counted.

use crate::dedup::already_counted;
use crate::error::{AggregateResult, UserRole};
use crate::identity::Roster;
use crate::mention;
use crate::store::{AggregateStore, CreditDelta};
use crate::types::Message;

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Working copy hydrated from the prior store
    Loading,
    /// Messages being applied
    Processing,
    /// Aborted on an identity lookup failure
    Failed,
}

/// Counts describing what a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages that produced credits
    pub processed: usize,
    /// Messages skipped as already counted
    pub skipped: usize,
    /// Post credits applied
    pub post_credits: usize,
    /// Mention credits applied
    pub mention_credits: usize,
    /// Rows created during the run
    pub new_people: usize,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Updated store, to be persisted and published
    pub store: AggregateStore,
    /// What changed
    pub summary: RunSummary,
}

/// Applies message batches to an aggregate store
#[derive(Debug, Clone, Copy)]
pub struct BatchAggregator<'r> {
    roster: &'r Roster,
}

impl<'r> BatchAggregator<'r> {
    /// Create aggregator resolving identities through `roster`
    #[inline]
    #[must_use]
    pub fn new(roster: &'r Roster) -> Self {
        Self { roster }
    }

    /// Apply `batch` (oldest first) on top of `prior`
    ///
    /// `prior` is never modified; the updated store is returned.
    ///
    /// # Errors
    /// `AggregateError::UnknownUser` if an author or mentioned identifier is
    /// missing from the roster. No partial store is returned.
    pub fn run(&self, prior: &AggregateStore, batch: &[Message]) -> AggregateResult<RunOutcome> {
        let mut phase = RunPhase::Loading;
        let mut store = prior.clone();
        tracing::debug!(
            "Run {:?}: {} prior rows, {} messages",
            phase,
            store.len(),
            batch.len()
        );

        phase = RunPhase::Processing;
        tracing::debug!("Run {:?}", phase);
        match self.process(&mut store, batch) {
            Ok(summary) => {
                tracing::info!(
                    "Run complete: {} processed, {} skipped, {} post credits, {} mention credits, {} new people",
                    summary.processed,
                    summary.skipped,
                    summary.post_credits,
                    summary.mention_credits,
                    summary.new_people
                );
                Ok(RunOutcome { store, summary })
            }
            Err(e) => {
                phase = RunPhase::Failed;
                tracing::error!("Run {:?}: {}", phase, e);
                Err(e)
            }
        }
    }

    fn process(
        &self,
        store: &mut AggregateStore,
        batch: &[Message],
    ) -> AggregateResult<RunSummary> {
        let mut summary = RunSummary::default();
        let rows_before = store.len();

        for message in batch {
            let author = self.roster.resolve(&message.author, UserRole::Author)?;

            // Mentions in a skipped message are not credited either
            if already_counted(author, message.ts, store) {
                tracing::debug!("Skipping counted message by {} at {}", author, message.ts);
                summary.skipped += 1;
                continue;
            }

            store.credit(author.clone(), CreditDelta::post(message.ts));
            summary.post_credits += 1;

            for id in mention::extract(&message.text) {
                let mentioned = self.roster.resolve(&id, UserRole::Mention)?;
                store.credit(mentioned.clone(), CreditDelta::mention());
                summary.mention_credits += 1;
            }

            summary.processed += 1;
        }

        summary.new_people = store.len() - rows_before;
        Ok(summary)
    }
}
