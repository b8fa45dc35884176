//! One full run: fetch, aggregate, persist, publish
//!
//! Stages run strictly in that order. A failed aggregation stops the run
//! before anything is written, so the persisted snapshot survives intact.

use crate::error::AdapterResult;
use crate::traits::{ChatSource, ReportSink, SnapshotStore};
use grind_core::{AggregateStore, BatchAggregator, ReportOrder, ReportTable, RunSummary};

/// What the pipeline is allowed to do
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Report row order
    pub order: ReportOrder,
    /// Write the updated store back to the snapshot
    pub persist: bool,
    /// Push the table to the sink (when one is given)
    pub publish: bool,
}

impl PipelineOptions {
    /// Persist and publish, rows by total
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate only: neither persist nor publish
    #[inline]
    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            persist: false,
            publish: false,
            ..Self::default()
        }
    }

    /// With publishing toggled
    #[inline]
    #[must_use]
    pub fn with_publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }

    /// With row order
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: ReportOrder) -> Self {
        self.order = order;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            order: ReportOrder::ByTotalDesc,
            persist: true,
            publish: true,
        }
    }
}

/// Outcome of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Aggregation counts
    pub summary: RunSummary,
    /// Table built from the updated store
    pub table: ReportTable,
    /// Snapshot was written
    pub persisted: bool,
    /// Table was published
    pub published: bool,
}

/// Run one aggregation end to end
///
/// # Errors
/// Any fetch, aggregation, persistence or publish failure. Aggregation
/// failures happen before the snapshot is touched.
pub async fn run_pipeline(
    source: &dyn ChatSource,
    snapshot: &dyn SnapshotStore,
    sink: Option<&dyn ReportSink>,
    options: PipelineOptions,
) -> AdapterResult<PipelineReport> {
    let roster = source.roster().await?;
    let batch = source.batch().await?;
    let prior = snapshot.load().await?.unwrap_or_else(AggregateStore::new);
    tracing::info!(
        "Aggregating {} messages against {} prior rows",
        batch.len(),
        prior.len()
    );

    let outcome = BatchAggregator::new(&roster).run(&prior, &batch)?;
    let table = ReportTable::from_store(&outcome.store, options.order);

    let persisted = if options.persist {
        snapshot.save(&outcome.store).await?;
        true
    } else {
        tracing::info!("Skipping snapshot write");
        false
    };

    let published = match sink {
        Some(sink) if options.publish => {
            sink.publish(&table).await?;
            true
        }
        _ => {
            tracing::info!("Skipping publish");
            false
        }
    };

    Ok(PipelineReport {
        summary: outcome.summary,
        table,
        persisted,
        published,
    })
}
