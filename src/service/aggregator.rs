//! Read path: summarize the trailing 24-hour window.

use std::sync::Arc;
use std::time::Duration;

use super::bounded;
use crate::domain::{Clock, WindowSummary, window_cutoff};
use crate::error::GatewayError;
use crate::persistence::TimeSeriesStore;

/// Computes [`WindowSummary`]s on demand.
///
/// Every summary first prunes points older than the cutoff, then filters
/// the range result by that same cutoff, since a concurrent ingest may
/// re-insert an older point between the two calls.
#[derive(Debug)]
pub struct Aggregator<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl<S: TimeSeriesStore> Aggregator<S> {
    /// Creates an aggregator over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, store_timeout: Duration) -> Self {
        Self {
            store,
            clock,
            store_timeout,
        }
    }

    /// Returns the current snapshot, the window peak, and the window's
    /// points in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] if a store call fails or times out.
    pub async fn summarize(&self) -> Result<WindowSummary, GatewayError> {
        let cutoff = window_cutoff(self.clock.now_unix());

        let pruned = bounded(self.store_timeout, self.store.prune_before(cutoff)).await?;
        if pruned > 0 {
            tracing::info!(pruned, "pruned expired series points on read");
        }
        let points = bounded(self.store_timeout, self.store.range_from(cutoff)).await?;
        let current = bounded(self.store_timeout, self.store.get_current()).await?;

        let summary = WindowSummary::from_points(current, points, cutoff);
        tracing::debug!(
            cutoff,
            points = summary.series.len(),
            peak = summary.peak,
            "window summarized"
        );
        Ok(summary)
    }

    /// Name of the underlying store backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}
