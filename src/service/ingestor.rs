//! Write path: validate one report and fold it into the store.

use std::sync::Arc;
use std::time::Duration;

use super::bounded;
use crate::domain::{Clock, SeriesPoint, Snapshot, window_cutoff};
use crate::error::GatewayError;
use crate::persistence::TimeSeriesStore;

/// What a successful ingest did. Not exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Server time assigned to the report.
    pub timestamp: i64,
    /// `false` when a point already existed at `timestamp`.
    pub inserted: bool,
    /// Expired points removed by the proactive prune.
    pub pruned: u64,
}

/// Admits player-count reports.
///
/// Each ingest issues three independent store calls in order: conditional
/// series insert, prune of expired points, overwrite of the current record.
/// They are not atomic as a group. If the second or third call fails the
/// whole ingest fails while the earlier writes stay committed; callers may
/// retry the full ingest because every step is idempotent.
#[derive(Debug)]
pub struct Ingestor<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl<S: TimeSeriesStore> Ingestor<S> {
    /// Creates an ingestor over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, store_timeout: Duration) -> Self {
        Self {
            store,
            clock,
            store_timeout,
        }
    }

    /// Validates and records one report.
    ///
    /// The timestamp comes from the server clock. Two reports within the
    /// same second collapse to the first series point, while the current
    /// record always reflects the latest report.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] if `raw_count` is not a
    /// non-negative integer (no store call is made), or
    /// [`GatewayError::Storage`] if any store call fails or times out.
    pub async fn ingest(
        &self,
        raw_count: &str,
        room_name: &str,
        game_version: &str,
        game_name: &str,
    ) -> Result<IngestOutcome, GatewayError> {
        let player_count = parse_player_count(raw_count)?;
        let timestamp = self.clock.now_unix();

        let point = SeriesPoint {
            timestamp,
            player_count,
        };
        let inserted = bounded(self.store_timeout, self.store.insert_if_absent(point)).await?;
        if !inserted {
            tracing::debug!(timestamp, player_count, "series point exists for this second");
        }

        let pruned = bounded(
            self.store_timeout,
            self.store.prune_before(window_cutoff(timestamp)),
        )
        .await?;
        if pruned > 0 {
            tracing::info!(pruned, "pruned expired series points");
        }

        let snapshot = Snapshot {
            player_count,
            room_name: room_name.to_string(),
            game_version: game_version.to_string(),
            game_name: game_name.to_string(),
            timestamp,
        };
        bounded(self.store_timeout, self.store.set_current(&snapshot)).await?;

        tracing::debug!(timestamp, player_count, room_name, "snapshot ingested");
        Ok(IngestOutcome {
            timestamp,
            inserted,
            pruned,
        })
    }
}

/// Parses a client-supplied count. Surrounding whitespace is tolerated.
fn parse_player_count(raw: &str) -> Result<u64, GatewayError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| GatewayError::Validation("player_count required (int)".to_string()))?;
    u64::try_from(value)
        .map_err(|_| GatewayError::Validation("player_count must be non-negative".to_string()))
}
