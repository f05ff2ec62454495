//! In-process store backed by ordered maps.
//!
//! Used when no external store is configured and by every unit test.
//! State is lost on restart.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tokio::sync::RwLock;

use super::{StoreError, TimeSeriesStore, fields};
use crate::domain::{SeriesPoint, Snapshot};

/// Memory-resident [`TimeSeriesStore`].
///
/// The series is a `BTreeMap` keyed by timestamp, so conditional insert,
/// range reads, and pruning are each a single map operation under one
/// write or read lock. The current record is held as field-value pairs,
/// the same shape hash-based backends use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    series: RwLock<BTreeMap<i64, u64>>,
    current: RwLock<Option<Vec<(String, String)>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of series points currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.series.read().await.len()
    }

    /// Returns `true` if the series holds no points.
    pub async fn is_empty(&self) -> bool {
        self.series.read().await.is_empty()
    }
}

impl TimeSeriesStore for MemoryStore {
    async fn insert_if_absent(&self, point: SeriesPoint) -> Result<bool, StoreError> {
        let mut series = self.series.write().await;
        match series.entry(point.timestamp) {
            Entry::Vacant(slot) => {
                slot.insert(point.player_count);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    async fn prune_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        let mut series = self.series.write().await;
        let kept = series.split_off(&cutoff);
        let removed = series.len() as u64;
        *series = kept;
        Ok(removed)
    }

    async fn range_from(&self, from: i64) -> Result<Vec<SeriesPoint>, StoreError> {
        let series = self.series.read().await;
        Ok(series
            .range(from..)
            .map(|(&timestamp, &player_count)| SeriesPoint {
                timestamp,
                player_count,
            })
            .collect())
    }

    async fn set_current(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.current.write().await = Some(fields::to_fields(snapshot));
        Ok(())
    }

    async fn get_current(&self) -> Result<Option<Snapshot>, StoreError> {
        let current = self.current.read().await.clone();
        current.map(fields::from_fields).transpose()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
