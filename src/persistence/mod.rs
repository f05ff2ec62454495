//! Persistence layer: the [`TimeSeriesStore`] contract and its backends.
//!
//! The rest of the crate only sees the narrow typed interface below. Any
//! key-value engine offering a conditional insert keyed by timestamp, a
//! range read by timestamp, and a single-record overwrite satisfies it.
//!
//! Backends never retry. Deadlines and retry policy belong to callers.

pub mod backend;
pub mod fields;
pub mod memory;
pub mod postgres;
pub mod upstash;

use std::future::Future;
use std::time::Duration;

use crate::domain::{SeriesPoint, Snapshot};

pub use backend::StoreBackend;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use upstash::UpstashStore;

/// Failure of an underlying store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected the command or could not be reached.
    #[error("backend failure: {0}")]
    Backend(String),

    /// The operation exceeded its deadline.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with data that could not be decoded.
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Storage contract for the rolling series and the current snapshot.
///
/// Every operation is a single atomic step at the store; the crate holds
/// no process-local locks across calls.
pub trait TimeSeriesStore: Send + Sync + std::fmt::Debug {
    /// Adds `point` only if no point exists at `point.timestamp`.
    ///
    /// Returns `true` when the point was inserted and `false` when an
    /// earlier point already holds that timestamp.
    fn insert_if_absent(
        &self,
        point: SeriesPoint,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Permanently deletes every point with `timestamp < cutoff`.
    ///
    /// Returns the number of points removed.
    fn prune_before(&self, cutoff: i64) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Returns all points with `timestamp >= from`, in no particular order.
    fn range_from(
        &self,
        from: i64,
    ) -> impl Future<Output = Result<Vec<SeriesPoint>, StoreError>> + Send;

    /// Overwrites the single current-snapshot record.
    fn set_current(
        &self,
        snapshot: &Snapshot,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads the current-snapshot record, if one was ever written.
    fn get_current(&self) -> impl Future<Output = Result<Option<Snapshot>, StoreError>> + Send;

    /// Short backend identifier used in logs and health output.
    fn backend_name(&self) -> &'static str;
}
