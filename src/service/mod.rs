//! Service layer: the write path ([`Ingestor`]) and the read path
//! ([`Aggregator`]).
//!
//! Both are stateless between requests. All cross-request state lives in
//! the [`crate::persistence::TimeSeriesStore`], and every store call runs
//! under a hard deadline without retries.

pub mod aggregator;
pub mod ingestor;

use std::future::Future;
use std::time::Duration;

use crate::persistence::StoreError;

pub use aggregator::Aggregator;
pub use ingestor::{IngestOutcome, Ingestor};

/// Runs one store call, failing with [`StoreError::Timeout`] once `limit`
/// elapses.
async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
