//! Runtime selection among the concrete stores.

use super::{MemoryStore, PostgresStore, StoreError, TimeSeriesStore, UpstashStore};
use crate::config::{GatewayConfig, StoreKind};
use crate::domain::{SeriesPoint, Snapshot};

/// The store chosen at startup, dispatched statically.
#[derive(Debug)]
pub enum StoreBackend {
    /// In-process maps.
    Memory(MemoryStore),
    /// PostgreSQL via `sqlx`.
    Postgres(PostgresStore),
    /// Redis via the Upstash REST API.
    Upstash(UpstashStore),
}

impl StoreBackend {
    /// Builds the backend named by `config.store_kind`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the selected backend cannot be reached or
    /// is missing required settings.
    pub async fn from_config(config: &GatewayConfig) -> Result<Self, StoreError> {
        let backend = match config.store_kind {
            StoreKind::Memory => Self::Memory(MemoryStore::new()),
            StoreKind::Postgres => Self::Postgres(PostgresStore::connect(config).await?),
            StoreKind::Upstash => Self::Upstash(UpstashStore::from_config(config)?),
        };
        tracing::info!(backend = backend.backend_name(), "store backend selected");
        Ok(backend)
    }
}

impl TimeSeriesStore for StoreBackend {
    async fn insert_if_absent(&self, point: SeriesPoint) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.insert_if_absent(point).await,
            Self::Postgres(store) => store.insert_if_absent(point).await,
            Self::Upstash(store) => store.insert_if_absent(point).await,
        }
    }

    async fn prune_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        match self {
            Self::Memory(store) => store.prune_before(cutoff).await,
            Self::Postgres(store) => store.prune_before(cutoff).await,
            Self::Upstash(store) => store.prune_before(cutoff).await,
        }
    }

    async fn range_from(&self, from: i64) -> Result<Vec<SeriesPoint>, StoreError> {
        match self {
            Self::Memory(store) => store.range_from(from).await,
            Self::Postgres(store) => store.range_from(from).await,
            Self::Upstash(store) => store.range_from(from).await,
        }
    }

    async fn set_current(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set_current(snapshot).await,
            Self::Postgres(store) => store.set_current(snapshot).await,
            Self::Upstash(store) => store.set_current(snapshot).await,
        }
    }

    async fn get_current(&self) -> Result<Option<Snapshot>, StoreError> {
        match self {
            Self::Memory(store) => store.get_current().await,
            Self::Postgres(store) => store.get_current().await,
            Self::Upstash(store) => store.get_current().await,
        }
    }

    fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(store) => store.backend_name(),
            Self::Postgres(store) => store.backend_name(),
            Self::Upstash(store) => store.backend_name(),
        }
    }
}
