//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::api::auth::AuthPolicy;
use crate::domain::Clock;
use crate::persistence::StoreBackend;
use crate::service::{Aggregator, Ingestor};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Write path.
    pub ingestor: Arc<Ingestor<StoreBackend>>,
    /// Read path.
    pub aggregator: Arc<Aggregator<StoreBackend>>,
    /// Shared-secret gate applied before either path runs.
    pub auth: AuthPolicy,
}

impl AppState {
    /// Wires the ingestor and aggregator over one store and clock.
    #[must_use]
    pub fn new(
        store: Arc<StoreBackend>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
        auth: AuthPolicy,
    ) -> Self {
        Self {
            ingestor: Arc::new(Ingestor::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                store_timeout,
            )),
            aggregator: Arc::new(Aggregator::new(store, clock, store_timeout)),
            auth,
        }
    }
}
