//! # playercount-gateway
//!
//! Ingests periodic player-count reports from game clients and serves a
//! rolling 24-hour view: the latest report, the window peak, and the raw
//! series.
//!
//! ## Architecture
//!
//! ```text
//! Game clients / dashboards (HTTP)
//!     │
//!     ├── Auth + body decoding (api/)
//!     ├── REST Handlers (api/)
//!     │
//!     ├── Ingestor / Aggregator (service/)
//!     ├── Window math, Clock (domain/)
//!     │
//!     └── TimeSeriesStore (persistence/)
//!           ├── Memory
//!           ├── PostgreSQL
//!           └── Upstash Redis (REST)
//! ```
//!
//! No request-scoped state is shared in process. Concurrent ingests rely
//! on the store's atomic conditional insert and single-record overwrite.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
