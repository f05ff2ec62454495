//! Domain layer: snapshots, series points, window math, and time.
//!
//! Nothing in here performs I/O. Durable state lives behind
//! [`crate::persistence::TimeSeriesStore`].

pub mod clock;
pub mod snapshot;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot::{SeriesPoint, Snapshot};
pub use window::{WINDOW_SECS, WindowSummary, window_cutoff};
