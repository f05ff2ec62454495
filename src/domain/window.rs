//! Trailing 24-hour window arithmetic and summary computation.

use super::{SeriesPoint, Snapshot};

/// Length of the rolling window in seconds.
pub const WINDOW_SECS: i64 = 24 * 60 * 60;

/// Oldest timestamp still inside the window ending at `now`.
///
/// Points with `timestamp >= cutoff` are in the window; anything strictly
/// older is expired.
#[must_use]
pub const fn window_cutoff(now: i64) -> i64 {
    now.saturating_sub(WINDOW_SECS)
}

/// Read-side view of the window: latest report, peak, and raw series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSummary {
    /// Most recent report, or `None` if nothing was ever ingested.
    pub current: Option<Snapshot>,
    /// Highest player count in the window; `0` when the window is empty.
    pub peak: u64,
    /// Points inside the window in chronological order.
    pub series: Vec<SeriesPoint>,
}

impl WindowSummary {
    /// Builds a summary from whatever the store returned.
    ///
    /// Points older than `cutoff` are dropped here as well, so a store that
    /// has not been pruned recently can never leak expired data.
    #[must_use]
    pub fn from_points(current: Option<Snapshot>, points: Vec<SeriesPoint>, cutoff: i64) -> Self {
        let mut series: Vec<SeriesPoint> = points
            .into_iter()
            .filter(|point| point.timestamp >= cutoff)
            .collect();
        series.sort_unstable_by_key(|point| point.timestamp);

        let peak = series
            .iter()
            .map(|point| point.player_count)
            .max()
            .unwrap_or(0);

        Self {
            current,
            peak,
            series,
        }
    }
}
