//! Player-count reports and their reduced time-series projection.

use serde::{Deserialize, Serialize};

/// A single client report, stamped with server time at ingestion.
///
/// Only the most recent `Snapshot` is kept in full; older reports survive
/// solely as [`SeriesPoint`]s inside the rolling window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Reported number of players.
    pub player_count: u64,
    /// Free-form room name (may be empty).
    pub room_name: String,
    /// Free-form client build version (may be empty).
    pub game_version: String,
    /// Free-form game title (may be empty).
    pub game_name: String,
    /// Unix seconds assigned by the server, never by the client.
    pub timestamp: i64,
}

impl Snapshot {
    /// Projects this report onto the pair retained in the series.
    #[must_use]
    pub const fn to_point(&self) -> SeriesPoint {
        SeriesPoint {
            timestamp: self.timestamp,
            player_count: self.player_count,
        }
    }
}

/// `(timestamp, player_count)` pair kept in the rolling window.
///
/// Serialized compactly as `{"t": .., "c": ..}`, which is both the wire
/// format of `last_24h` and the member encoding used by key-value backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Unix seconds; the series is keyed by this value.
    #[serde(rename = "t")]
    pub timestamp: i64,
    /// Player count at `timestamp`.
    #[serde(rename = "c")]
    pub player_count: u64,
}
