//! Player-count DTOs for the ingest and stats endpoints.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::domain::{SeriesPoint, Snapshot, WindowSummary};

/// Decoded ingest body.
///
/// Every field arrives as text; `player_count` is validated by the
/// ingestor, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct SnapshotReport {
    /// Raw player count as sent by the client.
    pub player_count: Option<String>,
    /// Room name; empty when absent.
    pub room_name: String,
    /// Client version; empty when absent.
    pub game_version: String,
    /// Game title; empty when absent.
    pub game_name: String,
}

/// Response body for a successful ingest.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    /// Always `true`.
    pub ok: bool,
}

/// Latest full report.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotDto {
    /// Reported player count.
    pub player_count: u64,
    /// Room name.
    pub room_name: String,
    /// Client version.
    pub game_version: String,
    /// Game title.
    pub game_name: String,
    /// Server-assigned unix seconds.
    pub timestamp: i64,
}

impl From<Snapshot> for SnapshotDto {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            player_count: snapshot.player_count,
            room_name: snapshot.room_name,
            game_version: snapshot.game_version,
            game_name: snapshot.game_name,
            timestamp: snapshot.timestamp,
        }
    }
}

/// One point of `last_24h`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SeriesPointDto {
    /// Unix seconds.
    pub t: i64,
    /// Player count.
    pub c: u64,
}

impl From<SeriesPoint> for SeriesPointDto {
    fn from(point: SeriesPoint) -> Self {
        Self {
            t: point.timestamp,
            c: point.player_count,
        }
    }
}

/// Response body for `GET /api/v1/players`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerStatsResponse {
    /// Latest report, or `{}` if nothing was ever ingested.
    #[serde(serialize_with = "empty_object_when_absent")]
    #[schema(value_type = Object)]
    pub current: Option<SnapshotDto>,
    /// Highest player count in the last 24 hours; `0` when empty.
    pub peak_24h: u64,
    /// Points of the last 24 hours in chronological order.
    pub last_24h: Vec<SeriesPointDto>,
}

impl From<WindowSummary> for PlayerStatsResponse {
    fn from(summary: WindowSummary) -> Self {
        Self {
            current: summary.current.map(SnapshotDto::from),
            peak_24h: summary.peak,
            last_24h: summary
                .series
                .into_iter()
                .map(SeriesPointDto::from)
                .collect(),
        }
    }
}

fn empty_object_when_absent<S: Serializer>(
    current: &Option<SnapshotDto>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match current {
        Some(snapshot) => snapshot.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
