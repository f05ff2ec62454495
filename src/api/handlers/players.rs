//! Player-count handlers: ingest a report, read the 24-hour stats.

use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{IngestResponse, PlayerStatsResponse, SnapshotReport};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// Path kept for clients built against the first deployment.
pub const LEGACY_PATH: &str = "/api/update_player_count";

/// `POST /api/v1/players` — Record one player-count report.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] on an undecodable body or a bad
/// `player_count`, and [`GatewayError::Storage`] if the store fails.
#[utoipa::path(
    post,
    path = "/api/v1/players",
    tag = "Players",
    summary = "Report the current player count",
    description = "Accepts JSON or form-encoded bodies. The server assigns the timestamp. Requires `X-API-Key` when a key is configured.",
    request_body(content = SnapshotReport, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Report recorded", body = IngestResponse),
        (status = 400, description = "Missing or invalid player_count", body = ErrorResponse),
        (status = 401, description = "Missing or wrong API key", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn ingest_snapshot(
    State(state): State<AppState>,
    report: SnapshotReport,
) -> Result<impl IntoResponse, GatewayError> {
    let Some(raw_count) = report.player_count.as_deref() else {
        return Err(GatewayError::Validation(
            "player_count required (int)".to_string(),
        ));
    };

    state
        .ingestor
        .ingest(
            raw_count,
            &report.room_name,
            &report.game_version,
            &report.game_name,
        )
        .await?;

    Ok(([(CACHE_CONTROL, "no-store")], Json(IngestResponse { ok: true })))
}

/// `GET /api/v1/players` — Current snapshot, 24-hour peak, and series.
///
/// # Errors
///
/// Returns [`GatewayError::Storage`] if the store fails.
#[utoipa::path(
    get,
    path = "/api/v1/players",
    tag = "Players",
    summary = "Rolling 24-hour player statistics",
    description = "Returns the latest report, the peak over the trailing 24 hours, and every point of that window in chronological order.",
    responses(
        (status = 200, description = "Window statistics", body = PlayerStatsResponse),
        (status = 401, description = "Missing or wrong API key (only when reads are protected)", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn player_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let summary = state.aggregator.summarize().await?;
    Ok((
        [(CACHE_CONTROL, "no-store")],
        Json(PlayerStatsResponse::from(summary)),
    ))
}

/// Versioned routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/players", get(player_stats).post(ingest_snapshot))
}

/// Unversioned route at [`LEGACY_PATH`].
pub fn legacy_routes() -> Router<AppState> {
    Router::new().route(LEGACY_PATH, get(player_stats).post(ingest_snapshot))
}
