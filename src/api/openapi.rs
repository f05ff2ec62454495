//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{IngestResponse, PlayerStatsResponse, SeriesPointDto, SnapshotDto, SnapshotReport};
use super::handlers::{players, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "playercount-gateway",
        description = "Player-count ingestion with rolling 24-hour statistics."
    ),
    paths(
        players::ingest_snapshot,
        players::player_stats,
        system::health_handler,
    ),
    components(schemas(
        SnapshotReport,
        IngestResponse,
        SnapshotDto,
        SeriesPointDto,
        PlayerStatsResponse,
        system::HealthResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Players", description = "Report and read player counts"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui`, serving the OpenAPI document at `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
#[must_use]
pub fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_player_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/players"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
