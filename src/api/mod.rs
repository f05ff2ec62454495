//! REST API layer: route handlers, DTOs, auth, and router composition.
//!
//! Player endpoints are mounted under `/api/v1`, with the unversioned
//! legacy path kept alongside. `/health` sits at the root and is never
//! behind the shared secret.

pub mod auth;
pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use std::time::Duration;

use axum::Router;
use axum::http::header::{CONTENT_TYPE, HeaderName};
use axum::http::Method;
use axum::middleware;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the API router with all REST endpoints.
///
/// The shared-secret middleware is layered onto the player routes only.
pub fn build_router(state: &AppState) -> Router<AppState> {
    let players = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::players::legacy_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .merge(players)
        .merge(handlers::system::routes())
}

/// Builds the complete application: routes, docs, tracing, CORS, and a
/// whole-request deadline.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router(&state);

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(openapi::swagger_ui());

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(cors_layer())
        .with_state(state)
}

/// CORS policy for browser dashboards: any origin, the two player methods,
/// and the headers clients send.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(auth::API_KEY_HEADER)])
}
