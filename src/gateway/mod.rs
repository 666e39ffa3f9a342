//! HTTP gateway (Axum) for name matching and recipe generation.
//!
//! Model calls are blocking and run on `spawn_blocking`; every request is bounded by the
//! configured timeout, and generation is serialised through [`AppState::generation_gate`].

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{get_recipe_handler, match_names_handler};
pub use state::AppState;

use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::recipe::RecipeSource;

pub const NAMECHEF_STATUS_HEADER: &str = "X-Namechef-Status";
pub const NAMECHEF_STATUS_HEALTHY: &str = "healthy";
pub const NAMECHEF_STATUS_READY: &str = "ready";
pub const NAMECHEF_STATUS_NOT_READY: &str = "not_ready";
pub const NAMECHEF_STATUS_MATCHED: &str = "matched";
pub const NAMECHEF_STATUS_GENERATED: &str = "generated";
pub const NAMECHEF_STATUS_FALLBACK: &str = "fallback";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS);

pub(crate) fn recipe_status(source: RecipeSource) -> &'static str {
    match source {
        RecipeSource::Generated => NAMECHEF_STATUS_GENERATED,
        RecipeSource::Fallback => NAMECHEF_STATUS_FALLBACK,
    }
}

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/match-names", post(match_names_handler))
        .route("/api/get-recipe", post(get_recipe_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub endpoints: Endpoints,
}

#[derive(serde::Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub ready: &'static str,
    pub match_names: &'static str,
    pub get_recipe: &'static str,
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub catalog: &'static str,
    pub catalog_size: usize,
    pub embedder_mode: &'static str,
    pub generator_tier: &'static str,
}

pub async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Name Matching & Recipe Chatbot API",
        endpoints: Endpoints {
            health: "/health",
            ready: "/ready",
            match_names: "/api/match-names",
            get_recipe: "/api/get-recipe",
        },
    })
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        NAMECHEF_STATUS_HEADER,
        HeaderValue::from_static(NAMECHEF_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "healthy",
            service: "api",
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let catalog_size = state.ranker.catalog().len();
    let catalog_status = if catalog_size > 0 {
        NAMECHEF_STATUS_READY
    } else {
        NAMECHEF_STATUS_NOT_READY
    };

    let embedder_mode = if state.ranker.is_embedder_stub() {
        "stub"
    } else {
        "real"
    };

    let components = ComponentStatus {
        http: NAMECHEF_STATUS_READY,
        catalog: catalog_status,
        catalog_size,
        embedder_mode,
        generator_tier: state.generator_tier().as_str(),
    };

    let is_ready = components.catalog == NAMECHEF_STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, NAMECHEF_STATUS_READY)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, NAMECHEF_STATUS_NOT_READY)
    };

    let mut headers = HeaderMap::new();
    headers.insert(NAMECHEF_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
