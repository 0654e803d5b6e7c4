//! System endpoints: health check and service banner.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Service banner listing the endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct BannerResponse {
    service: &'static str,
    version: &'static str,
    endpoints: Vec<&'static str>,
}

/// `GET /`: Service banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Service banner",
    responses(
        (status = 200, description = "Service name, version and endpoints", body = BannerResponse),
    )
)]
pub async fn banner_handler() -> impl IntoResponse {
    Json(BannerResponse {
        service: "Brawl Stars Analytics API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "POST /api/v1/players/track",
            "POST /api/v1/players/{tag}/update",
            "GET /api/v1/players/{tag}/analytics",
            "GET /api/v1/players/{tag}/battles",
            "GET /api/v1/players",
            "GET /api/v1/brawlers",
            "GET /health",
            "GET /api-docs/openapi.json",
        ],
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banner_handler))
        .route("/health", get(health_handler))
}
