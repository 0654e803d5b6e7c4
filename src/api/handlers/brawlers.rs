//! Brawler catalog handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::BrawlerCatalogResponse;
use crate::app_state::AppState;
use crate::error::AnalyticsError;

/// `GET /brawlers`: The brawler catalog.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/brawlers",
    tag = "Brawlers",
    summary = "Brawler catalog",
    responses(
        (status = 200, description = "Catalog entries by id", body = BrawlerCatalogResponse),
    )
)]
pub async fn list_brawlers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let brawlers = state.player_service.brawler_catalog().await?;
    Ok(Json(BrawlerCatalogResponse {
        total: brawlers.len(),
        brawlers,
    }))
}

/// Brawler routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/brawlers", get(list_brawlers))
}
