//! Player handlers: track, update, analytics, battles, list.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    BattleDto, BattlesQuery, PaginationParams, PlayerListResponse, PlayerSummaryDto,
    RecentBattlesResponse, TrackPlayerRequest, TrackPlayerResponse, UpdatePlayerResponse,
};
use crate::app_state::AppState;
use crate::domain::{PlayerAnalytics, PlayerTag};
use crate::error::{AnalyticsError, ErrorResponse};

/// Battles counted in track/update responses.
const SUMMARY_BATTLES: u32 = 10;

/// `POST /players/track`: Start tracking a player.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on an invalid tag, a player unknown upstream,
/// or a storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/players/track",
    tag = "Players",
    summary = "Track a player",
    description = "Fetches the player's profile and battle log from the Brawl Stars API and stores them. Tracking an already tracked player refreshes it.",
    request_body = TrackPlayerRequest,
    responses(
        (status = 200, description = "Player tracked", body = TrackPlayerResponse),
        (status = 400, description = "Invalid tag or player unknown upstream", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn track_player(
    State(state): State<AppState>,
    payload: Result<Json<TrackPlayerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let Json(req) = payload.map_err(|e| AnalyticsError::InvalidRequest(e.body_text()))?;
    let tag = PlayerTag::parse(&req.player_tag)?;
    tracing::info!(%tag, "tracking player");

    state.player_service.track_player(&tag).await?;
    let battles_found = state
        .player_service
        .recent_battles(&tag, SUMMARY_BATTLES)
        .await?
        .len();

    Ok((
        StatusCode::OK,
        Json(TrackPlayerResponse {
            message: format!(
                "Successfully tracking player {tag}. Found {battles_found} recent battles."
            ),
            player_tag: tag.to_string(),
            battles_found,
        }),
    ))
}

/// `POST /players/{tag}/update`: Refresh a tracked player.
///
/// # Errors
///
/// Returns [`AnalyticsError::PlayerNotFound`] if the player is not tracked.
#[utoipa::path(
    post,
    path = "/api/v1/players/{tag}/update",
    tag = "Players",
    summary = "Refresh a tracked player",
    description = "Best-effort refresh of the profile, brawlers and battle log. Upstream failures are logged and do not fail the request.",
    params(("tag" = String, Path, description = "Player tag, with or without `#`")),
    responses(
        (status = 200, description = "Refresh attempted", body = UpdatePlayerResponse),
        (status = 404, description = "Player not tracked", body = ErrorResponse),
    )
)]
pub async fn update_player(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let tag = PlayerTag::parse(&raw_tag)?;
    if !state.player_service.is_tracked(&tag).await? {
        return Err(AnalyticsError::PlayerNotFound(tag.to_string()));
    }

    state.player_service.update(&tag).await;
    let battles_count = state
        .player_service
        .recent_battles(&tag, SUMMARY_BATTLES)
        .await?
        .len();

    Ok(Json(UpdatePlayerResponse {
        message: format!("Player {tag} data updated successfully"),
        player_tag: tag.to_string(),
        battles_count,
    }))
}

/// `GET /players/{tag}/analytics`: Analytics view of a tracked player.
///
/// # Errors
///
/// Returns [`AnalyticsError::PlayerNotFound`] if the player is not tracked.
#[utoipa::path(
    get,
    path = "/api/v1/players/{tag}/analytics",
    tag = "Players",
    summary = "Player analytics",
    description = "Win rate, custom ratings, brawler mastery and recent form computed from the stored battles.",
    params(("tag" = String, Path, description = "Player tag, with or without `#`")),
    responses(
        (status = 200, description = "Analytics view", body = PlayerAnalytics),
        (status = 404, description = "Player not tracked", body = ErrorResponse),
    )
)]
pub async fn player_analytics(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let tag = PlayerTag::parse(&raw_tag)?;
    let view = state.player_service.analytics(&tag).await?;
    Ok(Json(view))
}

/// `GET /players/{tag}/battles`: Most recent stored battles.
///
/// # Errors
///
/// Returns [`AnalyticsError::PlayerNotFound`] if the player is not tracked.
#[utoipa::path(
    get,
    path = "/api/v1/players/{tag}/battles",
    tag = "Players",
    summary = "Recent battles",
    description = "Stored battles of a tracked player, newest first.",
    params(("tag" = String, Path, description = "Player tag, with or without `#`"), BattlesQuery),
    responses(
        (status = 200, description = "Recent battles", body = RecentBattlesResponse),
        (status = 404, description = "Player not tracked", body = ErrorResponse),
    )
)]
pub async fn recent_battles(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
    Query(query): Query<BattlesQuery>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let tag = PlayerTag::parse(&raw_tag)?;
    let battles = state
        .player_service
        .recent_battles(&tag, query.limit())
        .await?;

    Ok(Json(RecentBattlesResponse {
        player_tag: tag.to_string(),
        total_battles: battles.len(),
        battles: battles.into_iter().map(BattleDto::from).collect(),
    }))
}

/// `GET /players`: List tracked players.
///
/// # Errors
///
/// Returns [`AnalyticsError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/players",
    tag = "Players",
    summary = "List tracked players",
    description = "Returns a paginated list of tracked players, oldest first.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated player list", body = PlayerListResponse),
    )
)]
pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AnalyticsError> {
    let params = params.clamped();
    let page = state
        .player_service
        .list_players(params.offset(), params.per_page)
        .await?;

    Ok(Json(PlayerListResponse {
        players: page.players.into_iter().map(PlayerSummaryDto::from).collect(),
        pagination: params.meta(page.total),
    }))
}

/// Player routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players", get(list_players))
        .route("/players/track", post(track_player))
        .route("/players/{tag}/update", post(update_player))
        .route("/players/{tag}/analytics", get(player_analytics))
        .route("/players/{tag}/battles", get(recent_battles))
}
