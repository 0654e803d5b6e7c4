//! OpenAPI document and its HTTP exposure.

use axum::Router;
use utoipa::OpenApi;

use crate::api::dto::{
    BattleDto, BrawlerCatalogResponse, PaginationMeta, PlayerListResponse, PlayerSummaryDto,
    RecentBattlesResponse, TrackPlayerRequest, TrackPlayerResponse, UpdatePlayerResponse,
};
use crate::api::handlers::{brawlers, players, system};
use crate::app_state::AppState;
use crate::domain::analytics::{
    BrawlerMastery, CustomMetrics, ImprovementTrend, Last10Games, MasteryLevel, OverallStats,
    RecentForm, TrendDirection,
};
use crate::domain::{BattleResult, Brawler, BrawlerUsage, PlayerAnalytics};
use crate::error::{ErrorBody, ErrorResponse};

/// Path of the generated OpenAPI JSON.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI document of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Brawl Stars Analytics API",
        description = "Match-history ingestion and player analytics for Brawl Stars."
    ),
    paths(
        players::track_player,
        players::update_player,
        players::player_analytics,
        players::recent_battles,
        players::list_players,
        brawlers::list_brawlers,
        system::health_handler,
        system::banner_handler,
    ),
    components(schemas(
        TrackPlayerRequest,
        TrackPlayerResponse,
        UpdatePlayerResponse,
        RecentBattlesResponse,
        BattleDto,
        BattleResult,
        BrawlerUsage,
        PlayerListResponse,
        PlayerSummaryDto,
        PaginationMeta,
        BrawlerCatalogResponse,
        Brawler,
        PlayerAnalytics,
        OverallStats,
        CustomMetrics,
        ImprovementTrend,
        BrawlerMastery,
        MasteryLevel,
        RecentForm,
        Last10Games,
        TrendDirection,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
        system::BannerResponse,
    )),
    tags(
        (name = "Players", description = "Tracking, refresh and analytics"),
        (name = "Brawlers", description = "Brawler catalog"),
        (name = "System", description = "Health and service information"),
    )
)]
pub struct ApiDoc;

/// Routes serving the document, plus Swagger UI when the `swagger-ui`
/// feature is enabled.
#[cfg(feature = "swagger-ui")]
pub fn routes() -> Router<AppState> {
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()))
}

/// Routes serving the document, plus Swagger UI when the `swagger-ui`
/// feature is enabled.
#[cfg(not(feature = "swagger-ui"))]
pub fn routes() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}
