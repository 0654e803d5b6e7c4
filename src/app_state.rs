//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::PlayerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Player service for all business logic.
    pub player_service: Arc<PlayerService>,
}

impl AppState {
    /// Wraps a service.
    #[must_use]
    pub fn new(player_service: Arc<PlayerService>) -> Self {
        Self { player_service }
    }
}
