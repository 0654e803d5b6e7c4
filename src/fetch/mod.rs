//! External data source.
//!
//! [`Fetcher`] is the seam between the sync orchestrator and the external
//! Brawl Stars API. Every method degrades to "no data" instead of failing:
//! transport errors, non-success statuses and malformed bodies are logged and
//! reported as `None` or an empty list. [`BrawlApiClient`] is the HTTP
//! implementation; tests plug in scripted fetchers.

pub mod client;
pub mod models;

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::PlayerTag;

pub use client::BrawlApiClient;
pub use models::{BrawlerRef, ExternalBattle, PlayerSnapshot};

/// Read access to the external game API.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    /// Current snapshot of a player, or `None` when unavailable.
    async fn fetch_player(&self, tag: &PlayerTag) -> Option<PlayerSnapshot>;

    /// Recent battle log of a player, newest first as delivered; empty when
    /// unavailable. Records that fail to decode are dropped individually.
    async fn fetch_battle_log(&self, tag: &PlayerTag) -> Vec<ExternalBattle>;

    /// Full brawler catalog; empty when unavailable.
    async fn fetch_brawler_catalog(&self) -> Vec<BrawlerRef>;
}

/// Failure talking to the external API. Never leaves the fetch layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout or unreadable body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status.
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// Body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(StatusCode::NOT_FOUND))
    }
}
