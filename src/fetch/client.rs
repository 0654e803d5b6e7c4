//! HTTP client for the Brawl Stars API.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{BrawlerRef, ExternalBattle, Items, PlayerSnapshot};
use super::{FetchError, Fetcher};
use crate::domain::PlayerTag;

/// Rate-limited, authenticated client.
///
/// All requests share one in-process token bucket so that concurrent syncs
/// stay under the API quota together.
#[derive(Debug)]
pub struct BrawlApiClient {
    client: reqwest::Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    base_url: String,
    token: Option<String>,
}

impl BrawlApiClient {
    /// Builds a client against `base_url` (e.g. `https://api.brawlstars.com/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        requests_per_second: NonZeroU32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let quota = Quota::per_second(requests_per_second).allow_burst(requests_per_second);

        Ok(Self {
            client,
            limiter: RateLimiter::direct(quota),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    async fn request<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn player_path(tag: &PlayerTag) -> String {
        format!("players/{}", urlencoding::encode(tag.as_str()))
    }

    /// Fetches a player snapshot.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`].
    pub async fn get_player(&self, tag: &PlayerTag) -> Result<PlayerSnapshot, FetchError> {
        tracing::trace!(%tag, "fetching player");
        self.request(&Self::player_path(tag)).await
    }

    /// Fetches a battle log, decoding each record on its own.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] for the request or the envelope; malformed records
    /// are skipped.
    pub async fn get_battle_log(&self, tag: &PlayerTag) -> Result<Vec<ExternalBattle>, FetchError> {
        tracing::trace!(%tag, "fetching battle log");
        let path = format!("{}/battlelog", Self::player_path(tag));
        let envelope: Items<Value> = self.request(&path).await?;
        Ok(decode_battles(tag, envelope.items))
    }

    /// Fetches the brawler catalog.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`].
    pub async fn get_brawlers(&self) -> Result<Vec<BrawlerRef>, FetchError> {
        tracing::trace!("fetching brawler catalog");
        let envelope: Items<BrawlerRef> = self.request("brawlers").await?;
        Ok(envelope.items)
    }
}

fn decode_battles(tag: &PlayerTag, items: Vec<Value>) -> Vec<ExternalBattle> {
    let total = items.len();
    let battles: Vec<ExternalBattle> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(battle) => Some(battle),
            Err(e) => {
                tracing::warn!(%tag, index, error = %e, "skipping malformed battle record");
                None
            }
        })
        .collect();
    if battles.len() < total {
        tracing::debug!(%tag, total, decoded = battles.len(), "battle log partially decoded");
    }
    battles
}

fn log_failure(what: &str, tag: Option<&PlayerTag>, error: &FetchError) {
    let tag = tag.map(PlayerTag::as_str).unwrap_or("-");
    if error.is_not_found() {
        tracing::info!(tag, "{what} not found upstream");
    } else {
        tracing::warn!(tag, error = %error, "{what} fetch failed");
    }
}

#[async_trait]
impl Fetcher for BrawlApiClient {
    async fn fetch_player(&self, tag: &PlayerTag) -> Option<PlayerSnapshot> {
        self.get_player(tag)
            .await
            .map_err(|e| log_failure("player", Some(tag), &e))
            .ok()
    }

    async fn fetch_battle_log(&self, tag: &PlayerTag) -> Vec<ExternalBattle> {
        self.get_battle_log(tag)
            .await
            .map_err(|e| log_failure("battle log", Some(tag), &e))
            .unwrap_or_default()
    }

    async fn fetch_brawler_catalog(&self) -> Vec<BrawlerRef> {
        self.get_brawlers()
            .await
            .map_err(|e| log_failure("brawler catalog", None, &e))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer, token: Option<&str>) -> BrawlApiClient {
        let Ok(client) = BrawlApiClient::new(
            server.base_url(),
            token.map(str::to_string),
            NonZeroU32::MIN.saturating_add(99),
            Duration::from_secs(5),
        ) else {
            panic!("client should build");
        };
        client
    }

    fn tag() -> PlayerTag {
        PlayerTag::from_trusted("#2PP")
    }

    #[tokio::test]
    async fn player_request_sends_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("/players/")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(json!({
                    "tag": "#2PP",
                    "name": "Tester",
                    "trophies": 500,
                    "club": { "tag": "#CLUB", "name": "Club" }
                }));
            })
            .await;

        let snapshot = client(&server, Some("secret")).fetch_player(&tag()).await;

        mock.assert_async().await;
        let Some(snapshot) = snapshot else {
            panic!("snapshot expected");
        };
        assert_eq!(snapshot.name, "Tester");
        assert_eq!(snapshot.trophies, 500);
        assert_eq!(snapshot.club().map(|c| c.tag), Some("#CLUB".to_string()));
    }

    #[tokio::test]
    async fn not_found_player_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/players/");
                then.status(404).json_body(json!({ "reason": "notFound" }));
            })
            .await;

        assert!(client(&server, None).fetch_player(&tag()).await.is_none());
    }

    #[tokio::test]
    async fn server_error_yields_empty_battle_log() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/battlelog");
                then.status(503);
            })
            .await;

        assert!(client(&server, None).fetch_battle_log(&tag()).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_battle_record_is_skipped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/battlelog");
                then.status(200).json_body(json!({
                    "items": [
                        {
                            "battleTime": "20241114T120000.000Z",
                            "event": { "mode": "gemGrab", "map": "Hard Rock Mine" },
                            "battle": { "result": "victory", "trophyChange": 8 }
                        },
                        { "battleTime": 42 },
                        {
                            "battleTime": "20241114T110000.000Z",
                            "event": { "mode": "brawlBall" },
                            "battle": { "result": "defeat" }
                        }
                    ]
                }));
            })
            .await;

        let battles = client(&server, None).fetch_battle_log(&tag()).await;

        assert_eq!(battles.len(), 2);
        assert_eq!(battles.first().map(|b| b.battle_time.as_str()), Some("20241114T120000.000Z"));
        assert_eq!(battles.get(1).and_then(|b| b.event.mode.as_deref()), Some("brawlBall"));
    }

    #[tokio::test]
    async fn catalog_unwraps_items() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/brawlers");
                then.status(200).json_body(json!({
                    "items": [
                        { "id": 16000000, "name": "SHELLY", "starPowers": [] },
                        { "id": 16000001, "name": "COLT" }
                    ]
                }));
            })
            .await;

        let catalog = client(&server, None).fetch_brawler_catalog().await;
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).map(|b| b.id), Some(16_000_001));
    }

    #[tokio::test]
    async fn garbage_body_yields_empty_catalog() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/brawlers");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        assert!(client(&server, None).fetch_brawler_catalog().await.is_empty());
    }

    #[test]
    fn player_path_encodes_hash() {
        assert_eq!(BrawlApiClient::player_path(&tag()), "players/%232PP");
    }
}
