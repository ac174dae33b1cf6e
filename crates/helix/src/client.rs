//! Live status queries against the Helix API.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::TokenManager;
use crate::error::{HelixError, Result};
use crate::models::{ChannelData, Identity, Page, StreamData, StreamStatus, UserData, VideoData};

/// Production API base.
pub const DEFAULT_API_BASE: &str = "https://api.twitch.tv/helix";

/// Read-only Helix client.
///
/// All requests carry the `Client-ID` header and a bearer app token. A 401
/// response invalidates the token and retries the single request exactly
/// once before surfacing an auth error.
pub struct HelixClient {
    client: Client,
    tokens: TokenManager,
    api_base: String,
}

impl HelixClient {
    pub fn new(client: Client, tokens: TokenManager) -> Self {
        Self::with_api_base(client, tokens, DEFAULT_API_BASE)
    }

    /// Override the API base. Used by tests.
    pub fn with_api_base(
        client: Client,
        tokens: TokenManager,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            api_base: api_base.into(),
        }
    }

    /// Resolve a login name to a stable identity.
    ///
    /// Returns `Ok(None)` when the platform knows no such creator.
    pub async fn resolve(&self, login: &str) -> Result<Option<Identity>> {
        let page: Page<UserData> = self.get("users", &[("login", login)]).await?;
        Ok(page.data.into_iter().next().map(Identity::from))
    }

    /// Fetch the live status plus auxiliary metadata for an identity.
    pub async fn fetch_status(&self, identity: &Identity) -> Result<StreamStatus> {
        let streams: Page<StreamData> = self
            .get("streams", &[("user_id", identity.user_id.as_str())])
            .await?;

        if let Some(stream) = streams.data.into_iter().next() {
            return Ok(StreamStatus::Live {
                title: stream.title,
                category: stream.game_name.filter(|g| !g.is_empty()),
                viewer_count: stream.viewer_count,
                thumbnail_url: stream.thumbnail_url,
                started_at: stream.started_at,
            });
        }

        // Offline: the channel endpoint carries the last category and the
        // archive listing the last broadcast time. Both are decorations; a
        // failed lookup degrades to None instead of failing the status.
        let last_category = match self
            .get::<Page<ChannelData>>(
                "channels",
                &[("broadcaster_id", identity.user_id.as_str())],
            )
            .await
        {
            Ok(page) => page
                .data
                .into_iter()
                .next()
                .and_then(|c| c.game_name)
                .filter(|g| !g.is_empty()),
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => {
                debug!("channel lookup failed for {}: {}", identity.login, e);
                None
            }
        };

        let last_broadcast_at = match self
            .get::<Page<VideoData>>(
                "videos",
                &[
                    ("user_id", identity.user_id.as_str()),
                    ("type", "archive"),
                    ("first", "1"),
                    ("sort", "time"),
                ],
            )
            .await
        {
            Ok(page) => page.data.into_iter().next().map(|v| v.created_at),
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => {
                debug!("archive lookup failed for {}: {}", identity.login, e);
                None
            }
        };

        Ok(StreamStatus::Offline {
            last_category,
            last_broadcast_at,
        })
    }

    /// GET a Helix resource, refreshing the app token once on a 401.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        match self.get_once(path, query).await {
            Err(HelixError::Unauthorized) => {
                debug!("helix rejected the app token, refreshing and retrying once");
                self.tokens.invalidate();
                match self.get_once(path, query).await {
                    Err(HelixError::Unauthorized) => Err(HelixError::Auth(
                        "api kept rejecting a freshly acquired token".to_string(),
                    )),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}/{}", self.api_base, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Client-ID", self.tokens.client_id())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(HelixError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HelixError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})),
            )
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> HelixClient {
        let tokens =
            TokenManager::with_auth_base(Client::new(), "cid", "secret", server.uri());
        HelixClient::with_api_base(Client::new(), tokens, server.uri())
    }

    fn identity() -> Identity {
        Identity {
            user_id: "42".to_string(),
            login: "alice".to_string(),
            display_name: "Alice".to_string(),
            profile_image_url: None,
        }
    }

    #[tokio::test]
    async fn resolve_returns_none_for_unknown_login() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("login", "nobody"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let resolved = client(&server).resolve("nobody").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn resolve_maps_user_payload() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "42",
                    "login": "alice",
                    "display_name": "Alice",
                    "profile_image_url": "https://example.com/alice.png"
                }]
            })))
            .mount(&server)
            .await;

        let resolved = client(&server).resolve("alice").await.unwrap().unwrap();
        assert_eq!(resolved.user_id, "42");
        assert_eq!(resolved.display_name, "Alice");
    }

    #[tokio::test]
    async fn fetch_status_live() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/streams"))
            .and(query_param("user_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "title": "Speedrun",
                    "game_name": "Celeste",
                    "viewer_count": 123,
                    "thumbnail_url": "https://example.com/{width}x{height}.jpg",
                    "started_at": "2026-01-01T10:00:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let status = client(&server).fetch_status(&identity()).await.unwrap();
        match status {
            StreamStatus::Live {
                title,
                category,
                viewer_count,
                ..
            } => {
                assert_eq!(title, "Speedrun");
                assert_eq!(category.as_deref(), Some("Celeste"));
                assert_eq!(viewer_count, 123);
            }
            other => panic!("expected live status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_status_offline_with_decorations() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/streams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("broadcaster_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"game_name": "Celeste"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("type", "archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"created_at": "2026-01-01T08:00:00Z"}]
            })))
            .mount(&server)
            .await;

        let status = client(&server).fetch_status(&identity()).await.unwrap();
        match status {
            StreamStatus::Offline {
                last_category,
                last_broadcast_at,
            } => {
                assert_eq!(last_category.as_deref(), Some("Celeste"));
                assert!(last_broadcast_at.is_some());
            }
            other => panic!("expected offline status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_request_refreshes_token_and_retries_once() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        // First streams call is rejected, the retry succeeds.
        Mock::given(method("GET"))
            .and(path("/streams"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/streams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"title": "Back", "viewer_count": 1}]
            })))
            .mount(&server)
            .await;

        let status = client(&server).fetch_status(&identity()).await.unwrap();
        assert!(status.is_live());
    }

    #[tokio::test]
    async fn persistent_unauthorized_surfaces_auth_error() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/streams"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_status(&identity())
            .await
            .unwrap_err();
        assert!(matches!(err, HelixError::Auth(_)));
    }
}
