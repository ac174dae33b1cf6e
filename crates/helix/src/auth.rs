//! App access token management.
//!
//! Twitch app tokens come from the client-credentials grant. The manager
//! caches the current token in memory and re-authenticates lazily after an
//! invalidation; tokens are never persisted.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{HelixError, Result};
use crate::models::TokenResponse;

/// Production auth endpoint base.
pub const DEFAULT_AUTH_BASE: &str = "https://id.twitch.tv";

/// A cached app access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub obtained_at: DateTime<Utc>,
}

/// Process-wide manager for the app access token.
///
/// Constructed once at startup and shared by reference with the client; the
/// poll loop is the only caller, so the mutex is uncontended by construction.
pub struct TokenManager {
    client: Client,
    client_id: String,
    client_secret: String,
    auth_base: String,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(
        client: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::with_auth_base(client, client_id, client_secret, DEFAULT_AUTH_BASE)
    }

    /// Override the auth endpoint base. Used by tests.
    pub fn with_auth_base(
        client: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_base: auth_base.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Return the cached token, authenticating first if none is held.
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.cached.lock().as_ref() {
            return Ok(token.token.clone());
        }

        let token = self.exchange().await?;
        let value = token.token.clone();
        *self.cached.lock() = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next `get_token` re-authenticates.
    pub fn invalidate(&self) {
        debug!("invalidating cached app access token");
        *self.cached.lock() = None;
    }

    async fn exchange(&self) -> Result<AccessToken> {
        let url = format!("{}/oauth2/token", self.auth_base);
        let response = self
            .client
            .post(&url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("token exchange rejected: {} - {}", status, body);
            return Err(HelixError::Auth(format!(
                "token exchange failed with status {status}"
            )));
        }

        let parsed: TokenResponse = response.json().await?;
        debug!("obtained new app access token");
        Ok(AccessToken {
            token: parsed.access_token,
            obtained_at: Utc::now(),
        })
    }
}
