//! REST implementation of [`DiscordApi`].
//!
//! Rate limit handling follows the platform's guidance: no hardcoded
//! limits, parse the response headers, retry 429s respecting `Retry-After`
//! a bounded number of times.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{
    Channel, ForumThread, Member, Message, MessagePayload, ScheduledEvent, ScheduledEventPayload,
};
use super::{DiscordApi, DiscordError};

/// Production API base.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Maximum number of retries for rate-limited requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Auto-archive duration (minutes) for live threads.
const THREAD_AUTO_ARCHIVE_MINUTES: u32 = 60;

pub struct DiscordRest {
    client: Client,
    token: String,
    api_base: String,
}

impl DiscordRest {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self::with_api_base(client, token, DEFAULT_API_BASE)
    }

    /// Override the API base. Used by tests.
    pub fn with_api_base(
        client: Client,
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            api_base: api_base.into(),
        }
    }

    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, DiscordError> {
        let url = format!("{}/{}", self.api_base, path);
        let mut attempts = 0;

        loop {
            attempts += 1;

            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("Authorization", format!("Bot {}", self.token));
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = parse_retry_after(&response);
                if attempts >= MAX_RATE_LIMIT_RETRIES {
                    warn!(
                        "rate limit on {} {}: max retries ({}) exceeded",
                        method, path, MAX_RATE_LIMIT_RETRIES
                    );
                    return Err(DiscordError::RateLimited(MAX_RATE_LIMIT_RETRIES));
                }
                let wait = retry_after.unwrap_or(Duration::from_secs(1));
                debug!(
                    "rate limited on {} {}, waiting {:?} (attempt {}/{})",
                    method, path, wait, attempts, MAX_RATE_LIMIT_RETRIES
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                return Err(DiscordError::NotFound);
            }
            if status == StatusCode::FORBIDDEN {
                return Err(DiscordError::Forbidden);
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(DiscordError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, DiscordError> {
        let response = self.send(method, path, body).await?;
        Ok(response.json().await?)
    }

    async fn request_unit<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), DiscordError> {
        self.send(method, path, body).await.map(|_| ())
    }
}

/// Parse the retry delay from a 429 response.
fn parse_retry_after(response: &Response) -> Option<Duration> {
    for header in ["Retry-After", "X-RateLimit-Reset-After"] {
        if let Some(value) = response.headers().get(header)
            && let Ok(secs) = value.to_str().ok()?.parse::<f64>()
        {
            return Some(Duration::from_secs_f64(secs));
        }
    }
    None
}

#[async_trait]
impl DiscordApi for DiscordRest {
    async fn get_channel(&self, channel_id: &str) -> Result<Channel, DiscordError> {
        self.request::<Channel, ()>(Method::GET, &format!("channels/{channel_id}"), None)
            .await
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), DiscordError> {
        let _: Channel = self
            .request(
                Method::PATCH,
                &format!("channels/{channel_id}"),
                Some(&serde_json::json!({ "name": name })),
            )
            .await?;
        Ok(())
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), DiscordError> {
        self.request_unit::<()>(Method::DELETE, &format!("channels/{channel_id}"), None)
            .await
    }

    async fn get_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<Message, DiscordError> {
        self.request::<Message, ()>(
            Method::GET,
            &format!("channels/{channel_id}/messages/{message_id}"),
            None,
        )
        .await
    }

    async fn create_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, DiscordError> {
        self.request(
            Method::POST,
            &format!("channels/{channel_id}/messages"),
            Some(payload),
        )
        .await
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, DiscordError> {
        self.request(
            Method::PATCH,
            &format!("channels/{channel_id}/messages/{message_id}"),
            Some(payload),
        )
        .await
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), DiscordError> {
        self.request_unit::<()>(
            Method::DELETE,
            &format!("channels/{channel_id}/messages/{message_id}"),
            None,
        )
        .await
    }

    async fn create_forum_thread(
        &self,
        channel_id: &str,
        name: &str,
        payload: &MessagePayload,
    ) -> Result<ForumThread, DiscordError> {
        self.request(
            Method::POST,
            &format!("channels/{channel_id}/threads"),
            Some(&serde_json::json!({
                "name": name,
                "auto_archive_duration": THREAD_AUTO_ARCHIVE_MINUTES,
                "message": payload,
            })),
        )
        .await
    }

    async fn lock_thread(&self, thread_id: &str) -> Result<(), DiscordError> {
        let _: Channel = self
            .request(
                Method::PATCH,
                &format!("channels/{thread_id}"),
                Some(&serde_json::json!({ "locked": true })),
            )
            .await?;
        Ok(())
    }

    async fn get_member(&self, guild_id: &str, user_id: &str) -> Result<Member, DiscordError> {
        self.request::<Member, ()>(
            Method::GET,
            &format!("guilds/{guild_id}/members/{user_id}"),
            None,
        )
        .await
    }

    async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError> {
        self.request_unit::<()>(
            Method::PUT,
            &format!("guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            None,
        )
        .await
    }

    async fn remove_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError> {
        self.request_unit::<()>(
            Method::DELETE,
            &format!("guilds/{guild_id}/members/{user_id}/roles/{role_id}"),
            None,
        )
        .await
    }

    async fn get_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
    ) -> Result<ScheduledEvent, DiscordError> {
        self.request::<ScheduledEvent, ()>(
            Method::GET,
            &format!("guilds/{guild_id}/scheduled-events/{event_id}"),
            None,
        )
        .await
    }

    async fn create_scheduled_event(
        &self,
        guild_id: &str,
        payload: &ScheduledEventPayload,
    ) -> Result<ScheduledEvent, DiscordError> {
        self.request(
            Method::POST,
            &format!("guilds/{guild_id}/scheduled-events"),
            Some(payload),
        )
        .await
    }

    async fn modify_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
        payload: &ScheduledEventPayload,
    ) -> Result<ScheduledEvent, DiscordError> {
        self.request(
            Method::PATCH,
            &format!("guilds/{guild_id}/scheduled-events/{event_id}"),
            Some(payload),
        )
        .await
    }

    async fn delete_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
    ) -> Result<(), DiscordError> {
        self.request_unit::<()>(
            Method::DELETE,
            &format!("guilds/{guild_id}/scheduled-events/{event_id}"),
            None,
        )
        .await
    }
}
