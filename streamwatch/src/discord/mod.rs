//! Presentation platform client.
//!
//! The engine talks to Discord through the [`DiscordApi`] trait so the
//! reconciliation logic stays testable without a network; [`DiscordRest`] is
//! the production implementation.

pub mod models;
mod rest;

pub use models::{
    Channel, EventMetadata, EventStatus, ForumThread, Member, Message, MessagePayload,
    ScheduledEvent, ScheduledEventPayload,
};
pub use rest::DiscordRest;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the presentation platform.
#[derive(Error, Debug)]
pub enum DiscordError {
    /// The referenced resource no longer exists (deleted externally).
    #[error("resource not found")]
    NotFound,

    /// The bot lacks the rights for this action.
    #[error("missing permissions")]
    Forbidden,

    /// Still rate limited after the bounded retries.
    #[error("rate limited after {0} retries")]
    RateLimited(u32),

    /// Any other non-success response.
    #[error("discord api error: status {status} - {message}")]
    Api { status: u16, message: String },

    /// Network-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The subset of the platform REST surface the presence engine needs.
#[async_trait]
pub trait DiscordApi: Send + Sync {
    async fn get_channel(&self, channel_id: &str) -> Result<Channel, DiscordError>;
    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), DiscordError>;
    async fn delete_channel(&self, channel_id: &str) -> Result<(), DiscordError>;

    async fn get_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<Message, DiscordError>;
    async fn create_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, DiscordError>;
    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message, DiscordError>;
    async fn delete_message(&self, channel_id: &str, message_id: &str)
    -> Result<(), DiscordError>;

    /// Create a forum thread whose starter message is the given payload.
    async fn create_forum_thread(
        &self,
        channel_id: &str,
        name: &str,
        payload: &MessagePayload,
    ) -> Result<ForumThread, DiscordError>;
    /// Close a thread to replies.
    async fn lock_thread(&self, thread_id: &str) -> Result<(), DiscordError>;

    async fn get_member(&self, guild_id: &str, user_id: &str) -> Result<Member, DiscordError>;
    async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError>;
    async fn remove_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError>;

    async fn get_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
    ) -> Result<ScheduledEvent, DiscordError>;
    async fn create_scheduled_event(
        &self,
        guild_id: &str,
        payload: &ScheduledEventPayload,
    ) -> Result<ScheduledEvent, DiscordError>;
    async fn modify_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
        payload: &ScheduledEventPayload,
    ) -> Result<ScheduledEvent, DiscordError>;
    async fn delete_scheduled_event(
        &self,
        guild_id: &str,
        event_id: &str,
    ) -> Result<(), DiscordError>;
}
