//! Wire models and request payloads for the presentation platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel type id for guild forum channels.
const CHANNEL_TYPE_FORUM: u8 = 15;

/// Scheduled event entity type for external (off-platform) events.
pub(crate) const EVENT_ENTITY_EXTERNAL: u8 = 3;
/// Scheduled event privacy level; the API only accepts guild-only.
pub(crate) const EVENT_PRIVACY_GUILD_ONLY: u8 = 2;

/// Scheduled event lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EventStatus {
    Scheduled,
    Active,
    Completed,
    Canceled,
}

impl From<EventStatus> for u8 {
    fn from(status: EventStatus) -> Self {
        match status {
            EventStatus::Scheduled => 1,
            EventStatus::Active => 2,
            EventStatus::Completed => 3,
            EventStatus::Canceled => 4,
        }
    }
}

impl TryFrom<u8> for EventStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Scheduled),
            2 => Ok(Self::Active),
            3 => Ok(Self::Completed),
            4 => Ok(Self::Canceled),
            other => Err(format!("unknown scheduled event status {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
}

impl Channel {
    pub fn is_forum(&self) -> bool {
        self.kind == CHANNEL_TYPE_FORUM
    }
}

/// A freshly created forum thread together with its starter message.
#[derive(Debug, Clone, Deserialize)]
pub struct ForumThread {
    pub id: String,
    #[serde(default)]
    pub message: Option<Message>,
}

impl ForumThread {
    /// Starter message id; for forum threads it equals the thread id when
    /// the API does not echo the message back.
    pub fn starter_message_id(&self) -> String {
        self.message
            .as_ref()
            .map(|m| m.id.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A guild member, reduced to what the role toggle needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Member {
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|role| role == role_id)
    }
}

/// Body for message create and edit calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<serde_json::Value>,
}

impl MessagePayload {
    pub fn embed(embed: serde_json::Value) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Body for scheduled event create and modify calls. All fields optional so
/// the same type serves partial edits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduledEventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_metadata: Option<EventMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventMetadata {
    pub location: String,
}

impl ScheduledEventPayload {
    /// Payload for creating a new external event pointing at a stream URL.
    pub fn external(
        name: impl Into<String>,
        location: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            scheduled_start_time: Some(start),
            scheduled_end_time: Some(end),
            privacy_level: Some(EVENT_PRIVACY_GUILD_ONLY),
            entity_type: Some(EVENT_ENTITY_EXTERNAL),
            entity_metadata: Some(EventMetadata {
                location: location.into(),
            }),
            status: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = Some(status);
        self
    }
}
