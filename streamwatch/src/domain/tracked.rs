//! Tracked streamer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which artifacts are maintained for a tracked streamer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    /// Announcement message in a status channel (or forum thread, depending
    /// on the channel's type).
    #[default]
    Channel,
    /// Calendar-style scheduled event only.
    Event,
    /// Both of the above.
    ChannelAndEvent,
}

impl PresentationMode {
    pub fn uses_channel(&self) -> bool {
        matches!(self, Self::Channel | Self::ChannelAndEvent)
    }

    pub fn uses_event(&self) -> bool {
        matches!(self, Self::Event | Self::ChannelAndEvent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Event => "event",
            Self::ChannelAndEvent => "channel_and_event",
        }
    }

    /// Parse from operator input.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "channel" => Some(Self::Channel),
            "event" => Some(Self::Event),
            "channel_and_event" => Some(Self::ChannelAndEvent),
            _ => None,
        }
    }
}

/// Type of the configured status channel; selects the channel-mode flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    #[default]
    Text,
    Forum,
}

/// Reference to the posted announcement message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
    /// Populated in forum mode: the thread holding the starter message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Reference to an active scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    pub event_id: String,
}

/// A creator a community opted to track, together with its last-known
/// presentation state. Mutated only by the reconciliation engine and the
/// admin entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedStreamer {
    /// Lowercased login; also the map key.
    pub handle: String,
    pub display_name: String,
    /// Stable upstream identity.
    pub user_id: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    /// Channel to rename and post into (channel mode).
    #[serde(default)]
    pub status_channel_id: Option<String>,
    #[serde(default)]
    pub channel_kind: ChannelKind,
    /// Opt-in role mentioned once on the transition to live.
    #[serde(default)]
    pub notification_role_id: Option<String>,
    #[serde(default)]
    pub presentation_mode: PresentationMode,
    /// Last confirmed state; authoritative only after a successful
    /// reconciliation round.
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub message_ref: Option<MessageRef>,
    #[serde(default)]
    pub event_ref: Option<EventRef>,
    /// Throttle anchor for in-place updates while live. `None` means a
    /// refresh is due immediately.
    #[serde(default)]
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl TrackedStreamer {
    pub fn new(
        handle: impl Into<String>,
        display_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into().to_lowercase(),
            display_name: display_name.into(),
            user_id: user_id.into(),
            profile_image_url: None,
            status_channel_id: None,
            channel_kind: ChannelKind::Text,
            notification_role_id: None,
            presentation_mode: PresentationMode::Channel,
            is_live: false,
            message_ref: None,
            event_ref: None,
            last_refreshed_at: None,
        }
    }

    /// Public URL of the creator's stream.
    pub fn stream_url(&self) -> String {
        format!("https://twitch.tv/{}", self.handle)
    }

    /// Check if the refresh throttle window has elapsed.
    pub fn refresh_due(&self, now: DateTime<Utc>, interval: chrono::Duration) -> bool {
        match self.last_refreshed_at {
            Some(at) => now - at >= interval,
            None => true,
        }
    }

    /// Clear the throttle anchor so the next tick refreshes immediately.
    pub fn mark_refresh_due(&mut self) {
        self.last_refreshed_at = None;
    }
}
