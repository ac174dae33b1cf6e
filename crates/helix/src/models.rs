//! Wire models for the Helix endpoints we consume, plus the public types
//! handed to the presence engine.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of the client-credentials token exchange.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// Every Helix list endpoint wraps its payload in a `data` array.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Page<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserData {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamData {
    pub title: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub viewer_count: u64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelData {
    #[serde(default)]
    pub game_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoData {
    pub created_at: DateTime<Utc>,
}

/// Resolved upstream identity of a creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub login: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
}

impl From<UserData> for Identity {
    fn from(user: UserData) -> Self {
        Self {
            user_id: user.id,
            login: user.login,
            display_name: user.display_name,
            profile_image_url: user.profile_image_url,
        }
    }
}

/// Live status of a creator as reported by the platform.
#[derive(Debug, Clone)]
pub enum StreamStatus {
    /// The creator is currently broadcasting.
    Live {
        title: String,
        /// Current category, if the platform reports one.
        category: Option<String>,
        viewer_count: u64,
        /// Thumbnail URL template with `{width}`/`{height}` placeholders.
        thumbnail_url: Option<String>,
        started_at: Option<DateTime<Utc>>,
    },
    /// The creator is offline.
    Offline {
        /// Category of the most recent broadcast, if known.
        last_category: Option<String>,
        /// Start time of the most recent archived broadcast, if known.
        last_broadcast_at: Option<DateTime<Utc>>,
    },
}

impl StreamStatus {
    /// Check if the status indicates the creator is live.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    /// Get the stream title if live.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Live { title, .. } => Some(title),
            Self::Offline { .. } => None,
        }
    }
}
