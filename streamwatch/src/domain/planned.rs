//! Operator-created planned streams.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tracked::EventRef;

/// How long an unclaimed planned stream is kept past its scheduled time.
pub const PLANNED_RETENTION_HOURS: i64 = 24;

/// Lifecycle of a planned stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedStatus {
    /// Waiting for the creator to go live.
    #[default]
    Planned,
    /// Adopted by a live activation; the event now belongs to the tracked
    /// streamer record.
    Claimed,
}

/// A pre-announced future broadcast, backed by a calendar event created at
/// schedule time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedStream {
    /// Lowercased login; also the map key.
    pub handle: String,
    pub title: String,
    pub scheduled_time: DateTime<Utc>,
    pub event_ref: EventRef,
    #[serde(default)]
    pub status: PlannedStatus,
    pub created_at: DateTime<Utc>,
}

impl PlannedStream {
    /// A planned stream expires when it was never claimed and its scheduled
    /// time is more than the retention window in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == PlannedStatus::Planned
            && now - self.scheduled_time > chrono::Duration::hours(PLANNED_RETENTION_HOURS)
    }
}
