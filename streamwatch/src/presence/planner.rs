//! Planned-stream scheduling.
//!
//! Operators pre-announce a future broadcast as a calendar event. When the
//! creator actually goes live, the activation claims the planned event
//! instead of creating a duplicate; stale plans are swept periodically.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::discord::{DiscordApi, DiscordError, ScheduledEventPayload};
use crate::domain::{EventRef, PlannedStatus, PlannedStream};
use crate::error::{Error, Result};
use crate::store::GuildStore;

/// Bounded duration of pre-announced events.
const PLANNED_EVENT_DURATION_HOURS: i64 = 4;

pub struct Planner {
    store: Arc<GuildStore>,
    api: Arc<dyn DiscordApi>,
}

impl Planner {
    pub fn new(store: Arc<GuildStore>, api: Arc<dyn DiscordApi>) -> Self {
        Self { store, api }
    }

    /// Pre-announce a future broadcast. Creates the calendar event eagerly
    /// so the community sees it right away.
    pub async fn schedule(
        &self,
        community: &str,
        handle: &str,
        scheduled_time: DateTime<Utc>,
        title: impl Into<String>,
    ) -> Result<PlannedStream> {
        let title = title.into();
        if scheduled_time <= Utc::now() {
            return Err(Error::validation("scheduled time must be in the future"));
        }

        let key = handle.to_lowercase();
        let mut planned = self.store.load_planned(community).await?;
        if planned.contains_key(&key) {
            return Err(Error::validation(format!(
                "a stream for '{handle}' is already planned"
            )));
        }

        let payload = ScheduledEventPayload::external(
            format!("🔴 {handle} live"),
            format!("https://twitch.tv/{key}"),
            scheduled_time,
            scheduled_time + chrono::Duration::hours(PLANNED_EVENT_DURATION_HOURS),
        )
        .with_description(title.clone());
        let event = self.api.create_scheduled_event(community, &payload).await?;

        let record = PlannedStream {
            handle: key.clone(),
            title,
            scheduled_time,
            event_ref: EventRef { event_id: event.id },
            status: PlannedStatus::Planned,
            created_at: Utc::now(),
        };
        planned.insert(key, record.clone());
        self.store.save_planned(community, &planned).await?;

        info!(
            "planned stream for '{}' in {community} at {}",
            record.handle, record.scheduled_time
        );
        Ok(record)
    }

    /// Drop a planned stream and its event.
    pub async fn cancel(&self, community: &str, handle: &str) -> Result<()> {
        let key = handle.to_lowercase();
        let mut planned = self.store.load_planned(community).await?;
        let Some(record) = planned.remove(&key) else {
            return Err(Error::validation(format!(
                "no planned stream for '{handle}'"
            )));
        };

        match self
            .api
            .delete_scheduled_event(community, &record.event_ref.event_id)
            .await
        {
            Ok(()) | Err(DiscordError::NotFound) => {}
            Err(e) => debug!("could not delete planned event: {e}"),
        }
        self.store.save_planned(community, &planned).await?;
        Ok(())
    }

    /// Hand the planned event over to a live activation. Claimed records
    /// belong to the tracked streamer from then on.
    pub async fn claim(&self, community: &str, handle: &str) -> Result<Option<EventRef>> {
        let key = handle.to_lowercase();
        let mut planned = self.store.load_planned(community).await?;
        let Some(record) = planned.get_mut(&key) else {
            return Ok(None);
        };
        if record.status != PlannedStatus::Planned {
            return Ok(None);
        }

        record.status = PlannedStatus::Claimed;
        let event_ref = record.event_ref.clone();
        self.store.save_planned(community, &planned).await?;

        info!("claimed planned stream for '{key}' in {community}");
        Ok(Some(event_ref))
    }

    /// Purge planned records whose scheduled time passed the retention
    /// window without ever being claimed, deleting their orphaned events.
    pub async fn sweep(&self, community: &str, now: DateTime<Utc>) -> Result<()> {
        let mut planned = self.store.load_planned(community).await?;
        let expired: Vec<String> = planned
            .iter()
            .filter(|(_, record)| record.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        if expired.is_empty() {
            return Ok(());
        }

        for key in expired {
            if let Some(record) = planned.remove(&key) {
                info!("sweeping stale planned stream '{key}' in {community}");
                match self
                    .api
                    .delete_scheduled_event(community, &record.event_ref.event_id)
                    .await
                {
                    Ok(()) | Err(DiscordError::NotFound) => {}
                    Err(e) => debug!("could not delete stale planned event: {e}"),
                }
            }
        }
        self.store.save_planned(community, &planned).await?;
        Ok(())
    }
}
