//! Event-mode presentation: a calendar-style scheduled event with an
//! external link to the stream.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{LiveContext, OfflineContext, PresentationAdapter};
use crate::discord::{DiscordApi, DiscordError, EventStatus, ScheduledEventPayload};
use crate::domain::{EventRef, TrackedStreamer};
use crate::error::Result;
use crate::presence::embeds;

/// Offset applied to the start time of events created at activation; the
/// API rejects start times in the past.
const EVENT_LEAD_SECS: i64 = 60;

/// Bounded end time for events created by the engine.
const EVENT_MAX_DURATION_HOURS: i64 = 12;

pub struct EventAdapter {
    api: Arc<dyn DiscordApi>,
}

impl EventAdapter {
    pub fn new(api: Arc<dyn DiscordApi>) -> Self {
        Self { api }
    }

    fn event_name(record: &TrackedStreamer) -> String {
        format!("🔴 {} live", record.display_name)
    }

    /// The event exists either way after creation; a failed status flip is
    /// only logged and converges on the next refresh.
    async fn mark_active(&self, guild_id: &str, event_id: &str) {
        let payload = ScheduledEventPayload::default().with_status(EventStatus::Active);
        if let Err(e) = self
            .api
            .modify_scheduled_event(guild_id, event_id, &payload)
            .await
        {
            debug!("could not flip event {event_id} active: {e}");
        }
    }

    async fn create_event(
        &self,
        ctx: &LiveContext<'_>,
        record: &mut TrackedStreamer,
    ) -> Result<()> {
        let start = ctx.now + chrono::Duration::seconds(EVENT_LEAD_SECS);
        let end = ctx.now + chrono::Duration::hours(EVENT_MAX_DURATION_HOURS);
        let payload = ScheduledEventPayload::external(
            Self::event_name(record),
            record.stream_url(),
            start,
            end,
        )
        .with_description(embeds::event_description(ctx.live));

        let event = self
            .api
            .create_scheduled_event(ctx.community_id, &payload)
            .await?;
        self.mark_active(ctx.community_id, &event.id).await;

        record.event_ref = Some(EventRef { event_id: event.id });
        Ok(())
    }
}

#[async_trait]
impl PresentationAdapter for EventAdapter {
    fn kind(&self) -> &'static str {
        "event"
    }

    async fn activate(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()> {
        // A planned stream claimed for this activation hands us its event
        // instead of a fresh one.
        if record.event_ref.is_none()
            && let Some(claimed) = ctx.claimed_event
        {
            record.event_ref = Some(claimed.clone());
        }

        if let Some(existing) = record.event_ref.clone() {
            let payload = ScheduledEventPayload::default()
                .with_description(embeds::event_description(ctx.live));
            match self
                .api
                .modify_scheduled_event(ctx.community_id, &existing.event_id, &payload)
                .await
            {
                Ok(_) => {
                    self.mark_active(ctx.community_id, &existing.event_id).await;
                    return Ok(());
                }
                Err(DiscordError::NotFound) => {
                    debug!("event for {} vanished, recreating", record.handle);
                    record.event_ref = None;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.create_event(ctx, record).await
    }

    async fn refresh(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()> {
        if let Some(existing) = record.event_ref.clone() {
            let payload = ScheduledEventPayload::default()
                .with_description(embeds::event_description(ctx.live));
            match self
                .api
                .modify_scheduled_event(ctx.community_id, &existing.event_id, &payload)
                .await
            {
                Ok(_) => return Ok(()),
                Err(DiscordError::NotFound) => {
                    debug!("event for {} vanished, recreating", record.handle);
                    record.event_ref = None;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.create_event(ctx, record).await
    }

    async fn deactivate(
        &self,
        ctx: &OfflineContext<'_>,
        record: &mut TrackedStreamer,
    ) -> Result<()> {
        let Some(existing) = record.event_ref.clone() else {
            return Ok(());
        };
        match self
            .api
            .delete_scheduled_event(ctx.community_id, &existing.event_id)
            .await
        {
            Ok(()) | Err(DiscordError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        record.event_ref = None;
        Ok(())
    }
}
