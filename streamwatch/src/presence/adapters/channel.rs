//! Channel-mode presentation: a renamed status channel with one announcement
//! message edited in place.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{LiveContext, OfflineContext, PresentationAdapter};
use crate::discord::{DiscordApi, DiscordError, MessagePayload};
use crate::domain::{MessageRef, TrackedStreamer};
use crate::error::{Error, Result};
use crate::presence::embeds;

pub(crate) const LIVE_CHANNEL_NAME: &str = "🔴｜live";
pub(crate) const OFFLINE_CHANNEL_NAME: &str = "⚫｜offline";

pub struct ChannelAdapter {
    api: Arc<dyn DiscordApi>,
}

impl ChannelAdapter {
    pub fn new(api: Arc<dyn DiscordApi>) -> Self {
        Self { api }
    }

    fn channel_id(record: &TrackedStreamer) -> Result<String> {
        record.status_channel_id.clone().ok_or_else(|| {
            Error::validation(format!(
                "no status channel configured for '{}'",
                record.handle
            ))
        })
    }

    /// Renames are cosmetic; failures never block the announcement.
    async fn rename_if_needed(&self, channel_id: &str, name: &str) {
        if let Ok(channel) = self.api.get_channel(channel_id).await
            && channel.name.as_deref() == Some(name)
        {
            return;
        }
        if let Err(e) = self.api.rename_channel(channel_id, name).await {
            debug!("could not rename channel {channel_id}: {e}");
        }
    }

    async fn create(
        &self,
        channel_id: String,
        payload: &MessagePayload,
        record: &mut TrackedStreamer,
    ) -> Result<()> {
        let message = self.api.create_message(&channel_id, payload).await?;
        record.message_ref = Some(MessageRef {
            channel_id,
            message_id: message.id,
            thread_id: None,
        });
        Ok(())
    }
}

#[async_trait]
impl PresentationAdapter for ChannelAdapter {
    fn kind(&self) -> &'static str {
        "channel"
    }

    async fn activate(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()> {
        let channel_id = Self::channel_id(record)?;
        self.rename_if_needed(&channel_id, LIVE_CHANNEL_NAME).await;

        // A fresh message forces a real notification; the previous offline
        // summary is dropped first.
        if let Some(previous) = record.message_ref.take() {
            match self
                .api
                .delete_message(&previous.channel_id, &previous.message_id)
                .await
            {
                Ok(()) | Err(DiscordError::NotFound) => {}
                Err(e) => debug!("could not delete previous announcement: {e}"),
            }
        }

        let mut payload = MessagePayload::embed(embeds::live_embed(record, ctx.live, ctx.now));
        if ctx.announce {
            payload = payload.with_content(embeds::announcement_line(record));
        }
        self.create(channel_id, &payload, record).await
    }

    async fn refresh(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()> {
        let channel_id = Self::channel_id(record)?;
        let payload = MessagePayload::embed(embeds::live_embed(record, ctx.live, ctx.now));

        if let Some(existing) = record.message_ref.clone() {
            match self
                .api
                .edit_message(&existing.channel_id, &existing.message_id, &payload)
                .await
            {
                Ok(_) => return Ok(()),
                Err(DiscordError::NotFound) => {
                    debug!("announcement for {} vanished, recreating", record.handle);
                    record.message_ref = None;
                }
                Err(e) => return Err(e.into()),
            }
        }

        // Dangling or never-created reference: recreate, without a ping.
        self.rename_if_needed(&channel_id, LIVE_CHANNEL_NAME).await;
        self.create(channel_id, &payload, record).await
    }

    async fn deactivate(
        &self,
        ctx: &OfflineContext<'_>,
        record: &mut TrackedStreamer,
    ) -> Result<()> {
        let channel_id = Self::channel_id(record)?;
        self.rename_if_needed(&channel_id, OFFLINE_CHANNEL_NAME).await;

        // The empty content strips the ping line from the edited message.
        let payload =
            MessagePayload::embed(embeds::offline_embed(record, ctx.offline)).with_content("");

        if let Some(existing) = record.message_ref.clone() {
            match self
                .api
                .edit_message(&existing.channel_id, &existing.message_id, &payload)
                .await
            {
                Ok(_) => return Ok(()),
                Err(DiscordError::NotFound) => {
                    record.message_ref = None;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.create(channel_id, &payload, record).await
    }
}
