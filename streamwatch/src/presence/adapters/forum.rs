//! Forum-thread presentation: one locked thread per live session, deleted
//! when the broadcast ends.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{LiveContext, OfflineContext, PresentationAdapter};
use crate::discord::{DiscordApi, DiscordError, MessagePayload};
use crate::domain::{MessageRef, TrackedStreamer};
use crate::error::{Error, Result};
use crate::presence::embeds;

pub struct ForumAdapter {
    api: Arc<dyn DiscordApi>,
}

impl ForumAdapter {
    pub fn new(api: Arc<dyn DiscordApi>) -> Self {
        Self { api }
    }

    fn forum_id(record: &TrackedStreamer) -> Result<String> {
        record.status_channel_id.clone().ok_or_else(|| {
            Error::validation(format!("no forum channel configured for '{}'", record.handle))
        })
    }

    async fn create_thread(
        &self,
        ctx: &LiveContext<'_>,
        record: &mut TrackedStreamer,
        announce: bool,
    ) -> Result<()> {
        let forum_id = Self::forum_id(record)?;
        let content = if announce {
            embeds::announcement_line(record)
        } else {
            format!("{} is LIVE!", record.display_name)
        };
        let payload = MessagePayload::embed(embeds::live_embed(record, ctx.live, ctx.now))
            .with_content(content);
        let name = format!("🔴 {} is LIVE!", record.display_name);

        let thread = self.api.create_forum_thread(&forum_id, &name, &payload).await?;
        // The thread is an announcement surface, not a discussion.
        if let Err(e) = self.api.lock_thread(&thread.id).await {
            debug!("could not lock thread {}: {e}", thread.id);
        }

        record.message_ref = Some(MessageRef {
            channel_id: forum_id,
            message_id: thread.starter_message_id(),
            thread_id: Some(thread.id),
        });
        Ok(())
    }
}

#[async_trait]
impl PresentationAdapter for ForumAdapter {
    fn kind(&self) -> &'static str {
        "forum"
    }

    async fn activate(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()> {
        // An earlier, partially completed activation may have created the
        // thread already; converge by editing instead of duplicating.
        if record
            .message_ref
            .as_ref()
            .is_some_and(|r| r.thread_id.is_some())
        {
            return self.refresh(ctx, record).await;
        }
        self.create_thread(ctx, record, ctx.announce).await
    }

    async fn refresh(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()> {
        let payload = MessagePayload::embed(embeds::live_embed(record, ctx.live, ctx.now));

        if let Some(existing) = record.message_ref.clone()
            && let Some(thread_id) = existing.thread_id
        {
            match self
                .api
                .edit_message(&thread_id, &existing.message_id, &payload)
                .await
            {
                Ok(_) => return Ok(()),
                Err(DiscordError::NotFound) => {
                    debug!("thread for {} vanished, recreating", record.handle);
                    record.message_ref = None;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.create_thread(ctx, record, false).await
    }

    async fn deactivate(
        &self,
        _ctx: &OfflineContext<'_>,
        record: &mut TrackedStreamer,
    ) -> Result<()> {
        let Some(existing) = record.message_ref.clone() else {
            return Ok(());
        };
        if let Some(thread_id) = &existing.thread_id {
            match self.api.delete_channel(thread_id).await {
                Ok(()) | Err(DiscordError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        record.message_ref = None;
        Ok(())
    }
}
