//! Admin entry points.
//!
//! The console (and any other operator surface) mutates engine state only
//! through these functions. Each returns a human-readable outcome message
//! and triggers an immediate one-off reconciliation where it matters, so
//! the UI reflects reality without waiting for the next tick.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::service::Engine;
use crate::domain::{ChannelKind, PresentationMode, TrackedStreamer};
use crate::error::{Error, Result};

impl Engine {
    /// Start tracking a creator for a community.
    pub async fn add_streamer(
        &self,
        community: &str,
        handle: &str,
        mode: PresentationMode,
        status_channel_id: Option<String>,
        notification_role_id: Option<String>,
    ) -> Result<String> {
        if mode.uses_channel() && status_channel_id.is_none() {
            return Err(Error::validation(
                "channel mode requires a status channel to post into",
            ));
        }

        let Some(identity) = self.source.resolve(handle).await? else {
            return Err(Error::validation(format!(
                "creator '{handle}' was not found on the platform"
            )));
        };

        let key = identity.login.to_lowercase();
        let mut tracked = self.store().load_tracked(community).await?;
        if tracked.contains_key(&key) {
            return Err(Error::validation(format!(
                "'{}' is already tracked",
                identity.display_name
            )));
        }

        // The channel's type decides the channel-mode flavor.
        let channel_kind = match &status_channel_id {
            Some(channel_id) => {
                if self.api().get_channel(channel_id).await?.is_forum() {
                    ChannelKind::Forum
                } else {
                    ChannelKind::Text
                }
            }
            None => ChannelKind::Text,
        };

        let display_name = identity.display_name.clone();
        let mut record = TrackedStreamer::new(&key, display_name.clone(), identity.user_id);
        record.profile_image_url = identity.profile_image_url;
        record.status_channel_id = status_channel_id;
        record.channel_kind = channel_kind;
        record.notification_role_id = notification_role_id;
        record.presentation_mode = mode;

        tracked.insert(key.clone(), record);
        self.store().save_tracked(community, &tracked).await?;

        if let Err(e) = self.reconcile_now(community, &key).await {
            warn!("initial reconciliation for '{key}' failed: {e}");
        }

        Ok(format!(
            "Now tracking '{display_name}' ({} mode).",
            mode.as_str()
        ))
    }

    /// Stop tracking a creator, cleaning up its live artifacts best-effort.
    pub async fn remove_streamer(&self, community: &str, handle: &str) -> Result<String> {
        let key = handle.to_lowercase();
        let mut tracked = self.store().load_tracked(community).await?;
        let Some(record) = tracked.remove(&key) else {
            return Err(Error::validation(format!("'{handle}' is not tracked")));
        };

        self.store().save_tracked(community, &tracked).await?;
        self.cleanup_artifacts(community, &record).await;

        Ok(format!("'{}' is no longer tracked.", record.display_name))
    }

    /// Change which artifacts are maintained for a creator.
    pub async fn set_presentation_mode(
        &self,
        community: &str,
        handle: &str,
        mode: PresentationMode,
    ) -> Result<String> {
        let key = handle.to_lowercase();
        let mut tracked = self.store().load_tracked(community).await?;
        let Some(record) = tracked.get_mut(&key) else {
            return Err(Error::validation(format!("'{handle}' is not tracked")));
        };
        if mode.uses_channel() && record.status_channel_id.is_none() {
            return Err(Error::validation(
                "channel mode requires a status channel to post into",
            ));
        }

        record.presentation_mode = mode;
        let display_name = record.display_name.clone();
        self.store().save_tracked(community, &tracked).await?;

        if let Err(e) = self.reconcile_now(community, &key).await {
            warn!("reconciliation after mode change for '{key}' failed: {e}");
        }

        Ok(format!(
            "Presentation mode for '{display_name}' is now {}.",
            mode.as_str()
        ))
    }

    /// Flip the opt-in notification role for a member. Exposed to the
    /// console's per-streamer notification toggle.
    pub async fn toggle_notification_role(
        &self,
        community: &str,
        handle: &str,
        user_id: &str,
    ) -> Result<String> {
        let key = handle.to_lowercase();
        let tracked = self.store().load_tracked(community).await?;
        let Some(record) = tracked.get(&key) else {
            return Err(Error::validation(format!("'{handle}' is not tracked")));
        };
        let Some(role_id) = record.notification_role_id.clone() else {
            return Err(Error::validation(format!(
                "no notification role is configured for '{}'",
                record.display_name
            )));
        };

        let member = self.api().get_member(community, user_id).await?;
        if member.has_role(&role_id) {
            self.api()
                .remove_member_role(community, user_id, &role_id)
                .await?;
            Ok(format!(
                "Notifications for '{}' are now off.",
                record.display_name
            ))
        } else {
            self.api()
                .add_member_role(community, user_id, &role_id)
                .await?;
            Ok(format!(
                "Notifications for '{}' are now on.",
                record.display_name
            ))
        }
    }

    /// Pre-announce a future broadcast.
    pub async fn schedule_stream(
        &self,
        community: &str,
        handle: &str,
        scheduled_time: DateTime<Utc>,
        title: &str,
    ) -> Result<String> {
        let planned = self
            .planner
            .schedule(community, handle, scheduled_time, title)
            .await?;
        Ok(format!(
            "Planned stream for '{}' at {}.",
            planned.handle,
            planned.scheduled_time.format("%Y-%m-%d %H:%M UTC")
        ))
    }

    /// Cancel a pre-announced broadcast.
    pub async fn cancel_stream(&self, community: &str, handle: &str) -> Result<String> {
        self.planner.cancel(community, handle).await?;
        Ok(format!("Planned stream for '{handle}' was cancelled."))
    }

    async fn cleanup_artifacts(&self, community: &str, record: &TrackedStreamer) {
        if let Some(message_ref) = &record.message_ref {
            let outcome = match &message_ref.thread_id {
                Some(thread_id) => self.api().delete_channel(thread_id).await,
                None => {
                    self.api()
                        .delete_message(&message_ref.channel_id, &message_ref.message_id)
                        .await
                }
            };
            if let Err(e) = outcome {
                debug!("announcement cleanup for '{}': {e}", record.handle);
            }
        }
        if let Some(event_ref) = &record.event_ref
            && let Err(e) = self
                .api()
                .delete_scheduled_event(community, &event_ref.event_id)
                .await
        {
            debug!("event cleanup for '{}': {e}", record.handle);
        }
    }
}
