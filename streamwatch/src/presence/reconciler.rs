//! The reconciliation state machine.
//!
//! Compares one streamer's fetched status against its stored state and
//! applies the due transition through the enabled adapters. `is_live` flips
//! only after the side effects succeed, so a failed transition is retried on
//! the next tick instead of silently drifting.

use std::sync::Arc;

use chrono::Utc;
use helix_api::StreamStatus;
use tracing::{debug, info, warn};

use super::adapters::{
    ChannelAdapter, EventAdapter, ForumAdapter, LiveContext, OfflineContext, PresentationAdapter,
};
use super::planner::Planner;
use super::source::{StatusCheck, StatusSource};
use super::{LivePayload, OfflinePayload};
use crate::discord::DiscordApi;
use crate::domain::{ChannelKind, TrackedStreamer};
use crate::error::{Error, Result};

pub struct Reconciler {
    source: Arc<dyn StatusSource>,
    planner: Arc<Planner>,
    channel_adapter: ChannelAdapter,
    forum_adapter: ForumAdapter,
    event_adapter: EventAdapter,
    refresh_interval: chrono::Duration,
}

impl Reconciler {
    pub fn new(
        source: Arc<dyn StatusSource>,
        api: Arc<dyn DiscordApi>,
        planner: Arc<Planner>,
        refresh_interval: chrono::Duration,
    ) -> Self {
        Self {
            source,
            planner,
            channel_adapter: ChannelAdapter::new(api.clone()),
            forum_adapter: ForumAdapter::new(api.clone()),
            event_adapter: EventAdapter::new(api),
            refresh_interval,
        }
    }

    /// Adapters enabled for this streamer; the channel flavor follows the
    /// configured channel's type.
    fn adapters_for<'s>(&'s self, record: &TrackedStreamer) -> Vec<&'s dyn PresentationAdapter> {
        let mut adapters: Vec<&dyn PresentationAdapter> = Vec::new();
        if record.presentation_mode.uses_channel() {
            match record.channel_kind {
                ChannelKind::Forum => adapters.push(&self.forum_adapter),
                ChannelKind::Text => adapters.push(&self.channel_adapter),
            }
        }
        if record.presentation_mode.uses_event() {
            adapters.push(&self.event_adapter);
        }
        adapters
    }

    /// Drive one streamer through the state machine.
    ///
    /// Errors from the status fetch propagate so the caller can distinguish
    /// "skip the tick" (auth) from "defer this streamer" (transient). Adapter
    /// failures are absorbed here; they only hold back the state flip.
    pub async fn reconcile(&self, community: &str, record: &mut TrackedStreamer) -> Result<()> {
        let status = match self.source.check(record).await? {
            StatusCheck::NotFound => {
                warn!(
                    "creator '{}' is not resolvable upstream, leaving state untouched",
                    record.handle
                );
                return Ok(());
            }
            StatusCheck::Found { identity, status } => {
                // Keep presentation metadata current.
                record.display_name = identity.display_name;
                if identity.profile_image_url.is_some() {
                    record.profile_image_url = identity.profile_image_url;
                }
                status
            }
        };

        let now = Utc::now();
        match status {
            StreamStatus::Live {
                title,
                category,
                viewer_count,
                thumbnail_url,
                started_at,
            } => {
                let live = LivePayload {
                    title,
                    category,
                    viewer_count,
                    thumbnail_url,
                    started_at,
                };
                if record.is_live {
                    if !record.refresh_due(now, self.refresh_interval) {
                        return Ok(());
                    }
                    self.refresh(community, record, &live).await
                } else {
                    self.activate(community, record, &live).await
                }
            }
            StreamStatus::Offline {
                last_category,
                last_broadcast_at,
            } => {
                if !record.is_live {
                    return Ok(());
                }
                let offline = OfflinePayload {
                    last_category,
                    last_broadcast_at,
                };
                self.deactivate(community, record, &offline).await
            }
        }
    }

    async fn activate(
        &self,
        community: &str,
        record: &mut TrackedStreamer,
        live: &LivePayload,
    ) -> Result<()> {
        info!(
            "'{}' went live in {community}: {}",
            record.handle, live.title
        );

        let claimed = if record.presentation_mode.uses_event() {
            self.planner.claim(community, &record.handle).await?
        } else {
            None
        };

        let now = Utc::now();
        let ctx = LiveContext {
            community_id: community,
            live,
            claimed_event: claimed.as_ref(),
            announce: true,
            now,
        };

        let mut clean = true;
        for adapter in self.adapters_for(record) {
            let outcome = adapter.activate(&ctx, record).await;
            clean &= note_outcome("activate", adapter.kind(), &record.handle, outcome);
        }

        if clean {
            record.is_live = true;
            record.last_refreshed_at = Some(now);
        }
        Ok(())
    }

    async fn refresh(
        &self,
        community: &str,
        record: &mut TrackedStreamer,
        live: &LivePayload,
    ) -> Result<()> {
        debug!("refreshing live presentation for '{}'", record.handle);

        let now = Utc::now();
        let ctx = LiveContext {
            community_id: community,
            live,
            claimed_event: None,
            announce: false,
            now,
        };

        let mut clean = true;
        for adapter in self.adapters_for(record) {
            let outcome = adapter.refresh(&ctx, record).await;
            clean &= note_outcome("refresh", adapter.kind(), &record.handle, outcome);
        }

        if clean {
            record.last_refreshed_at = Some(now);
        }
        Ok(())
    }

    async fn deactivate(
        &self,
        community: &str,
        record: &mut TrackedStreamer,
        offline: &OfflinePayload,
    ) -> Result<()> {
        info!("'{}' went offline in {community}", record.handle);

        let ctx = OfflineContext {
            community_id: community,
            offline,
        };

        let mut clean = true;
        for adapter in self.adapters_for(record) {
            let outcome = adapter.deactivate(&ctx, record).await;
            clean &= note_outcome("deactivate", adapter.kind(), &record.handle, outcome);
        }

        if clean {
            record.is_live = false;
            record.mark_refresh_due();
        }
        Ok(())
    }
}

/// Log an adapter outcome and report whether the transition may complete.
///
/// Permission and configuration problems are skipped (retrying cannot fix
/// them); everything else is retriable and holds back the state flip.
fn note_outcome(action: &str, adapter: &'static str, handle: &str, outcome: Result<()>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) if e.is_permission() || matches!(e, Error::Validation(_)) => {
            warn!("{adapter} adapter skipped {action} for '{handle}': {e}");
            true
        }
        Err(e) => {
            warn!("{adapter} adapter failed {action} for '{handle}': {e}");
            false
        }
    }
}
