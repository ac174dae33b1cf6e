//! Restart recovery.
//!
//! Runs once per process start, before the first poll tick. Every stored
//! artifact reference is probed against the platform; references to
//! resources deleted while we were down are cleared, turning the next tick
//! into a clean recreate instead of a repeated failed edit. `is_live` stays
//! untouched on purpose.

use tracing::{debug, info, warn};

use crate::discord::{DiscordApi, DiscordError};
use crate::error::Result;
use crate::store::GuildStore;

pub async fn validate_artifacts(store: &GuildStore, api: &dyn DiscordApi) -> Result<()> {
    for community in store.communities().await? {
        let mut tracked = match store.load_tracked(&community).await {
            Ok(tracked) => tracked,
            Err(e) => {
                warn!("skipping community {community} during recovery: {e}");
                continue;
            }
        };

        let handles: Vec<String> = tracked.keys().cloned().collect();
        for handle in handles {
            let Some(record) = tracked.get_mut(&handle) else {
                continue;
            };
            let mut changed = false;

            if let Some(message_ref) = record.message_ref.clone() {
                let probe = match &message_ref.thread_id {
                    Some(thread_id) => api.get_channel(thread_id).await.map(|_| ()),
                    None => api
                        .get_message(&message_ref.channel_id, &message_ref.message_id)
                        .await
                        .map(|_| ()),
                };
                match probe {
                    Ok(()) => {}
                    Err(DiscordError::NotFound) => {
                        info!("clearing dangling announcement ref for '{handle}' in {community}");
                        record.message_ref = None;
                        record.mark_refresh_due();
                        changed = true;
                    }
                    // Unknown state: leave the reference for the next tick.
                    Err(e) => debug!("could not validate announcement for '{handle}': {e}"),
                }
            }

            if let Some(event_ref) = record.event_ref.clone() {
                match api.get_scheduled_event(&community, &event_ref.event_id).await {
                    Ok(_) => {}
                    Err(DiscordError::NotFound) => {
                        info!("clearing dangling event ref for '{handle}' in {community}");
                        record.event_ref = None;
                        record.mark_refresh_due();
                        changed = true;
                    }
                    Err(e) => debug!("could not validate event for '{handle}': {e}"),
                }
            }

            if changed {
                store.save_tracked(&community, &tracked).await?;
            }
        }
    }
    Ok(())
}
