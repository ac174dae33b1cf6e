//! Embed and announcement builders.
//!
//! One place for the visual shape of everything the engine posts, so the
//! adapters stay focused on lifecycle.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::{LivePayload, OfflinePayload};
use crate::domain::TrackedStreamer;

const LIVE_COLOR: u32 = 0x9146FF;
const OFFLINE_COLOR: u32 = 0x808080;

const THUMBNAIL_WIDTH: &str = "1280";
const THUMBNAIL_HEIGHT: &str = "720";

/// The ping line posted with a fresh announcement.
pub fn announcement_line(record: &TrackedStreamer) -> String {
    match &record.notification_role_id {
        Some(role_id) => format!("Hey <@&{role_id}>, {} is LIVE!", record.display_name),
        None => format!("{} is LIVE!", record.display_name),
    }
}

/// Embed shown while the creator is broadcasting.
pub fn live_embed(record: &TrackedStreamer, live: &LivePayload, now: DateTime<Utc>) -> Value {
    let url = record.stream_url();
    let title = if live.title.is_empty() {
        "Untitled broadcast".to_string()
    } else {
        live.title.clone()
    };

    let mut embed = json!({
        "title": title,
        "url": url,
        "color": LIVE_COLOR,
        "author": {
            "name": format!("{} is now live!", record.display_name),
            "url": url,
        },
        "fields": [
            {
                "name": "Category",
                "value": live.category.clone().unwrap_or_else(|| "Unknown".to_string()),
                "inline": true,
            },
            {
                "name": "Viewers",
                "value": live.viewer_count.to_string(),
                "inline": true,
            },
        ],
    });

    if let Some(avatar) = &record.profile_image_url {
        embed["author"]["icon_url"] = json!(avatar);
    }
    if let Some(template) = &live.thumbnail_url {
        embed["image"] = json!({ "url": thumbnail_url(template, now) });
    }
    if let Some(started_at) = live.started_at {
        embed["footer"] = json!({
            "text": format!("Live since {}", started_at.format("%H:%M UTC")),
        });
    }

    embed
}

/// Summary shown in channel mode once the broadcast ended.
pub fn offline_embed(record: &TrackedStreamer, offline: &OfflinePayload) -> Value {
    let url = record.stream_url();
    let mut embed = json!({
        "color": OFFLINE_COLOR,
        "description": format!("{} is currently offline.", record.display_name),
        "author": {
            "name": record.display_name,
            "url": url,
        },
        "fields": [
            {
                "name": "Last stream",
                "value": offline
                    .last_broadcast_at
                    .map(relative_timestamp)
                    .unwrap_or_else(|| "Unknown".to_string()),
                "inline": true,
            },
            {
                "name": "Last category",
                "value": offline
                    .last_category
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                "inline": true,
            },
        ],
    });

    if let Some(avatar) = &record.profile_image_url {
        embed["author"]["icon_url"] = json!(avatar);
    }

    embed
}

/// Description for the calendar event while live.
pub fn event_description(live: &LivePayload) -> String {
    let mut description = if live.title.is_empty() {
        "Live now".to_string()
    } else {
        live.title.clone()
    };
    if let Some(category) = &live.category {
        description.push_str(&format!(" — {category}"));
    }
    description.push_str(&format!(" ({} viewers)", live.viewer_count));
    description
}

/// Platform-rendered relative timestamp, e.g. "3 hours ago".
pub fn relative_timestamp(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}

/// Substitute the size placeholders of a thumbnail template and append a
/// cache-busting parameter so edits actually show a fresh frame.
fn thumbnail_url(template: &str, now: DateTime<Utc>) -> String {
    let url = template
        .replace("{width}", THUMBNAIL_WIDTH)
        .replace("{height}", THUMBNAIL_HEIGHT);
    format!("{url}?t={}", now.timestamp())
}
