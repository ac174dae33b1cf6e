//! Presentation adapters.
//!
//! Each enabled presentation mode is realized by one adapter with the same
//! activate / refresh / deactivate surface, so the reconciler stays agnostic
//! to which artifacts a community maintains and a new mode never touches the
//! reconciliation core.

mod channel;
mod event;
mod forum;

pub use channel::ChannelAdapter;
pub use event::EventAdapter;
pub use forum::ForumAdapter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{LivePayload, OfflinePayload};
use crate::domain::{EventRef, TrackedStreamer};
use crate::error::Result;

/// Context for activation and refresh calls.
pub struct LiveContext<'a> {
    /// The community (guild) owning the streamer.
    pub community_id: &'a str,
    pub live: &'a LivePayload,
    /// Event reference claimed from a planned stream, if any.
    pub claimed_event: Option<&'a EventRef>,
    /// Whether this transition carries the one-time notification ping.
    pub announce: bool,
    pub now: DateTime<Utc>,
}

/// Context for deactivation calls.
pub struct OfflineContext<'a> {
    pub community_id: &'a str,
    pub offline: &'a OfflinePayload,
}

/// One strategy for realizing presence transitions.
///
/// Implementations maintain their own refs on the record; a call that fails
/// must leave the record in a state from which the next tick can recover
/// (recompute-idempotency, not exactly-once).
#[async_trait]
pub trait PresentationAdapter: Send + Sync {
    /// Adapter name for logs.
    fn kind(&self) -> &'static str;

    /// Realize an OFFLINE→LIVE transition.
    async fn activate(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()>;

    /// Update live artifacts in place; never pings.
    async fn refresh(&self, ctx: &LiveContext<'_>, record: &mut TrackedStreamer) -> Result<()>;

    /// Realize a LIVE→OFFLINE transition; best-effort, already-missing
    /// resources count as cleaned up.
    async fn deactivate(&self, ctx: &OfflineContext<'_>, record: &mut TrackedStreamer)
    -> Result<()>;
}
