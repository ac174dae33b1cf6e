//! Upstream status source seam.

use async_trait::async_trait;
use helix_api::{HelixClient, Identity, StreamStatus};

use crate::domain::TrackedStreamer;
use crate::error::Result;

/// Outcome of one status check.
#[derive(Debug, Clone)]
pub enum StatusCheck {
    /// The creator is no longer resolvable on the platform.
    NotFound,
    /// The creator exists; carries the refreshed identity and live status.
    Found {
        identity: Identity,
        status: StreamStatus,
    },
}

/// Source of upstream truth. The engine depends on this trait so tests can
/// script statuses without a network.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Resolve a login name to an identity.
    async fn resolve(&self, login: &str) -> Result<Option<Identity>>;

    /// Check the current status of a tracked streamer.
    async fn check(&self, record: &TrackedStreamer) -> Result<StatusCheck>;
}

/// Production source backed by the Helix client.
pub struct HelixStatusSource {
    client: HelixClient,
}

impl HelixStatusSource {
    pub fn new(client: HelixClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for HelixStatusSource {
    async fn resolve(&self, login: &str) -> Result<Option<Identity>> {
        Ok(self.client.resolve(login).await?)
    }

    async fn check(&self, record: &TrackedStreamer) -> Result<StatusCheck> {
        let Some(identity) = self.client.resolve(&record.handle).await? else {
            return Ok(StatusCheck::NotFound);
        };
        let status = self.client.fetch_status(&identity).await?;
        Ok(StatusCheck::Found { identity, status })
    }
}
