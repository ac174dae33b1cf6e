//! The presence engine service: wires the store, the upstream source, and
//! the reconciler together, and drives one full poll tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::planner::Planner;
use super::reconciler::Reconciler;
use super::recovery;
use super::source::StatusSource;
use crate::discord::DiscordApi;
use crate::error::{Error, Result};
use crate::store::GuildStore;

/// Engine tuning knobs, derived from the application config.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum time between in-place content updates while live.
    pub refresh_interval: chrono::Duration,
    /// Delay inserted between streamers within a tick to bound the outbound
    /// request rate.
    pub pacing_delay: Duration,
}

impl EngineConfig {
    pub fn from_app(config: &crate::config::Config) -> Self {
        Self {
            refresh_interval: chrono::Duration::from_std(config.refresh_interval)
                .unwrap_or_else(|_| chrono::Duration::seconds(300)),
            pacing_delay: config.pacing_delay,
        }
    }
}

pub struct Engine {
    store: Arc<GuildStore>,
    api: Arc<dyn DiscordApi>,
    pub(crate) source: Arc<dyn StatusSource>,
    pub(crate) planner: Arc<Planner>,
    reconciler: Reconciler,
    pacing_delay: Duration,
}

impl Engine {
    pub fn new(
        store: Arc<GuildStore>,
        source: Arc<dyn StatusSource>,
        api: Arc<dyn DiscordApi>,
        config: EngineConfig,
    ) -> Self {
        let planner = Arc::new(Planner::new(store.clone(), api.clone()));
        let reconciler = Reconciler::new(
            source.clone(),
            api.clone(),
            planner.clone(),
            config.refresh_interval,
        );
        Self {
            store,
            api,
            source,
            planner,
            reconciler,
            pacing_delay: config.pacing_delay,
        }
    }

    pub fn store(&self) -> &GuildStore {
        &self.store
    }

    pub(crate) fn api(&self) -> &dyn DiscordApi {
        self.api.as_ref()
    }

    /// Validate stored artifact references against the platform. Runs once
    /// per startup, before the first tick.
    pub async fn recover(&self) -> Result<()> {
        recovery::validate_artifacts(&self.store, self.api.as_ref()).await
    }

    /// Run one full poll tick across all communities.
    ///
    /// Streamers are processed sequentially with a pacing delay; each record
    /// is persisted immediately after its reconciliation so a crash loses at
    /// most one streamer's update. A missing app token skips the remainder
    /// of the tick; any other error defers only the affected streamer.
    pub async fn run_tick(&self, token: &CancellationToken) -> Result<()> {
        for community in self.store.communities().await? {
            if token.is_cancelled() {
                return Ok(());
            }

            let mut tracked = match self.store.load_tracked(&community).await {
                Ok(tracked) => tracked,
                Err(e) => {
                    warn!("skipping community {community}: {e}");
                    continue;
                }
            };

            let handles: Vec<String> = tracked.keys().cloned().collect();
            for handle in handles {
                if token.is_cancelled() {
                    return Ok(());
                }
                let Some(record) = tracked.get_mut(&handle) else {
                    continue;
                };

                match self.reconciler.reconcile(&community, record).await {
                    Ok(()) => {}
                    Err(e) if e.is_auth() => {
                        warn!("no usable upstream credentials, skipping the rest of this tick: {e}");
                        return Ok(());
                    }
                    Err(e) => {
                        warn!("deferring '{handle}' in {community} to the next tick: {e}");
                    }
                }

                // Persist per streamer, not per community.
                self.store.save_tracked(&community, &tracked).await?;
                tokio::time::sleep(self.pacing_delay).await;
            }

            if let Err(e) = self.planner.sweep(&community, Utc::now()).await {
                warn!("planned-stream sweep failed for {community}: {e}");
            }
        }

        debug!("poll tick complete");
        Ok(())
    }

    /// Reconcile a single streamer immediately, outside the poll cadence.
    /// Used by the admin entry points so the console reflects reality
    /// without waiting for the next tick.
    pub async fn reconcile_now(&self, community: &str, handle: &str) -> Result<()> {
        let key = handle.to_lowercase();
        let mut tracked = self.store.load_tracked(community).await?;
        let Some(record) = tracked.get_mut(&key) else {
            return Err(Error::validation(format!("'{handle}' is not tracked")));
        };

        let outcome = self.reconciler.reconcile(community, record).await;
        self.store.save_tracked(community, &tracked).await?;
        outcome
    }
}
