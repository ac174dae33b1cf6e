//! The poll scheduler: the outer fixed-interval loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::service::Engine;

pub struct PollScheduler {
    engine: Arc<Engine>,
    poll_interval: Duration,
    cancellation_token: CancellationToken,
}

impl PollScheduler {
    pub fn new(
        engine: Arc<Engine>,
        poll_interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            engine,
            poll_interval,
            cancellation_token,
        }
    }

    /// Run until cancelled. The first tick fires immediately.
    ///
    /// Ticks cannot overlap: the loop is sequential, and an overdue tick is
    /// skipped rather than queued. Cancellation is honored between items, so
    /// an in-flight streamer finishes before the loop stops.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("poll scheduler started (interval {:?})", self.poll_interval);

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    info!("poll scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.engine.run_tick(&self.cancellation_token).await {
                warn!("poll tick failed: {e}");
            }
        }
    }
}
