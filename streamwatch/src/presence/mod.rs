//! The stream presence engine.
//!
//! Compares freshly fetched platform truth against stored state and applies
//! the minimal side effects through the enabled presentation adapters.

pub mod adapters;
pub mod admin;
pub mod embeds;
pub mod planner;
mod reconciler;
pub mod recovery;
pub mod scheduler;
pub mod service;
pub mod source;

pub use planner::Planner;
pub use reconciler::Reconciler;
pub use scheduler::PollScheduler;
pub use service::{Engine, EngineConfig};
pub use source::{HelixStatusSource, StatusCheck, StatusSource};

use chrono::{DateTime, Utc};

/// Fetched live metadata driving activation and refresh.
#[derive(Debug, Clone)]
pub struct LivePayload {
    pub title: String,
    pub category: Option<String>,
    pub viewer_count: u64,
    pub thumbnail_url: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Fetched offline metadata driving the deactivation summary.
#[derive(Debug, Clone)]
pub struct OfflinePayload {
    pub last_category: Option<String>,
    pub last_broadcast_at: Option<DateTime<Utc>>,
}
