//! Twitch Helix client used by the presence engine.
//!
//! Covers the app-token credential flow (client-credentials grant) and the
//! handful of read endpoints needed to decide whether a tracked creator is
//! live: user resolution, stream status, and the channel/archive lookups
//! that decorate the offline state.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::{AccessToken, TokenManager};
pub use client::HelixClient;
pub use error::{HelixError, Result};
pub use models::{Identity, StreamStatus};
