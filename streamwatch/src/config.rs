//! Runtime configuration loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

const DEFAULT_DATA_DIR: &str = "data/guilds";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 180;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;
const DEFAULT_PACING_DELAY_MS: u64 = 1000;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Twitch application credentials for the client-credentials grant.
    pub twitch_client_id: String,
    pub twitch_client_secret: String,
    /// Bot token for the presentation platform.
    pub discord_bot_token: String,
    /// Root directory of the per-community JSON store.
    pub data_dir: PathBuf,
    /// Interval between poll ticks.
    pub poll_interval: Duration,
    /// Minimum time between in-place content updates while live.
    pub refresh_interval: Duration,
    /// Delay inserted between streamers within a tick.
    pub pacing_delay: Duration,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::config(format!("{key} is not set")))
        };
        let parsed = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| Error::config(format!("{key} must be a number, got '{raw}'"))),
                None => Ok(default),
            }
        };

        let poll_secs = parsed("STREAMWATCH_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        if poll_secs == 0 {
            return Err(Error::config("STREAMWATCH_POLL_INTERVAL_SECS must be positive"));
        }

        Ok(Self {
            twitch_client_id: required("TWITCH_CLIENT_ID")?,
            twitch_client_secret: required("TWITCH_CLIENT_SECRET")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            data_dir: lookup("STREAMWATCH_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            poll_interval: Duration::from_secs(poll_secs),
            refresh_interval: Duration::from_secs(parsed(
                "STREAMWATCH_REFRESH_INTERVAL_SECS",
                DEFAULT_REFRESH_INTERVAL_SECS,
            )?),
            pacing_delay: Duration::from_millis(parsed(
                "STREAMWATCH_PACING_DELAY_MS",
                DEFAULT_PACING_DELAY_MS,
            )?),
        })
    }
}
