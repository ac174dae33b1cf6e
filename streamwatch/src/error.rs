//! Application-wide error types.

use thiserror::Error;

use crate::discord::DiscordError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("upstream platform error: {0}")]
    Upstream(#[from] helix_api::HelixError),

    #[error("presentation platform error: {0}")]
    Discord(#[from] DiscordError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// True when our upstream credentials are unusable; the remainder of the
    /// poll tick cannot do authenticated work and should be skipped.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Upstream(e) if e.is_auth())
    }

    /// True when the action was denied by missing permissions on the
    /// presentation platform. The action is skipped, not retried.
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Discord(DiscordError::Forbidden))
    }

    /// True when the referenced presentation resource no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Discord(DiscordError::NotFound))
    }
}
