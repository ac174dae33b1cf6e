//! Error types for the Helix client.

use thiserror::Error;

/// Result type for Helix operations.
pub type Result<T> = std::result::Result<T, HelixError>;

/// Errors produced by the Helix client.
#[derive(Error, Debug)]
pub enum HelixError {
    /// Credentials are unusable: the token exchange failed, or the API kept
    /// rejecting a freshly acquired token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A single request was rejected as unauthorized. Handled internally by
    /// the one-shot token refresh; callers normally only see [`Self::Auth`].
    #[error("request was not authorized")]
    Unauthorized,

    /// The API answered with a non-success status.
    #[error("helix api error: status {status} - {message}")]
    Api { status: u16, message: String },

    /// Network-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HelixError {
    /// Check whether this error means our credentials are unusable.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Unauthorized)
    }
}
