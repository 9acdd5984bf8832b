//! Error types for credential loading, storage and exchange.

use std::io;
use std::path::PathBuf;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while obtaining or using a cached OAuth2 token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The current user's home directory could not be determined.
    #[error("Unable to determine the current user's home directory")]
    UserResolution,

    /// No usable cache file at the given path.
    #[error("No cached token at {}: {source}", path.display())]
    CacheMiss {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cache content is not a valid token record.
    #[error("Malformed token record: {0}")]
    MalformedRecord(String),

    /// Token record could not be serialized.
    #[error("Unable to encode token record: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Token cache file could not be created or written.
    #[error("Unable to cache oauth token at {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Authorization code could not be read from the operator.
    #[error("Unable to read authorization code: {0}")]
    Input(#[source] io::Error),

    /// Authorization code exchange failed.
    #[error("Unable to retrieve token from web: {0}")]
    Exchange(String),

    /// Client secret blob is not a valid configuration.
    #[error("Unable to parse client secret file to config: {0}")]
    ConfigParse(String),

    /// Client secret file could not be read.
    #[error("Unable to read client secret file {}: {source}", path.display())]
    SecretFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Access token refresh failed.
    #[error("Token refresh failed: {0}")]
    Refresh(String),

    /// Authenticated request failed.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl AuthError {
    /// Whether this error means "no usable cached token" and should
    /// fall back to the interactive flow.
    pub fn is_cache_fallback(&self) -> bool {
        matches!(self, Self::CacheMiss { .. } | Self::MalformedRecord(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Http(e.to_string())
    }
}
