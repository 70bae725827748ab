//! Error types for the Ladle voice gateway

use thiserror::Error;

/// Result type alias for Ladle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Cloud synthesis provider is not configured (missing credentials)
    ///
    /// Sticky: once observed, the cloud path is skipped for the rest of the
    /// session instead of re-attempting and re-failing.
    #[error("cloud synthesis not configured: {0}")]
    NotConfigured(String),

    /// Speech recognition error
    #[error("recognition error: {0}")]
    Recognition(String),

    /// Text-to-speech synthesis error
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Audio decode/playback error
    #[error("audio error: {0}")]
    Audio(String),

    /// Command dispatch error
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error means the cloud provider is permanently unavailable
    /// for the session, as opposed to a transient failure worth falling back from
    #[must_use]
    pub const fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}
