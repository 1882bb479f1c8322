//! Error types for inference providers.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during provider operations.
///
/// The fallback chain treats every variant the same way - the backend is
/// unavailable and the next tier is tried - but the messages stay distinct
/// for diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials not found for provider.
    #[error("credentials not found for provider: {0}")]
    CredentialsNotFound(String),

    /// Provider API returned an error or an unusable response.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// Request failed (connect error, timeout, TLS failure).
    #[error("request failed: {0}")]
    Request(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
