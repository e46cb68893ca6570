use thiserror::Error;

/// Main error type for the projection service
#[derive(Error, Debug)]
pub enum SlatecastError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exhausted for provider: {provider}")]
    RateLimitExhausted { provider: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Provider errors: a failed provider degrades one signal, never a request
    #[error("Provider unavailable: {provider} - {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    // Request validation errors: reject the whole request, no partial processing
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Usage accounting errors: logged at the write site, never propagated
    #[error("Usage tracking write failure: {0}")]
    TrackingWriteFailure(String),

    #[error("Slate error: {0}")]
    Slate(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for SlatecastError
pub type Result<T> = std::result::Result<T, SlatecastError>;

/// Specific error types for a single provider call
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Timeout after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status: {status}")]
    BadStatus { status: u16 },

    #[error("Response decode failed: {0}")]
    Decode(String),

    #[error("Provider not configured")]
    NotConfigured,
}

impl SlatecastError {
    /// Wrap a provider-level failure with the provider's name attached.
    pub fn provider_unavailable(provider: impl Into<String>, err: ProviderError) -> Self {
        SlatecastError::ProviderUnavailable {
            provider: provider.into(),
            reason: err.to_string(),
        }
    }
}
