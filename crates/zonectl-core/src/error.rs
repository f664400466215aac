//! Error types for zonectl
//!
//! Two layers live here:
//!
//! - [`ProviderError`]: the provider-neutral signal a [`DnsProvider`](crate::DnsProvider)
//!   returns when a remote call fails. Providers translate their wire errors into
//!   this set and nothing else.
//! - [`Error`]: everything that can go wrong around a reconciliation (validation,
//!   configuration, I/O, provider signals surfaced unclassified).
//!
//! Deciding whether a provider signal is fatal is the job of [`crate::classify`].

use thiserror::Error;

/// Result type alias for zonectl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Input failed validation before any provider call was made
    #[error("{0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider call failed and nobody classified it
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// File I/O errors (config and snapshot loading)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Provider-neutral failure signal from a remote DNS service
///
/// The variants are the distinctions the reconcilers care about. Anything a
/// provider cannot map onto one of them goes into [`ProviderError::Other`] with
/// as much of the original response as is available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The zone or record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The zone or record already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The request was rejected as invalid (bad name, bad value for the type)
    #[error("invalid request: {0}")]
    Invalid(String),

    /// The domain name is reserved or otherwise unavailable
    #[error("name not available: {0}")]
    ReservedName(String),

    /// The zone still contains user records
    #[error("container not empty: {0}")]
    NotEmpty(String),

    /// Anything else (transport failures, auth, rate limits, server errors)
    #[error("{message}")]
    Other {
        /// HTTP status or provider error code, when known
        code: Option<u16>,
        /// Provider-specific reason string, when known
        reason: Option<String>,
        /// Human-readable message
        message: String,
    },
}

impl ProviderError {
    /// Create an unclassified provider error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: None,
            reason: None,
            message: message.into(),
        }
    }

    /// Whether this is the "does not exist" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
