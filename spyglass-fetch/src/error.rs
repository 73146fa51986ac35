//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Terminal failure of one [`ApiClient::request`](crate::ApiClient::request) call.
///
/// Exactly one of these is surfaced per failed call. Retryable failures seen
/// along the way are logged, not returned.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status. 5xx responses only end up
    /// here once retries are exhausted.
    #[error("API request failed {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text, for diagnostics.
        body: String,
    },

    /// The per-attempt deadline elapsed. Never retried.
    #[error("Request to {url} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        /// Resolved URL.
        url: String,
        /// Deadline that elapsed.
        timeout: Duration,
    },

    /// Transport-level failure (DNS, connection refused, reset, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The response succeeded but its body did not decode. Never retried.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        /// Resolved URL.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request could not be built (bad URL, bad header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Core model error.
    #[error("Core error: {0}")]
    Core(#[from] spyglass_core::CoreError),

    /// The attempt loop ended without an outcome.
    #[error("Unknown error")]
    Unknown,
}

impl FetchError {
    /// Returns the HTTP status for [`FetchError::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the caller's deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true for a 4xx response.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns true for a 5xx response.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection-level failure; eligible for retry.
    #[error("Network error: {0}")]
    Network(String),

    /// The transport cancelled the call (its own deadline or an abort).
    #[error("Request cancelled")]
    Cancelled,

    /// The request could not be built; retrying cannot help.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Cancelled
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}
