//! Single-shot transport seam.
//!
//! A [`Transport`] sends one request and buffers the whole response body.
//! It knows nothing about caching, retries, or deadlines; the client layers
//! those on top.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;

use crate::error::TransportError;

/// One outgoing request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Resolved URL; may be relative to the page origin.
    pub url: String,
    /// Final header set.
    pub headers: HeaderMap,
    /// Serialized body.
    pub body: Option<String>,
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single request.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Sends `request` and returns the buffered response.
    ///
    /// Non-2xx statuses are responses, not errors.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(304, "").is_success());
        assert!(!TransportResponse::new(404, "missing").is_success());
        assert!(!TransportResponse::new(500, "").is_success());
    }
}
