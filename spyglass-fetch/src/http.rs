//! Production transport on top of `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::TransportError;
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// User agent string for Spyglass.
const USER_AGENT: &str = concat!("Spyglass/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Reqwest Transport
// ============================================================================

/// HTTP transport backed by a shared `reqwest::Client`.
///
/// Relative URLs (the same-origin `/api/...` form) are joined onto the
/// configured page origin before sending. Deadlines are not set here; the
/// client bounds every attempt itself.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
    origin: Option<Url>,
}

impl ReqwestTransport {
    /// Creates a transport with no page origin.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the HTTP client cannot
    /// be built (usually a broken TLS setup).
    pub fn new() -> Result<Self, TransportError> {
        let inner = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            inner,
            origin: None,
        })
    }

    /// Sets the origin that relative URLs are resolved against.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if `origin` is not an
    /// absolute URL.
    pub fn with_origin(mut self, origin: &str) -> Result<Self, TransportError> {
        let url = Url::parse(origin)
            .map_err(|e| TransportError::InvalidRequest(format!("page origin {origin:?}: {e}")))?;
        self.origin = Some(url);
        Ok(self)
    }

    /// Returns the underlying client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Turns a resolved URL into an absolute one.
    fn absolute_url(&self, url: &str) -> Result<Url, TransportError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin = self.origin.as_ref().ok_or_else(|| {
                    TransportError::InvalidRequest(format!(
                        "relative URL {url} needs a page origin"
                    ))
                })?;
                origin
                    .join(url)
                    .map_err(|e| TransportError::InvalidRequest(format!("{url}: {e}")))
            }
            Err(e) => Err(TransportError::InvalidRequest(format!("{url}: {e}"))),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self.absolute_url(&request.url)?;
        debug!(absolute = %url, "Sending request");

        let mut builder = self
            .inner
            .request(request.method, url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Response received");

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_pass_through() {
        let transport = ReqwestTransport::new().unwrap();
        let url = transport
            .absolute_url("http://localhost:8081/api/asin?page=0")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/api/asin?page=0");
    }

    #[test]
    fn test_relative_urls_join_the_origin() {
        let transport = ReqwestTransport::new()
            .unwrap()
            .with_origin("https://dash.example.com")
            .unwrap();
        let url = transport.absolute_url("/api/groups?page=0&size=100").unwrap();
        assert_eq!(url.as_str(), "https://dash.example.com/api/groups?page=0&size=100");
    }

    #[test]
    fn test_relative_url_without_origin_is_rejected() {
        let transport = ReqwestTransport::new().unwrap();
        let err = transport.absolute_url("/api/asin").unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_bad_origin_is_rejected() {
        let result = ReqwestTransport::new().unwrap().with_origin("not a url");
        assert!(result.is_err());
    }
}
