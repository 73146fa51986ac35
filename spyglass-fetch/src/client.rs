//! Request orchestrator.
//!
//! [`ApiClient::request`] resolves the URL, answers from the GET cache when
//! it can, and otherwise runs the attempt state machine from
//! [`crate::retry`]: every attempt is bounded by a deadline, server errors
//! and network failures back off and try again, and everything else ends
//! the call with one typed [`FetchError`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::base_url::{join_url, resolve_base_url};
use crate::cache::ResponseCache;
use crate::clock::{Clock, MonotonicClock, Sleeper, TokioSleeper};
use crate::error::{FetchError, TransportError};
use crate::events::{ApiEvent, EventSink, TracingSink};
use crate::http::ReqwestTransport;
use crate::retry::{AttemptOutcome, AttemptState, RetryPolicy};
use crate::settings::ClientSettings;
use crate::transport::{Transport, TransportRequest};

// ============================================================================
// Request Options
// ============================================================================

/// Per-call options. Unset fields fall back to the client's settings.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method; GET by default.
    pub method: Method,
    /// Extra headers; these override the JSON content type by name.
    pub headers: Vec<(String, String)>,
    /// Serialized request body.
    pub body: Option<String>,
    /// The caller handles failures itself and wants no user-facing notice.
    pub skip_error_toast: bool,
    /// Retries after the first attempt.
    pub retry_limit: Option<u32>,
    /// Per-attempt deadline.
    pub timeout: Option<Duration>,
    /// Lifetime of the cached response.
    pub cache_ttl: Option<Duration>,
    /// Read and write the cache; defaults to true for GET only.
    pub use_cache: Option<bool>,
}

impl RequestOptions {
    /// A GET request.
    pub fn get() -> Self {
        Self::default()
    }

    /// A request with the given method.
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a pre-serialized body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Encode`] if `body` does not serialize.
    pub fn json_body<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, FetchError> {
        let body = serde_json::to_string(body).map_err(FetchError::Encode)?;
        Ok(self.with_body(body))
    }

    /// Suppresses the user-facing failure notice.
    pub fn quiet(mut self) -> Self {
        self.skip_error_toast = true;
        self
    }

    /// Overrides the retry limit.
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = Some(retry_limit);
        self
    }

    /// Overrides the per-attempt deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the cache TTL.
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = Some(cache_ttl);
        self
    }

    /// Forces the cache on or off.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    /// Whether this call reads and writes the cache.
    pub fn uses_cache(&self) -> bool {
        self.use_cache.unwrap_or(self.method == Method::GET)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Cached, retrying JSON API client.
///
/// Cheap to clone; clones share the cache, transport, and sinks.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: String,
    settings: ClientSettings,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    events: Arc<dyn EventSink>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("settings", &self.inner.settings)
            .field("cached_entries", &self.inner.cache.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of one attempt, before the state machine decides what follows.
struct Attempt<T> {
    outcome: AttemptOutcome,
    status: Option<u16>,
    latency_ms: u64,
    result: Result<T, FetchError>,
}

impl ApiClient {
    /// Builds a client with production collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] if the HTTP transport cannot be
    /// built from `settings`.
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        Self::builder(settings).build()
    }

    /// Builds a client from environment settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] on bad settings.
    pub fn from_env() -> Result<Self, FetchError> {
        Self::new(ClientSettings::from_env()?)
    }

    /// Starts a builder.
    pub fn builder(settings: ClientSettings) -> ApiClientBuilder {
        ApiClientBuilder::new(settings)
    }

    /// The resolved base every path is joined onto.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The settings this client was built with.
    pub fn settings(&self) -> &ClientSettings {
        &self.inner.settings
    }

    /// Resolves `path` against the base URL.
    pub fn resolve_url(&self, path: &str) -> String {
        join_url(&self.inner.base_url, path)
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Issues a request and decodes the JSON response as `T`.
    ///
    /// An empty response body decodes as JSON `null`, so `()` and
    /// `Option<_>` work for endpoints that return nothing.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Api`] for a 4xx, or a 5xx once retries run out
    /// - [`FetchError::Timeout`] when an attempt's deadline elapses
    /// - [`FetchError::Network`] once retries run out on transport failures
    /// - [`FetchError::Decode`] when a 2xx body does not decode as `T`
    /// - [`FetchError::InvalidRequest`] for malformed headers or URLs
    #[instrument(skip(self, options), fields(method = %options.method, path = %path))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, FetchError> {
        let url = self.resolve_url(path);
        let use_cache = options.uses_cache();

        if use_cache {
            if let Some(payload) = self.inner.cache.get(&url) {
                self.inner.events.record(&ApiEvent::cache_hit(&url));
                return T::deserialize(&payload).map_err(|source| FetchError::Decode { url, source });
            }
        }

        self.run_attempts(url, &options, use_cache).await
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.request(path, RequestOptions::get()).await
    }

    /// POST `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`FetchError::Encode`].
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::method(Method::POST).json_body(body)?;
        self.request(path, options).await
    }

    /// PUT `body` as JSON to `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`FetchError::Encode`].
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::method(Method::PUT).json_body(body)?;
        self.request(path, options).await
    }

    /// DELETE `path`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<(), FetchError> {
        let _: Value = self.request(path, RequestOptions::method(Method::DELETE)).await?;
        Ok(())
    }

    // ========================================================================
    // Attempt loop
    // ========================================================================

    async fn run_attempts<T: DeserializeOwned>(
        &self,
        url: String,
        options: &RequestOptions,
        use_cache: bool,
    ) -> Result<T, FetchError> {
        let settings = &self.inner.settings;
        let policy = RetryPolicy {
            retry_limit: options.retry_limit.unwrap_or(settings.retry_limit),
            ..self.inner.policy
        };
        let timeout = options.timeout.unwrap_or(settings.timeout);
        let cache_ttl = use_cache.then(|| options.cache_ttl.unwrap_or(settings.cache_ttl));

        let request = TransportRequest {
            method: options.method.clone(),
            url,
            headers: build_headers(&options.headers)?,
            body: options.body.clone(),
        };

        let mut state = policy.start();
        let mut value = None;
        let mut last_error = None;

        loop {
            match state {
                AttemptState::Idle => state = policy.start(),
                AttemptState::Attempting(attempt) => {
                    let report = self.attempt::<T>(&request, timeout, cache_ttl).await;
                    state = policy.transition(state, report.outcome);
                    let will_retry = matches!(state, AttemptState::BackingOff { .. });

                    let mut event = attempt_event(&request.url, attempt, &report, will_retry);
                    if options.skip_error_toast && !will_retry {
                        event = event.quiet();
                    }
                    self.inner.events.record(&event);
                    match report.result {
                        Ok(decoded) => value = Some(decoded),
                        Err(err) => last_error = Some(err),
                    }
                }
                AttemptState::BackingOff { next, delay } => {
                    debug!(next_attempt = next, delay = ?delay, "Backing off");
                    self.inner.sleeper.sleep(delay).await;
                    state = AttemptState::Attempting(next);
                }
                AttemptState::Succeeded => return value.ok_or(FetchError::Unknown),
                AttemptState::Failed => return Err(last_error.unwrap_or(FetchError::Unknown)),
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        request: &TransportRequest,
        timeout: Duration,
        cache_ttl: Option<Duration>,
    ) -> Attempt<T> {
        let started = self.inner.clock.now_millis();
        let sent = tokio::time::timeout(timeout, self.inner.transport.send(request.clone())).await;
        let latency_ms = self.inner.clock.now_millis().saturating_sub(started);

        let (outcome, status, result) = match sent {
            Err(_) | Ok(Err(TransportError::Cancelled)) => (
                AttemptOutcome::TimedOut,
                None,
                Err(FetchError::Timeout {
                    url: request.url.clone(),
                    timeout,
                }),
            ),
            Ok(Err(TransportError::Network(message))) => {
                (AttemptOutcome::Network, None, Err(FetchError::Network(message)))
            }
            Ok(Err(TransportError::InvalidRequest(message))) => (
                AttemptOutcome::Invalid,
                None,
                Err(FetchError::InvalidRequest(message)),
            ),
            Ok(Ok(response)) if !response.is_success() => (
                AttemptOutcome::Status(response.status),
                Some(response.status),
                Err(FetchError::Api {
                    status: response.status,
                    body: response.body,
                }),
            ),
            Ok(Ok(response)) => match decode_body::<T>(&response.body) {
                Ok((decoded, payload)) => {
                    if let Some(ttl) = cache_ttl {
                        self.inner.cache.insert(request.url.clone(), payload, ttl);
                    }
                    (AttemptOutcome::Success, Some(response.status), Ok(decoded))
                }
                Err(source) => (
                    AttemptOutcome::Decode,
                    Some(response.status),
                    Err(FetchError::Decode {
                        url: request.url.clone(),
                        source,
                    }),
                ),
            },
        };

        Attempt {
            outcome,
            status,
            latency_ms,
            result,
        }
    }
}

fn attempt_event<T>(url: &str, attempt: u32, report: &Attempt<T>, will_retry: bool) -> ApiEvent {
    match &report.result {
        Ok(_) => ApiEvent::ok(url, report.status.unwrap_or(200), attempt, report.latency_ms),
        Err(FetchError::Api { status, body }) => {
            ApiEvent::api_error(url, *status, body, attempt, report.latency_ms, will_retry)
        }
        Err(err) => ApiEvent::network_error(url, &err.to_string(), attempt, will_retry),
    }
}

/// Decodes a 2xx body, keeping the raw JSON for the cache.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<(T, Value), serde_json::Error> {
    let payload = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)?
    };
    let decoded = T::deserialize(&payload)?;
    Ok((decoded, payload))
}

/// JSON content type first, then caller headers on top.
fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::InvalidRequest(format!("header name {name:?}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidRequest(format!("header {name}: {e}")))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles an [`ApiClient`] with injectable collaborators.
#[derive(Debug)]
pub struct ApiClientBuilder {
    settings: ClientSettings,
    policy: Option<RetryPolicy>,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    events: Option<Arc<dyn EventSink>>,
}

impl ApiClientBuilder {
    /// Starts from `settings` with production defaults for everything else.
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            policy: None,
            transport: None,
            clock: None,
            sleeper: None,
            events: None,
        }
    }

    /// Uses a custom backoff schedule. The retry limit still comes from the
    /// settings unless a request overrides it.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Uses a custom transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses a custom clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Uses a custom sleeper.
    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Uses a custom event sink.
    pub fn events(mut self, events: impl EventSink + 'static) -> Self {
        self.events = Some(Arc::new(events));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] if the default transport cannot
    /// be built or the page origin is not an absolute URL.
    pub fn build(self) -> Result<ApiClient, FetchError> {
        let settings = self.settings;
        let base_url = resolve_base_url(&settings.base_url, settings.page_origin.as_deref());
        debug!(configured = %settings.base_url, resolved = %base_url, "Resolved API base URL");

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(default_transport(&settings)?),
        };
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::default()));
        let policy = RetryPolicy {
            retry_limit: settings.retry_limit,
            ..self.policy.unwrap_or_default()
        };

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                base_url,
                policy,
                transport,
                cache: ResponseCache::new(Arc::clone(&clock)),
                clock,
                sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
                events: self.events.unwrap_or_else(|| Arc::new(TracingSink)),
                settings,
            }),
        })
    }
}

fn default_transport(settings: &ClientSettings) -> Result<ReqwestTransport, FetchError> {
    let invalid = |e: TransportError| FetchError::InvalidConfig(e.to_string());
    let transport = ReqwestTransport::new().map_err(invalid)?;
    match settings.page_origin.as_deref() {
        Some(origin) => transport.with_origin(origin).map_err(invalid),
        None => Ok(transport),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_options_defaults() {
        let get = RequestOptions::get();
        assert_eq!(get.method, Method::GET);
        assert!(get.uses_cache());
        assert!(!get.skip_error_toast);

        let post = RequestOptions::method(Method::POST);
        assert!(!post.uses_cache());
        assert!(post.with_cache(true).uses_cache());
        assert!(!RequestOptions::get().with_cache(false).uses_cache());
    }

    #[test]
    fn test_json_body() {
        let options = RequestOptions::method(Method::PUT)
            .json_body(&serde_json::json!({"name": "Lamps"}))
            .unwrap();
        assert_eq!(options.body.as_deref(), Some(r#"{"name":"Lamps"}"#));
    }

    #[test]
    fn test_caller_headers_override_content_type() {
        let headers = build_headers(&[
            ("content-type".to_string(), "text/plain".to_string()),
            ("X-Trace".to_string(), "abc".to_string()),
        ])
        .unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-trace").unwrap(), "abc");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_bad_header_is_invalid_request() {
        let err = build_headers(&[("bad header".to_string(), "x".to_string())]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }

    #[test]
    fn test_decode_body() {
        let (items, raw): (Vec<u32>, Value) = decode_body("[1,2]").unwrap();
        assert_eq!(items, vec![1, 2]);
        assert_eq!(raw, serde_json::json!([1, 2]));

        let ((), raw) = decode_body::<()>("  ").unwrap();
        assert_eq!(raw, Value::Null);

        assert!(decode_body::<Vec<u32>>("{oops").is_err());
        assert!(decode_body::<Vec<u32>>(r#"{"a":1}"#).is_err());
    }

    #[test]
    fn test_builder_resolves_base_url() {
        let settings = ClientSettings::default()
            .with_base_url("http://shcamz.xyz:8081/api")
            .with_page_origin("https://dash.example.com");
        let client = ApiClient::new(settings).unwrap();

        assert_eq!(client.base_url(), "");
        assert_eq!(client.resolve_url("/api/asin"), "/api/asin");
    }
}
