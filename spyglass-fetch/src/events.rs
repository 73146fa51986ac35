//! Structured request events.
//!
//! The client reports every cache hit, success, retry decision, and terminal
//! failure as an [`ApiEvent`]. Sinks only observe; nothing they do can
//! change the outcome of a request.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

// ============================================================================
// Event Types
// ============================================================================

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A successful response was decoded.
    Ok,
    /// The server answered with a non-2xx status.
    ApiError,
    /// The transport failed or timed out.
    NetworkError,
    /// A live cache entry answered the request.
    CacheHit,
}

impl EventKind {
    /// Returns the event name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ok => "api_ok",
            Self::ApiError => "api_error",
            Self::NetworkError => "network_error",
            Self::CacheHit => "api_cache_hit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// A failure the caller asked to keep quiet.
    Debug,
    /// Normal operation.
    Info,
    /// Something failed but the call may still succeed or is the caller's fault.
    Warn,
    /// Transport failure.
    Error,
}

/// One observation from the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEvent {
    /// What happened.
    pub kind: EventKind,
    /// How bad it is.
    pub severity: Severity,
    /// Resolved URL.
    pub url: String,
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// Zero-based attempt index, when an attempt was made.
    pub attempt: Option<u32>,
    /// Attempt latency in milliseconds.
    pub latency_ms: Option<u64>,
    /// Whether the client will try again.
    pub will_retry: Option<bool>,
    /// Response body text or error message.
    pub detail: Option<String>,
}

impl ApiEvent {
    fn new(kind: EventKind, severity: Severity, url: &str) -> Self {
        Self {
            kind,
            severity,
            url: url.to_string(),
            status: None,
            attempt: None,
            latency_ms: None,
            will_retry: None,
            detail: None,
        }
    }

    /// A cached payload answered the request.
    pub fn cache_hit(url: &str) -> Self {
        Self::new(EventKind::CacheHit, Severity::Info, url)
    }

    /// A response was received and decoded.
    pub fn ok(url: &str, status: u16, attempt: u32, latency_ms: u64) -> Self {
        Self {
            status: Some(status),
            attempt: Some(attempt),
            latency_ms: Some(latency_ms),
            ..Self::new(EventKind::Ok, Severity::Info, url)
        }
    }

    /// A non-2xx response was received.
    pub fn api_error(
        url: &str,
        status: u16,
        body: &str,
        attempt: u32,
        latency_ms: u64,
        will_retry: bool,
    ) -> Self {
        Self {
            status: Some(status),
            attempt: Some(attempt),
            latency_ms: Some(latency_ms),
            will_retry: Some(will_retry),
            detail: Some(body.to_string()),
            ..Self::new(EventKind::ApiError, Severity::Warn, url)
        }
    }

    /// The transport failed or the attempt timed out.
    pub fn network_error(url: &str, message: &str, attempt: u32, will_retry: bool) -> Self {
        Self {
            attempt: Some(attempt),
            will_retry: Some(will_retry),
            detail: Some(message.to_string()),
            ..Self::new(EventKind::NetworkError, Severity::Error, url)
        }
    }

    /// Lowers a failure to [`Severity::Debug`]; other events are unchanged.
    pub fn quiet(mut self) -> Self {
        if self.severity > Severity::Info {
            self.severity = Severity::Debug;
        }
        self
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Receives request events.
pub trait EventSink: Send + Sync + fmt::Debug {
    /// Records one event.
    fn record(&self, event: &ApiEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ApiEvent) {
        let ApiEvent {
            kind,
            severity,
            url,
            status,
            attempt,
            latency_ms,
            will_retry,
            detail,
        } = event;

        match severity {
            Severity::Debug => debug!(
                event = kind.name(),
                url = %url,
                status = ?status,
                attempt = ?attempt,
                will_retry = ?will_retry,
                detail = ?detail,
                "API event"
            ),
            Severity::Info => info!(
                event = kind.name(),
                url = %url,
                status = ?status,
                attempt = ?attempt,
                latency_ms = ?latency_ms,
                "API event"
            ),
            Severity::Warn => warn!(
                event = kind.name(),
                url = %url,
                status = ?status,
                attempt = ?attempt,
                latency_ms = ?latency_ms,
                will_retry = ?will_retry,
                detail = ?detail,
                "API event"
            ),
            Severity::Error => error!(
                event = kind.name(),
                url = %url,
                attempt = ?attempt,
                will_retry = ?will_retry,
                detail = ?detail,
                "API event"
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<ApiEvent>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events, oldest first.
    pub fn events(&self) -> Vec<ApiEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the kinds of all recorded events, oldest first.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(|e| e.kind).collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &ApiEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::Ok.name(), "api_ok");
        assert_eq!(EventKind::ApiError.name(), "api_error");
        assert_eq!(EventKind::NetworkError.name(), "network_error");
        assert_eq!(EventKind::CacheHit.to_string(), "api_cache_hit");
    }

    #[test]
    fn test_constructors_set_severity() {
        assert_eq!(ApiEvent::cache_hit("/api/x").severity, Severity::Info);
        assert_eq!(ApiEvent::ok("/api/x", 200, 0, 12).severity, Severity::Info);

        let retry = ApiEvent::api_error("/api/x", 503, "busy", 0, 5, true);
        assert_eq!(retry.severity, Severity::Warn);
        assert_eq!(retry.will_retry, Some(true));
        assert_eq!(retry.detail.as_deref(), Some("busy"));

        let network = ApiEvent::network_error("/api/x", "refused", 1, false);
        assert_eq!(network.severity, Severity::Error);
        assert_eq!(network.status, None);
    }

    #[test]
    fn test_quiet_lowers_only_failures() {
        let failure = ApiEvent::api_error("/api/x", 404, "", 0, 5, false).quiet();
        assert_eq!(failure.severity, Severity::Debug);
        assert_eq!(failure.kind, EventKind::ApiError);

        let ok = ApiEvent::ok("/api/x", 200, 0, 12).quiet();
        assert_eq!(ok.severity, Severity::Info);
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.record(&ApiEvent::cache_hit("/a"));
        sink.record(&ApiEvent::ok("/b", 200, 0, 1));
        assert_eq!(sink.kinds(), vec![EventKind::CacheHit, EventKind::Ok]);

        // Tracing sink never panics, with or without a subscriber.
        TracingSink.record(&ApiEvent::network_error("/c", "reset", 0, true));
    }
}
