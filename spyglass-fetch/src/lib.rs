// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Spyglass Fetch
//!
//! Resilient request pipeline for the Spyglass listing monitor.
//!
//! ## Request Pipeline
//!
//! [`ApiClient`] sits between callers and a single-shot [`Transport`]:
//!
//! - [`base_url`] - Reconciles the configured base with the page origin
//! - [`cache`] - GET responses cached per resolved URL with a TTL
//! - [`retry`] - Attempt state machine with exponential backoff
//! - [`events`] - Structured `api_ok` / `api_error` / `network_error` /
//!   `api_cache_hit` events
//!
//! ## Seams
//!
//! - [`Transport`] - [`ReqwestTransport`] in production, fakes in tests
//! - [`Clock`] / [`Sleeper`] - Manual time and instant backoff in tests
//! - [`EventSink`] - [`TracingSink`] in production, [`MemorySink`] in tests
//!
//! ## Endpoints
//!
//! [`SpyglassApi`] wraps the client with typed calls for listings, alerts,
//! reviews, history, and groups.
//!
//! ## Example
//!
//! ```ignore
//! use spyglass_fetch::{ApiClient, ClientSettings, SpyglassApi};
//!
//! let client = ApiClient::new(ClientSettings::from_env()?)?;
//! let api = SpyglassApi::new(client);
//!
//! let page = api.list_asins(0, 20, None).await?;
//! println!("{} listings", page.total);
//! ```

pub mod api;
pub mod base_url;
pub mod cache;
pub mod client;
pub mod clock;
pub mod error;
pub mod events;
pub mod http;
pub mod retry;
pub mod settings;
pub mod transport;

// Re-export key types at crate root

// Errors
pub use error::{FetchError, TransportError};

// Client
pub use client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use settings::ClientSettings;

// Endpoints
pub use api::{AlertQuery, HistoryRange, SpyglassApi};

// Seams
pub use clock::{Clock, InstantSleeper, ManualClock, MonotonicClock, Sleeper, TokioSleeper, TrackingSleeper};
pub use events::{ApiEvent, EventKind, EventSink, MemorySink, Severity, TracingSink};
pub use http::ReqwestTransport;
pub use transport::{Transport, TransportRequest, TransportResponse};

// Retry
pub use retry::{AttemptOutcome, AttemptState, RetryPolicy};

// Re-export the HTTP method type used in RequestOptions
pub use reqwest::Method;
