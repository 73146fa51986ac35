// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Spyglass Core
//!
//! Core types for the Spyglass listing monitor.
//!
//! This crate has no I/O. It provides:
//!
//! - Domain models for listings, alerts, reviews, history, and groups
//! - [`PageEnvelope`] and the page-response adapter ([`normalize`])
//! - The mapping layer from raw records to display records
//! - Error types
//!
//! ## Key Types
//!
//! ### Pagination
//! - [`PageEnvelope`] - Canonical paginated list
//! - [`normalize`] / [`normalize_as`] - Accept bare arrays or envelopes
//!
//! ### Records
//! - [`AsinRecord`] / [`AsinItem`] - Monitored listings
//! - [`AlertRecord`] / [`AlertItem`] - Alert log entries
//! - [`ReviewRecord`] / [`ReviewItem`] - Negative-review alerts
//! - [`HistoryRecord`] / [`HistoryPoint`] - Listing snapshots
//! - [`GroupRecord`] - Listing groups
//!
//! ### Mapping
//! - [`map_alert`], [`map_review`], [`map_history_point`], [`map_asin`]
//! - [`build_alert_message`], [`format_percent`]

pub mod error;
pub mod mapping;
pub mod models;
pub mod page;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Alerts
    AlertItem,
    AlertKind,
    AlertRecord,
    PercentValue,
    // Listings
    AsinItem,
    AsinRecord,
    CreateAsinRequest,
    MonitorConfig,
    UpdateAsinRequest,
    // Groups
    CreateGroupRequest,
    GroupRecord,
    UpdateGroupRequest,
    // History & reviews
    HistoryPoint,
    HistoryRecord,
    ReviewItem,
    ReviewRecord,
};

// Re-export pagination and mapping
pub use mapping::{
    build_alert_message, format_percent, map_alert, map_asin, map_history_point, map_review,
};
pub use page::{normalize, normalize_as, PageEnvelope};
