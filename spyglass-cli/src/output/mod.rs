//! Output formatting for CLI.
//!
//! Commands assemble view models from mapped display records; the text and
//! JSON formatters only render them.

mod json;
mod text;

use std::collections::HashMap;

use serde::Serialize;
use spyglass_core::{AlertItem, AsinItem, HistoryPoint, PageEnvelope, ReviewItem};

pub use json::JsonFormatter;
pub use text::TextFormatter;

// ============================================================================
// View Models
// ============================================================================

/// One dashboard row: a listing and how many recent alerts it has.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    /// The listing.
    #[serde(flatten)]
    pub listing: AsinItem,
    /// Recent alerts for this listing; `None` when alerts failed to load.
    pub alert_count: Option<usize>,
    /// Inventory is below the configured threshold.
    pub below_threshold: bool,
}

/// The dashboard: one page of listings with alert counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Listing rows in server order.
    pub rows: Vec<DashboardRow>,
    /// Total listings across pages.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Number of pages.
    pub total_pages: u32,
    /// Why alert counts are missing, if they are.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts_error: Option<String>,
}

impl DashboardView {
    /// Joins a listing page with the recent alert log.
    pub fn build(listings: PageEnvelope<AsinItem>, alerts: Result<Vec<AlertItem>, String>) -> Self {
        let (counts, alerts_error) = match alerts {
            Ok(alerts) => {
                let mut counts: HashMap<i64, usize> = HashMap::new();
                for alert in &alerts {
                    *counts.entry(alert.asin_id).or_default() += 1;
                }
                (Some(counts), None)
            }
            Err(err) => (None, Some(err)),
        };

        let rows = listings
            .items
            .into_iter()
            .map(|listing| DashboardRow {
                alert_count: counts
                    .as_ref()
                    .map(|c| c.get(&listing.id).copied().unwrap_or(0)),
                below_threshold: listing.is_below_threshold(),
                listing,
            })
            .collect();

        Self {
            rows,
            total: listings.total,
            page: listings.page.saturating_add(1),
            total_pages: listings.total_pages,
            alerts_error,
        }
    }
}

/// A detail-page section that loads independently of the others.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "data")]
pub enum Section<T> {
    /// Loaded.
    Loaded(T),
    /// Failed with this message.
    Failed(String),
}

impl<T> Section<T> {
    /// Wraps a load result.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

/// Everything about one listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    /// The listing.
    pub listing: AsinItem,
    /// History range shown, e.g. `30d`.
    pub range: String,
    /// Snapshot history, oldest first.
    pub history: Section<Vec<HistoryPoint>>,
    /// Recent alerts.
    pub alerts: Section<PageEnvelope<AlertItem>>,
    /// Negative reviews.
    pub reviews: Section<PageEnvelope<ReviewItem>>,
}
