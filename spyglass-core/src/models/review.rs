//! Review alert types.

use serde::{Deserialize, Serialize};

/// A negative-review alert as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// Backend identifier.
    pub id: i64,
    /// Listing identifier.
    pub asin_id: i64,
    /// Marketplace review identifier.
    #[serde(default)]
    pub review_id: String,
    /// Star rating.
    pub rating: u8,
    /// Date the review was posted.
    #[serde(default)]
    pub review_date: String,
    /// Review body.
    #[serde(default)]
    pub review_text: String,
    /// When the alert fired.
    #[serde(default)]
    pub alert_at: String,
}

/// A review ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    /// Backend identifier.
    pub id: i64,
    /// Listing identifier.
    pub asin_id: i64,
    /// Star rating.
    pub rating: u8,
    /// Review date (taken from `reviewDate`, not the alert time).
    pub created_at: String,
    /// Review body.
    pub text: String,
}
