//! Listing history snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical snapshot of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Backend identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Listing identifier.
    #[serde(default)]
    pub asin_id: Option<i64>,
    /// Buybox price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Best-seller rank.
    #[serde(default)]
    pub bsr: Option<i64>,
    /// BSR category.
    #[serde(default)]
    pub bsr_category: Option<String>,
    /// BSR subcategory.
    #[serde(default)]
    pub bsr_subcategory: Option<String>,
    /// Rank within the subcategory.
    #[serde(default)]
    pub bsr_subcategory_rank: Option<i64>,
    /// Inventory count.
    #[serde(default)]
    pub inventory: Option<i64>,
    /// Hash of the main image.
    #[serde(default)]
    pub image_md5: Option<String>,
    /// Hash of the A+ content.
    #[serde(default)]
    pub aplus_md5: Option<String>,
    /// Total number of reviews.
    #[serde(default)]
    pub total_reviews: Option<i64>,
    /// Average star rating.
    #[serde(default)]
    pub avg_rating: Option<f64>,
    /// Product title.
    #[serde(default)]
    pub title: Option<String>,
    /// Bullet points text.
    #[serde(default)]
    pub bullet_points: Option<String>,
    /// Snapshot time (ISO 8601).
    pub snapshot_at: String,
}

/// A chart point derived from a [`HistoryRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// Snapshot time (ISO 8601).
    pub timestamp: String,
    /// Buybox price.
    pub price: Option<f64>,
    /// Best-seller rank.
    pub bsr: Option<i64>,
    /// Inventory count.
    pub inventory: Option<i64>,
}

impl HistoryPoint {
    /// Parses the timestamp as RFC 3339.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
