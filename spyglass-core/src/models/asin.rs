//! Monitored listing (ASIN) types.
//!
//! - [`AsinRecord`] - Listing as returned by the backend
//! - [`AsinItem`] - Display record used by views
//! - [`CreateAsinRequest`] / [`UpdateAsinRequest`] - Write bodies
//! - [`MonitorConfig`] - Per-listing alert switches and thresholds

use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Record
// ============================================================================

/// A monitored listing with its latest snapshot metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsinRecord {
    /// Backend identifier.
    pub id: i64,
    /// Amazon Standard Identification Number.
    pub asin: String,
    /// Marketplace code (US, UK, DE, JP, ...).
    #[serde(default)]
    pub site: String,
    /// Optional user-chosen nickname.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Minimum inventory before an alert fires.
    #[serde(default)]
    pub inventory_threshold: Option<i64>,
    /// Brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Group this listing belongs to.
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Name of the group.
    #[serde(default)]
    pub group_name: Option<String>,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp (ISO 8601).
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Latest buybox price.
    #[serde(default)]
    pub last_price: Option<f64>,
    /// Latest best-seller rank.
    #[serde(default)]
    pub last_bsr: Option<i64>,
    /// Latest inventory count.
    #[serde(default)]
    pub last_inventory: Option<i64>,
    /// Total number of reviews.
    #[serde(default)]
    pub total_reviews: Option<i64>,
    /// Average star rating.
    #[serde(default)]
    pub avg_rating: Option<f64>,
}

// ============================================================================
// Display Record
// ============================================================================

/// A listing ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsinItem {
    /// Backend identifier.
    pub id: i64,
    /// ASIN code.
    pub asin: String,
    /// Marketplace code.
    pub site: String,
    /// Nickname when set, otherwise the ASIN code.
    pub display_name: String,
    /// Brand name.
    pub brand: Option<String>,
    /// Group identifier.
    pub group_id: Option<i64>,
    /// Group name.
    pub group_name: Option<String>,
    /// Minimum inventory before an alert fires.
    pub inventory_threshold: Option<i64>,
    /// Latest buybox price.
    pub price: Option<f64>,
    /// Latest best-seller rank.
    pub bsr: Option<i64>,
    /// Latest inventory count.
    pub inventory: Option<i64>,
    /// Total number of reviews.
    pub total_reviews: Option<i64>,
    /// Average star rating.
    pub avg_rating: Option<f64>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

impl AsinItem {
    /// Returns true if inventory is known and below the configured threshold.
    pub fn is_below_threshold(&self) -> bool {
        matches!(
            (self.inventory, self.inventory_threshold),
            (Some(inventory), Some(threshold)) if inventory < threshold
        )
    }
}

// ============================================================================
// Write Bodies
// ============================================================================

/// Alert switches and thresholds for a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Alert on price changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_price_alert: Option<bool>,
    /// Price change threshold in percent (5 means +/-5%).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_threshold: Option<f64>,
    /// Alert on best-seller rank changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_bsr_alert: Option<bool>,
    /// BSR change threshold in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bsr_change_threshold: Option<f64>,
    /// Alert on inventory changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_inventory_alert: Option<bool>,
    /// Absolute inventory change that triggers an alert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_change_threshold: Option<i64>,
    /// Minimum inventory before an alert fires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_threshold: Option<i64>,
    /// Alert on new negative reviews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_negative_review_alert: Option<bool>,
    /// Star rating at or below which a review counts as negative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_review_rating_threshold: Option<u8>,
    /// Alert on title changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_title_change_alert: Option<bool>,
    /// Alert on main image changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_main_image_change_alert: Option<bool>,
    /// Alert on bullet point changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_bullet_points_change_alert: Option<bool>,
    /// Alert on A+ content changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_aplus_content_change_alert: Option<bool>,
}

/// Body for creating a monitored listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsinRequest {
    /// ASIN code (required).
    pub asin: String,
    /// Marketplace code (required).
    pub site: String,
    /// Optional nickname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Optional group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    /// Optional brand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Optional alert configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_config: Option<MonitorConfig>,
}

impl CreateAsinRequest {
    /// Creates a request with just the required fields.
    pub fn new(asin: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            asin: asin.into(),
            site: site.into(),
            nickname: None,
            group_id: None,
            brand: None,
            monitor_config: None,
        }
    }
}

/// Body for updating a monitored listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsinRequest {
    /// New nickname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// New group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    /// New brand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// New alert configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_config: Option<MonitorConfig>,
}
