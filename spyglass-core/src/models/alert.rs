//! Alert types.
//!
//! - [`AlertRecord`] - Alert log entry as returned by the backend
//! - [`AlertItem`] - Display record with a human-readable message
//! - [`AlertKind`] - Known alert type codes
//! - [`PercentValue`] - Change percentage, sent as text or number

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Alert Kind
// ============================================================================

/// Alert type codes the dashboard knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// Buybox price moved.
    PriceChange,
    /// Inventory fell below the configured threshold.
    InventoryThreshold,
    /// Product title changed.
    Title,
    /// Main image changed.
    MainImage,
    /// Bullet points changed.
    BulletPoints,
    /// A+ content changed.
    AplusContent,
    /// A new low-rating review arrived.
    NegativeReview,
}

impl AlertKind {
    /// Looks up a kind from its wire code. Unknown codes return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.code() == code)
    }

    /// Returns the wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PriceChange => "PRICE_CHANGE",
            Self::InventoryThreshold => "INVENTORY_THRESHOLD",
            Self::Title => "TITLE",
            Self::MainImage => "MAIN_IMAGE",
            Self::BulletPoints => "BULLET_POINTS",
            Self::AplusContent => "APLUS_CONTENT",
            Self::NegativeReview => "NEGATIVE_REVIEW",
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PriceChange => "Price change",
            Self::InventoryThreshold => "Inventory below threshold",
            Self::Title => "Title change",
            Self::MainImage => "Main image change",
            Self::BulletPoints => "Bullet points change",
            Self::AplusContent => "A+ content change",
            Self::NegativeReview => "New negative review",
        }
    }

    /// Returns all known kinds.
    pub fn all() -> &'static [AlertKind] {
        &[
            Self::PriceChange,
            Self::InventoryThreshold,
            Self::Title,
            Self::MainImage,
            Self::BulletPoints,
            Self::AplusContent,
            Self::NegativeReview,
        ]
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Percent Value
// ============================================================================

/// A change percentage. Older endpoints send `"-10%"`, newer ones `-10.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentValue {
    /// Numeric percentage (25 means 25%).
    Number(f64),
    /// Preformatted text, with or without a `%` sign.
    Text(String),
}

impl From<f64> for PercentValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PercentValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// ============================================================================
// Raw Record
// ============================================================================

/// An alert log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// Backend identifier.
    pub id: i64,
    /// Listing identifier.
    pub asin_id: i64,
    /// ASIN code.
    #[serde(default)]
    pub asin_code: String,
    /// Marketplace code.
    #[serde(default)]
    pub site: String,
    /// Alert type code (see [`AlertKind`]); unknown codes are kept as-is.
    pub alert_type: String,
    /// Severity tag.
    #[serde(default)]
    pub severity: Option<String>,
    /// When the alert fired (ISO 8601).
    #[serde(default)]
    pub alert_at: String,
    /// Value before the change.
    #[serde(default)]
    pub old_value: Option<String>,
    /// Value after the change.
    #[serde(default)]
    pub new_value: Option<String>,
    /// Change percentage.
    #[serde(default)]
    pub change_percent: Option<PercentValue>,
    /// Related entity (e.g. review id).
    #[serde(default)]
    pub ref_id: Option<i64>,
    /// Extra context as raw JSON text.
    #[serde(default)]
    pub context_json: Option<String>,
    /// Backend-provided message, if any.
    #[serde(default)]
    pub message: Option<String>,
}

impl AlertRecord {
    /// Returns the known kind for this record's type code.
    pub fn kind(&self) -> Option<AlertKind> {
        AlertKind::from_code(&self.alert_type)
    }
}

// ============================================================================
// Display Record
// ============================================================================

/// An alert ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertItem {
    /// Backend identifier.
    pub id: i64,
    /// Listing identifier.
    pub asin_id: i64,
    /// ASIN code.
    pub asin: String,
    /// Alert type code.
    #[serde(rename = "type")]
    pub alert_type: String,
    /// When the alert fired (ISO 8601).
    pub created_at: String,
    /// Human-readable description.
    pub message: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Signed percentage text, e.g. `+25%`.
    pub change_percent: Option<String>,
    /// Severity tag.
    pub severity: Option<String>,
    /// Workflow status; not yet provided by the backend.
    pub status: Option<String>,
}

impl AlertItem {
    /// Parses `created_at` as an RFC 3339 timestamp.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
