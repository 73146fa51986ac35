//! Raw payload to display record mapping.
//!
//! Every function here is pure. The only non-trivial piece is
//! [`build_alert_message`], which writes a sentence for alerts the backend
//! sent without one.

use crate::models::{
    AlertItem, AlertKind, AlertRecord, AsinItem, AsinRecord, HistoryPoint, HistoryRecord,
    PercentValue, ReviewItem, ReviewRecord,
};

// ============================================================================
// Alerts
// ============================================================================

/// Maps an alert log entry to a display record.
pub fn map_alert(record: &AlertRecord) -> AlertItem {
    AlertItem {
        id: record.id,
        asin_id: record.asin_id,
        asin: record.asin_code.clone(),
        alert_type: record.alert_type.clone(),
        created_at: record.alert_at.clone(),
        message: build_alert_message(record),
        old_value: record.old_value.clone(),
        new_value: record.new_value.clone(),
        change_percent: format_percent(record.change_percent.as_ref()),
        severity: record.severity.clone(),
        status: None,
    }
}

/// Returns the message to show for an alert.
///
/// A non-empty backend message is used verbatim. Otherwise a sentence is
/// built from the type code and the old/new values. Unknown type codes are
/// never hidden: the raw code always appears in the result.
pub fn build_alert_message(record: &AlertRecord) -> String {
    if let Some(message) = present(record.message.as_deref()) {
        return message.to_string();
    }

    let old = present(record.old_value.as_deref());
    let new = present(record.new_value.as_deref());

    let Some(kind) = record.kind() else {
        return match (old, new) {
            (Some(old), Some(new)) => format!("{}: {old} → {new}", record.alert_type),
            _ => record.alert_type.clone(),
        };
    };

    match kind {
        AlertKind::PriceChange => match (old, new) {
            (Some(old), Some(new)) => format!("price changed from {old} to {new}"),
            (None, Some(new)) => format!("price updated to {new}"),
            _ => kind.label().to_string(),
        },
        AlertKind::InventoryThreshold => match new {
            Some(new) => format!("inventory {new} below threshold {}", old.unwrap_or(""))
                .trim_end()
                .to_string(),
            None => kind.label().to_string(),
        },
        AlertKind::NegativeReview => "received a new low-rating review".to_string(),
        AlertKind::Title => "product title changed".to_string(),
        AlertKind::MainImage => "main image changed".to_string(),
        AlertKind::BulletPoints => "bullet points changed".to_string(),
        AlertKind::AplusContent => "A+ content changed".to_string(),
    }
}

/// Treats empty strings the same as missing values.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// Percent Formatting
// ============================================================================

/// Formats a change percentage for display.
///
/// - absent -> `None`
/// - text containing `%` -> unchanged; other text -> `%` appended
/// - numbers -> `+` for positive, own `-` for negative, no sign for zero;
///   at most two decimals with trailing zeros dropped
///
/// ```
/// use spyglass_core::{format_percent, PercentValue};
///
/// assert_eq!(format_percent(Some(&PercentValue::from(25.0))).as_deref(), Some("+25%"));
/// assert_eq!(format_percent(Some(&PercentValue::from(-10.5))).as_deref(), Some("-10.5%"));
/// assert_eq!(format_percent(Some(&PercentValue::from("5%"))).as_deref(), Some("5%"));
/// assert_eq!(format_percent(None), None);
/// ```
pub fn format_percent(value: Option<&PercentValue>) -> Option<String> {
    match value? {
        PercentValue::Text(text) if text.contains('%') => Some(text.clone()),
        PercentValue::Text(text) => Some(format!("{text}%")),
        PercentValue::Number(n) => {
            let magnitude = format_magnitude(*n);
            // Sign follows the rounded value, so 0.001 shows as "0%".
            let sign = if *n > 0.0 && magnitude != "0" { "+" } else { "" };
            Some(format!("{sign}{magnitude}%"))
        }
    }
}

fn format_magnitude(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 {
        return format!("{n:.0}");
    }
    let fixed = format!("{n:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    // +-0.001 rounds to "0.00" / "-0.00"
    if trimmed == "0" || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Reviews, History, Listings
// ============================================================================

/// Maps a review alert to a display record.
pub fn map_review(record: &ReviewRecord) -> ReviewItem {
    ReviewItem {
        id: record.id,
        asin_id: record.asin_id,
        rating: record.rating,
        created_at: record.review_date.clone(),
        text: record.review_text.clone(),
    }
}

/// Maps a history snapshot to a chart point.
pub fn map_history_point(record: &HistoryRecord) -> HistoryPoint {
    HistoryPoint {
        timestamp: record.snapshot_at.clone(),
        price: record.price,
        bsr: record.bsr,
        inventory: record.inventory,
    }
}

/// Maps a listing to a display record.
pub fn map_asin(record: &AsinRecord) -> AsinItem {
    let display_name = present(record.nickname.as_deref())
        .unwrap_or(&record.asin)
        .to_string();

    AsinItem {
        id: record.id,
        asin: record.asin.clone(),
        site: record.site.clone(),
        display_name,
        brand: record.brand.clone(),
        group_id: record.group_id,
        group_name: record.group_name.clone(),
        inventory_threshold: record.inventory_threshold,
        price: record.last_price,
        bsr: record.last_bsr,
        inventory: record.last_inventory,
        total_reviews: record.total_reviews,
        avg_rating: record.avg_rating,
        updated_at: record.updated_at.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(alert_type: &str) -> AlertRecord {
        AlertRecord {
            id: 1,
            asin_id: 99,
            asin_code: "TESTASIN".to_string(),
            site: "US".to_string(),
            alert_type: alert_type.to_string(),
            severity: Some("INFO".to_string()),
            alert_at: "2025-11-11T00:00:00.000Z".to_string(),
            old_value: Some("19.99".to_string()),
            new_value: Some("17.99".to_string()),
            change_percent: Some(PercentValue::from("-10%")),
            ref_id: Some(0),
            context_json: Some(String::new()),
            message: None,
        }
    }

    #[test]
    fn test_price_change_message() {
        let item = map_alert(&alert("PRICE_CHANGE"));
        assert!(item.message.contains("price changed"));
        assert!(item.message.contains("19.99"));
        assert!(item.message.contains("17.99"));
        assert_eq!(item.asin, "TESTASIN");
        assert_eq!(item.alert_type, "PRICE_CHANGE");
        assert_eq!(item.change_percent.as_deref(), Some("-10%"));
    }

    #[test]
    fn test_price_update_without_old_value() {
        let mut record = alert("PRICE_CHANGE");
        record.old_value = None;
        assert_eq!(build_alert_message(&record), "price updated to 17.99");

        record.new_value = Some(String::new());
        assert_eq!(build_alert_message(&record), "Price change");
    }

    #[test]
    fn test_inventory_threshold_message() {
        let mut record = alert("INVENTORY_THRESHOLD");
        record.old_value = Some("10".to_string());
        record.new_value = Some("5".to_string());
        assert_eq!(build_alert_message(&record), "inventory 5 below threshold 10");

        record.old_value = None;
        assert_eq!(build_alert_message(&record), "inventory 5 below threshold");

        record.new_value = None;
        assert_eq!(build_alert_message(&record), "Inventory below threshold");
    }

    #[test]
    fn test_backend_message_wins() {
        for kind in ["TITLE", "PRICE_CHANGE", "SOMETHING_NEW"] {
            let mut record = alert(kind);
            record.message = Some("custom backend message".to_string());
            assert_eq!(map_alert(&record).message, "custom backend message");
        }
    }

    #[test]
    fn test_empty_backend_message_is_ignored() {
        let mut record = alert("TITLE");
        record.message = Some(String::new());
        assert_eq!(build_alert_message(&record), "product title changed");
    }

    #[test]
    fn test_canned_messages() {
        assert_eq!(build_alert_message(&alert("NEGATIVE_REVIEW")), "received a new low-rating review");
        assert_eq!(build_alert_message(&alert("MAIN_IMAGE")), "main image changed");
        assert_eq!(build_alert_message(&alert("BULLET_POINTS")), "bullet points changed");
        assert_eq!(build_alert_message(&alert("APLUS_CONTENT")), "A+ content changed");
    }

    #[test]
    fn test_unknown_type_keeps_raw_code() {
        let mut record = alert("UNKNOWN_TYPE");
        record.old_value = Some("A".to_string());
        record.new_value = Some("B".to_string());
        assert_eq!(build_alert_message(&record), "UNKNOWN_TYPE: A → B");

        record.old_value = None;
        assert_eq!(build_alert_message(&record), "UNKNOWN_TYPE");
    }

    #[test]
    fn test_format_percent_numbers() {
        let fmt = |n: f64| format_percent(Some(&PercentValue::from(n)));
        assert_eq!(fmt(25.0).as_deref(), Some("+25%"));
        assert_eq!(fmt(-10.5).as_deref(), Some("-10.5%"));
        assert_eq!(fmt(0.0).as_deref(), Some("0%"));
        assert_eq!(fmt(-3.0).as_deref(), Some("-3%"));
        assert_eq!(fmt(12.3456).as_deref(), Some("+12.35%"));
        assert_eq!(fmt(-0.0).as_deref(), Some("0%"));
        assert_eq!(fmt(1.1).as_deref(), Some("+1.1%"));
    }

    #[test]
    fn test_format_percent_rounding_to_zero_drops_sign() {
        let fmt = |n: f64| format_percent(Some(&PercentValue::from(n)));
        assert_eq!(fmt(0.001).as_deref(), Some("0%"));
        assert_eq!(fmt(-0.004).as_deref(), Some("0%"));
        assert_eq!(fmt(0.005).as_deref(), Some("+0.01%"));
        assert_eq!(fmt(0.3).as_deref(), Some("+0.3%"));
    }

    #[test]
    fn test_format_percent_text() {
        assert_eq!(format_percent(Some(&PercentValue::from("5%"))).as_deref(), Some("5%"));
        assert_eq!(format_percent(Some(&PercentValue::from("7.5"))).as_deref(), Some("7.5%"));
        assert_eq!(format_percent(None), None);
    }

    #[test]
    fn test_map_review_uses_review_date() {
        let record = ReviewRecord {
            id: 3,
            asin_id: 99,
            review_id: "R1".to_string(),
            rating: 1,
            review_date: "2025-11-10".to_string(),
            review_text: "broke after a day".to_string(),
            alert_at: "2025-11-11T08:00:00Z".to_string(),
        };
        let item = map_review(&record);
        assert_eq!(item.created_at, "2025-11-10");
        assert_eq!(item.text, "broke after a day");
        assert_eq!(item.rating, 1);
    }

    #[test]
    fn test_map_asin_display_name() {
        let record: AsinRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "asin": "B000TEST",
            "site": "US",
            "nickname": "",
            "lastPrice": 17.99,
            "lastInventory": 3,
            "inventoryThreshold": 5
        }))
        .unwrap();
        let item = map_asin(&record);
        assert_eq!(item.display_name, "B000TEST");
        assert_eq!(item.price, Some(17.99));
        assert!(item.is_below_threshold());
    }
}
