//! Integration tests for the page adapter and mapping layer together.

use serde_json::json;
use spyglass_core::{map_alert, normalize, normalize_as, AlertRecord, PageEnvelope};

#[test]
fn test_legacy_alert_array_maps_to_display_page() {
    let raw = json!([
        {"id": 1, "asinId": 9, "asinCode": "B01", "alertType": "PRICE_CHANGE",
         "alertAt": "2025-11-11T00:00:00Z", "oldValue": "19.99", "newValue": "17.99"},
        {"id": 2, "asinId": 9, "asinCode": "B01", "alertType": "TITLE",
         "alertAt": "2025-11-11T01:00:00Z"}
    ]);

    let page = normalize_as::<AlertRecord>(Some(&raw), 0, 20)
        .unwrap()
        .map(|record| map_alert(&record));

    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 1);
    assert!(!page.has_next);
    assert_eq!(page.items[0].message, "price changed from 19.99 to 17.99");
    assert_eq!(page.items[1].message, "product title changed");
    assert!(page.items[1].created_at_utc().is_some());
}

#[test]
fn test_envelope_and_array_shapes_agree_on_items() {
    let items = json!([{"id": 1}, {"id": 2}]);
    let envelope = json!({"items": items.clone(), "total": 2, "page": 0, "size": 20,
                          "totalPages": 1, "hasNext": false, "hasPrevious": false});

    let from_array = normalize(Some(&items), 0, 20);
    let from_envelope = normalize(Some(&envelope), 0, 20);
    assert_eq!(from_array, from_envelope);
}

#[test]
fn test_normalized_output_round_trips_through_adapter() {
    let shapes = [
        json!(null),
        json!([1, 2, 3]),
        json!({"data": [1]}),
        json!({"items": [1], "total": 7, "page": 3, "size": 1, "totalPages": 7,
               "hasNext": true, "hasPrevious": true}),
    ];

    for raw in shapes {
        let once = normalize(Some(&raw), 3, 10);
        let encoded = serde_json::to_value(&once).unwrap();
        let twice = normalize(Some(&encoded), 3, 10);
        assert_eq!(once, twice, "not idempotent for {raw}");
        assert!(once.validate().is_ok(), "invariants broken for {raw}");
    }
}

#[test]
fn test_empty_envelope_serializes_camel_case() {
    let page: PageEnvelope<u8> = PageEnvelope::empty(2, 10);
    assert_eq!(
        serde_json::to_value(&page).unwrap(),
        json!({"items": [], "total": 0, "page": 2, "size": 10, "totalPages": 0,
               "hasNext": false, "hasPrevious": false})
    );
}
