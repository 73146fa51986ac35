//! Paginated envelopes and the page-response adapter.
//!
//! The backend is midway through moving its list endpoints from bare JSON
//! arrays to a paginated envelope. [`normalize`] accepts either shape (and a
//! few drifted ones) and always hands callers a [`PageEnvelope`]:
//!
//! | Raw payload                                   | Result                          |
//! |-----------------------------------------------|---------------------------------|
//! | `null` / absent                               | empty envelope                  |
//! | object with array `items` and numeric `total` | canonical, passed through       |
//! | array                                         | wrapped, `total = len`          |
//! | other object with some array field            | first array field, wrapped      |
//! | anything else                                 | empty envelope                  |
//!
//! For wrapped arrays `total` is only an estimate (the length of what was
//! returned), and `has_next`/`has_previous` are always `false`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ============================================================================
// Page Envelope
// ============================================================================

/// Canonical paginated response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Items on this page, in server order.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Zero-based page index.
    pub page: u32,
    /// Page size (always positive).
    pub size: u32,
    /// Number of pages.
    pub total_pages: u32,
    /// Whether a following page exists.
    pub has_next: bool,
    /// Whether a preceding page exists.
    pub has_previous: bool,
}

impl<T> PageEnvelope<T> {
    /// Creates an empty envelope for the requested page.
    pub fn empty(page: u32, size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            size: size.max(1),
            total_pages: 0,
            has_next: false,
            has_previous: false,
        }
    }

    /// Wraps a bare item list that carries no pagination metadata.
    ///
    /// The page size is widened to the item count when the list is longer
    /// than the requested size; items are never dropped.
    pub fn from_items(items: Vec<T>, page: u32, size: u32) -> Self {
        let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
        Self {
            total: u64::from(len),
            page,
            size: size.max(len).max(1),
            total_pages: u32::from(len > 0),
            has_next: false,
            has_previous: false,
            items,
        }
    }

    /// Returns true if the page carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps every item, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageEnvelope<U> {
        PageEnvelope {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }

    /// Checks the envelope invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] when the page holds more items than
    /// its size, the size is zero, or an empty total reports pages.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.size == 0 {
            return Err(CoreError::InvalidData("page size must be positive".into()));
        }
        if self.items.len() > self.size as usize {
            return Err(CoreError::InvalidData(format!(
                "page holds {} items but size is {}",
                self.items.len(),
                self.size
            )));
        }
        if self.total == 0 && self.total_pages != 0 {
            return Err(CoreError::InvalidData(format!(
                "total is 0 but total_pages is {}",
                self.total_pages
            )));
        }
        Ok(())
    }
}

impl PageEnvelope<Value> {
    /// Decodes every item into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] on the first item that does not
    /// match `T`.
    pub fn decode_items<T: DeserializeOwned>(self) -> Result<PageEnvelope<T>, CoreError> {
        let items = self
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(PageEnvelope {
            items,
            total: self.total,
            page: self.page,
            size: self.size,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        })
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Normalizes a raw list payload into a [`PageEnvelope`].
///
/// `page` and `size` describe what the caller asked for; they are used
/// whenever the payload itself does not say.
pub fn normalize(raw: Option<&Value>, page: u32, size: u32) -> PageEnvelope<Value> {
    match raw {
        Some(Value::Object(obj)) => {
            if let Some(envelope) = canonical(obj, page, size) {
                return envelope;
            }
            // Best-effort shim for drifted shapes: the first array-valued
            // field in document order is taken as the item list.
            match obj.values().find_map(Value::as_array) {
                Some(items) => PageEnvelope::from_items(items.clone(), page, size),
                None => PageEnvelope::empty(page, size),
            }
        }
        Some(Value::Array(items)) => PageEnvelope::from_items(items.clone(), page, size),
        _ => PageEnvelope::empty(page, size),
    }
}

/// Normalizes a raw payload and decodes its items into `T`.
///
/// # Errors
///
/// Returns [`CoreError::Serialization`] if an item does not decode as `T`.
pub fn normalize_as<T: DeserializeOwned>(
    raw: Option<&Value>,
    page: u32,
    size: u32,
) -> Result<PageEnvelope<T>, CoreError> {
    normalize(raw, page, size).decode_items()
}

/// Reads an object that already has the envelope's `items` + `total` pair.
///
/// Missing metadata is filled from the request rather than rejected, since
/// some endpoints send only the required pair.
fn canonical(obj: &Map<String, Value>, page: u32, size: u32) -> Option<PageEnvelope<Value>> {
    let items = obj.get("items")?.as_array()?;
    let total = as_count(obj.get("total")?)?;

    let field_u32 = |key: &str| {
        obj.get(key)
            .and_then(as_count)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
    };
    let field_bool = |key: &str| obj.get(key).and_then(Value::as_bool).unwrap_or(false);

    let size = field_u32("size").unwrap_or(size).max(1);
    let total_pages = field_u32("totalPages").unwrap_or_else(|| {
        u32::try_from(total.div_ceil(u64::from(size))).unwrap_or(u32::MAX)
    });

    Some(PageEnvelope {
        items: items.clone(),
        total,
        page: field_u32("page").unwrap_or(page),
        size,
        total_pages,
        has_next: field_bool("hasNext"),
        has_previous: field_bool("hasPrevious"),
    })
}

/// Interprets any JSON number as a non-negative count.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<u64> {
    if !value.is_number() {
        return None;
    }
    // Negative or fractional totals are clamped/truncated, not rejected.
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|f| f.max(0.0) as u64))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_payload_is_empty_page() {
        let envelope = normalize(Some(&Value::Null), 2, 10);
        assert_eq!(envelope, PageEnvelope::empty(2, 10));
        assert_eq!(envelope.page, 2);
        assert_eq!(envelope.size, 10);
        assert_eq!(envelope.total_pages, 0);
        assert!(!envelope.has_next && !envelope.has_previous);

        assert_eq!(normalize(None, 2, 10), PageEnvelope::empty(2, 10));
    }

    #[test]
    fn test_bare_array_is_wrapped() {
        let raw = json!(["a", "b", "c"]);
        let envelope = normalize(Some(&raw), 0, 20);

        assert_eq!(envelope.items, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(envelope.total, 3);
        assert_eq!(envelope.page, 0);
        assert_eq!(envelope.size, 20);
        assert_eq!(envelope.total_pages, 1);
        assert!(!envelope.has_next);
        assert!(!envelope.has_previous);
    }

    #[test]
    fn test_empty_array_has_no_pages() {
        let envelope = normalize(Some(&json!([])), 0, 20);
        assert_eq!(envelope.total, 0);
        assert_eq!(envelope.total_pages, 0);
        assert!(envelope.validate().is_ok());
    }

    #[test]
    fn test_canonical_envelope_passes_through() {
        let raw = json!({
            "items": [{"id": 1}],
            "total": 41,
            "page": 1,
            "size": 20,
            "totalPages": 3,
            "hasNext": true,
            "hasPrevious": true
        });
        let envelope = normalize(Some(&raw), 0, 50);

        assert_eq!(envelope.total, 41);
        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.size, 20);
        assert_eq!(envelope.total_pages, 3);
        assert!(envelope.has_next);
        assert!(envelope.has_previous);
        assert_eq!(serde_json::to_value(&envelope).unwrap(), raw);
    }

    #[test]
    fn test_canonical_check_takes_precedence_over_scan() {
        // `tags` comes first in document order but `items` + `total` wins.
        let raw = json!({"tags": ["x"], "items": [1, 2], "total": 2});
        let envelope = normalize(Some(&raw), 0, 20);
        assert_eq!(envelope.items, vec![json!(1), json!(2)]);
        assert_eq!(envelope.total_pages, 1);
    }

    #[test]
    fn test_items_without_numeric_total_falls_back_to_scan() {
        let raw = json!({"items": [1, 2, 3], "total": "3"});
        let envelope = normalize(Some(&raw), 0, 20);
        assert_eq!(envelope.total, 3);
        assert!(!envelope.has_next);
    }

    #[test]
    fn test_scan_takes_first_array_field() {
        let raw = json!({"meta": {"v": 2}, "content": [1], "other": [2, 3]});
        let envelope = normalize(Some(&raw), 1, 5);
        assert_eq!(envelope.items, vec![json!(1)]);
        assert_eq!(envelope.total, 1);
        assert_eq!(envelope.page, 1);
    }

    #[test]
    fn test_scalar_is_empty_page() {
        for raw in [json!(42), json!("oops"), json!(true), json!({"a": 1})] {
            assert_eq!(normalize(Some(&raw), 0, 20), PageEnvelope::empty(0, 20));
        }
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_input() {
        let raw = json!({"items": [1, 2], "total": 12, "page": 0, "size": 2});
        let once = normalize(Some(&raw), 0, 2);
        let again = normalize(Some(&serde_json::to_value(&once).unwrap()), 0, 2);
        assert_eq!(once, again);
        assert_eq!(once.total_pages, 6);
    }

    #[test]
    fn test_canonical_zero_size_is_raised_to_one() {
        let raw = json!({"items": [], "total": 3, "page": 0, "size": 0});
        let envelope = normalize(Some(&raw), 0, 20);
        assert_eq!(envelope.size, 1);
        assert_eq!(envelope.total_pages, 3);
        assert!(envelope.validate().is_ok());
    }

    #[test]
    fn test_oversized_array_widens_size() {
        let raw = Value::Array((0..30).map(Value::from).collect());
        let envelope = normalize(Some(&raw), 0, 20);
        assert_eq!(envelope.items.len(), 30);
        assert_eq!(envelope.size, 30);
        assert!(envelope.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_pages_without_total() {
        let mut envelope: PageEnvelope<Value> = PageEnvelope::empty(0, 10);
        envelope.total_pages = 2;
        assert!(envelope.validate().is_err());
    }

    #[test]
    fn test_normalize_as_decodes_items() {
        let raw = json!([{"n": 1}, {"n": 2}]);

        #[derive(Deserialize)]
        struct Row {
            n: u32,
        }

        let envelope = normalize_as::<Row>(Some(&raw), 0, 20).unwrap();
        assert_eq!(envelope.items.iter().map(|r| r.n).sum::<u32>(), 3);

        let bad = json!([{"n": "one"}]);
        assert!(normalize_as::<Row>(Some(&bad), 0, 20).is_err());
    }
}
