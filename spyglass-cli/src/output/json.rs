//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use spyglass_core::PageEnvelope;

use super::{DashboardView, DetailView};

// ============================================================================
// Output Types
// ============================================================================

/// A page of records with a one-based page number.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOutput<'a, T> {
    pub items: &'a [T],
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<'a, T> From<&'a PageEnvelope<T>> for PageOutput<'a, T> {
    fn from(envelope: &'a PageEnvelope<T>) -> Self {
        Self {
            items: &envelope.items,
            total: envelope.total,
            page: envelope.page.saturating_add(1),
            size: envelope.size,
            total_pages: envelope.total_pages,
            has_next: envelope.has_next,
            has_previous: envelope.has_previous,
        }
    }
}

/// Result of a write command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutput<'a, T> {
    pub action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<&'a T>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(output)
    }

    /// Formats a page of records.
    pub fn format_page<T: Serialize>(&self, page: &PageEnvelope<T>) -> Result<String> {
        self.format(&PageOutput::from(page))
    }

    /// Formats the dashboard.
    pub fn format_dashboard(&self, view: &DashboardView) -> Result<String> {
        self.format(view)
    }

    /// Formats a listing detail view.
    pub fn format_detail(&self, view: &DetailView) -> Result<String> {
        self.format(view)
    }

    /// Formats the result of a write command.
    pub fn format_action<T: Serialize>(
        &self,
        action: &str,
        id: Option<i64>,
        record: Option<&T>,
    ) -> Result<String> {
        self.format(&ActionOutput { action, id, record })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_page_is_one_based() {
        let formatter = JsonFormatter::new(false);
        let page = PageEnvelope::from_items(vec![1, 2, 3], 0, 20);
        let output: Value = serde_json::from_str(&formatter.format_page(&page).unwrap()).unwrap();

        assert_eq!(output["page"], 1);
        assert_eq!(output["total"], 3);
        assert_eq!(output["totalPages"], 1);
        assert_eq!(output["items"], json!([1, 2, 3]));
    }

    #[test]
    fn test_action_output() {
        let formatter = JsonFormatter::new(false);
        let output = formatter
            .format_action::<Value>("deleted", Some(4), None)
            .unwrap();
        assert_eq!(output, r#"{"action":"deleted","id":4}"#);
    }
}
