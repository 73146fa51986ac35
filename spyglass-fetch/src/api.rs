//! Endpoint catalog for the listing-monitor backend.
//!
//! Every list endpoint goes through [`spyglass_core::normalize_as`], so bare
//! arrays and paginated envelopes come back as the same [`PageEnvelope`].
//! Successful writes clear the response cache so the next read sees them.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use spyglass_core::{
    AlertRecord, AsinRecord, CreateAsinRequest, CreateGroupRequest, GroupRecord, HistoryRecord,
    MonitorConfig, PageEnvelope, ReviewRecord, UpdateAsinRequest, UpdateGroupRequest,
    normalize_as,
};
use tracing::instrument;
use url::form_urlencoded;

use crate::client::ApiClient;
use crate::error::FetchError;

/// Default page size for listing pages.
pub const DEFAULT_ASIN_PAGE_SIZE: u32 = 20;
/// Default page size for the group list.
pub const DEFAULT_GROUP_PAGE_SIZE: u32 = 100;

// ============================================================================
// Query Types
// ============================================================================

/// Filters for alert log queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertQuery {
    /// Zero-based page.
    pub page: u32,
    /// Page size.
    pub size: u32,
    /// Alert type code filter.
    pub alert_type: Option<String>,
    /// Lower bound on the alert time.
    pub from: Option<String>,
    /// Upper bound on the alert time.
    pub to: Option<String>,
}

impl AlertQuery {
    /// Creates a query for one page.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    /// Filters by alert type code.
    pub fn with_type(mut self, alert_type: impl Into<String>) -> Self {
        self.alert_type = Some(alert_type.into());
        self
    }

    /// Restricts the time range.
    pub fn between(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("page", &self.page.to_string())
            .append_pair("size", &self.size.to_string());
        for (key, value) in [("type", &self.alert_type), ("from", &self.from), ("to", &self.to)] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.append_pair(key, value);
            }
        }
        query.finish()
    }
}

/// Time window for listing history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HistoryRange {
    /// Last 7 days.
    Week,
    /// Last 30 days.
    #[default]
    Month,
    /// Last 90 days.
    Quarter,
}

impl HistoryRange {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            other => Err(FetchError::InvalidRequest(format!(
                "unknown history range {other:?} (expected 7d, 30d or 90d)"
            ))),
        }
    }
}

fn page_query(pairs: &[(&str, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

// ============================================================================
// Endpoint Catalog
// ============================================================================

/// Typed access to every backend endpoint the dashboard uses.
#[derive(Debug, Clone)]
pub struct SpyglassApi {
    client: ApiClient,
}

impl SpyglassApi {
    /// Wraps a client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        size: u32,
    ) -> Result<PageEnvelope<T>, FetchError> {
        let raw: Value = self.client.get(path).await?;
        Ok(normalize_as(Some(&raw), page, size)?)
    }

    // ------------------------------------------------------------------------
    // Listings
    // ------------------------------------------------------------------------

    /// Lists monitored listings, optionally within one group.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request or item decoding.
    #[instrument(skip(self))]
    pub async fn list_asins(
        &self,
        page: u32,
        size: u32,
        group_id: Option<i64>,
    ) -> Result<PageEnvelope<AsinRecord>, FetchError> {
        let mut pairs = vec![("page", page.to_string()), ("size", size.to_string())];
        if let Some(group_id) = group_id {
            pairs.push(("groupId", group_id.to_string()));
        }
        self.get_page(&format!("/api/asin?{}", page_query(&pairs)), page, size)
            .await
    }

    /// Fetches one listing.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self))]
    pub async fn asin_detail(&self, id: i64) -> Result<AsinRecord, FetchError> {
        self.client.get(&format!("/api/asin/{id}")).await
    }

    /// Starts monitoring a listing.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self, body), fields(asin = %body.asin, site = %body.site))]
    pub async fn create_asin(&self, body: &CreateAsinRequest) -> Result<AsinRecord, FetchError> {
        let created = self.client.post_json("/api/asin", body).await?;
        self.client.clear_cache();
        Ok(created)
    }

    /// Updates a listing's nickname, group, brand, or configuration.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self, body))]
    pub async fn update_asin(
        &self,
        id: i64,
        body: &UpdateAsinRequest,
    ) -> Result<AsinRecord, FetchError> {
        let updated = self.client.put_json(&format!("/api/asin/{id}"), body).await?;
        self.client.clear_cache();
        Ok(updated)
    }

    /// Replaces a listing's alert configuration.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self, config))]
    pub async fn update_asin_config(
        &self,
        id: i64,
        config: &MonitorConfig,
    ) -> Result<AsinRecord, FetchError> {
        let updated = self
            .client
            .put_json(&format!("/api/asin/{id}/config"), config)
            .await?;
        self.client.clear_cache();
        Ok(updated)
    }

    /// Stops monitoring a listing.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self))]
    pub async fn delete_asin(&self, id: i64) -> Result<(), FetchError> {
        self.client.delete(&format!("/api/asin/{id}")).await?;
        self.client.clear_cache();
        Ok(())
    }

    /// Fetches a listing's snapshot history.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request or item decoding.
    #[instrument(skip(self))]
    pub async fn asin_history(
        &self,
        id: i64,
        range: HistoryRange,
        page: u32,
        size: u32,
    ) -> Result<PageEnvelope<HistoryRecord>, FetchError> {
        let query = page_query(&[
            ("range", range.to_string()),
            ("page", page.to_string()),
            ("size", size.to_string()),
        ]);
        self.get_page(&format!("/api/asin/{id}/history?{query}"), page, size)
            .await
    }

    /// Fetches a listing's alert log.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request or item decoding.
    #[instrument(skip(self))]
    pub async fn asin_alerts(
        &self,
        id: i64,
        query: &AlertQuery,
    ) -> Result<PageEnvelope<AlertRecord>, FetchError> {
        let path = format!("/api/asin/{id}/alerts?{}", query.to_query());
        self.get_page(&path, query.page, query.size).await
    }

    /// Fetches a listing's negative-review alerts.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request or item decoding.
    #[instrument(skip(self))]
    pub async fn negative_reviews(
        &self,
        id: i64,
        page: u32,
        size: u32,
    ) -> Result<PageEnvelope<ReviewRecord>, FetchError> {
        let query = page_query(&[
            ("rating", "negative".to_string()),
            ("page", page.to_string()),
            ("size", size.to_string()),
        ]);
        self.get_page(&format!("/api/asin/{id}/reviews?{query}"), page, size)
            .await
    }

    // ------------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------------

    /// Fetches the global alert log.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request or item decoding.
    #[instrument(skip(self))]
    pub async fn list_alerts(
        &self,
        query: &AlertQuery,
    ) -> Result<PageEnvelope<AlertRecord>, FetchError> {
        let path = format!("/api/alerts?{}", query.to_query());
        self.get_page(&path, query.page, query.size).await
    }

    // ------------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------------

    /// Lists listing groups.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request or item decoding.
    #[instrument(skip(self))]
    pub async fn list_groups(
        &self,
        page: u32,
        size: u32,
    ) -> Result<PageEnvelope<GroupRecord>, FetchError> {
        let query = page_query(&[("page", page.to_string()), ("size", size.to_string())]);
        self.get_page(&format!("/api/groups?{query}"), page, size)
            .await
    }

    /// Creates a group.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self, body), fields(name = %body.name))]
    pub async fn create_group(&self, body: &CreateGroupRequest) -> Result<GroupRecord, FetchError> {
        let created = self.client.post_json("/api/groups", body).await?;
        self.client.clear_cache();
        Ok(created)
    }

    /// Renames or re-describes a group.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self, body))]
    pub async fn update_group(
        &self,
        id: i64,
        body: &UpdateGroupRequest,
    ) -> Result<GroupRecord, FetchError> {
        let updated = self
            .client
            .put_json(&format!("/api/groups/{id}"), body)
            .await?;
        self.client.clear_cache();
        Ok(updated)
    }

    /// Deletes a group.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the request.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, id: i64) -> Result<(), FetchError> {
        self.client.delete(&format!("/api/groups/{id}")).await?;
        self.client.clear_cache();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_query_encoding() {
        assert_eq!(AlertQuery::new(0, 20).to_query(), "page=0&size=20");

        let query = AlertQuery::new(2, 50)
            .with_type("PRICE_CHANGE")
            .between(Some("2024-01-01".into()), None);
        assert_eq!(query.to_query(), "page=2&size=50&type=PRICE_CHANGE&from=2024-01-01");
    }

    #[test]
    fn test_alert_query_skips_empty_filters() {
        let query = AlertQuery::new(0, 10).with_type("");
        assert_eq!(query.to_query(), "page=0&size=10");
    }

    #[test]
    fn test_query_values_are_escaped() {
        let query = AlertQuery::new(0, 10).between(Some("2024-01-01T00:00:00+08:00".into()), None);
        assert_eq!(
            query.to_query(),
            "page=0&size=10&from=2024-01-01T00%3A00%3A00%2B08%3A00"
        );
    }

    #[test]
    fn test_history_range() {
        assert_eq!(HistoryRange::default().as_str(), "30d");
        assert_eq!("7d".parse::<HistoryRange>().unwrap(), HistoryRange::Week);
        assert_eq!(" 90d ".parse::<HistoryRange>().unwrap(), HistoryRange::Quarter);
        assert!("1y".parse::<HistoryRange>().is_err());
    }
}
