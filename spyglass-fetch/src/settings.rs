//! Client settings.
//!
//! Settings are read once at startup, either from the process environment
//! ([`ClientSettings::from_env`]) or from any key lookup
//! ([`ClientSettings::from_lookup`]), and then handed to the client builder.

use std::time::Duration;

use crate::error::FetchError;

/// Environment variable for the configured API base URL.
pub const ENV_BASE_URL: &str = "SPYGLASS_API_BASE_URL";
/// Environment variable for the origin the dashboard is served from.
pub const ENV_PAGE_ORIGIN: &str = "SPYGLASS_PAGE_ORIGIN";
/// Environment variable for the per-attempt timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "SPYGLASS_API_TIMEOUT_MS";
/// Environment variable for the retry count.
pub const ENV_RETRY: &str = "SPYGLASS_API_RETRY";
/// Environment variable for the GET cache TTL in milliseconds.
pub const ENV_CACHE_TTL_MS: &str = "SPYGLASS_API_CACHE_TTL_MS";

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Default number of retries after the first attempt.
pub const DEFAULT_RETRY_LIMIT: u32 = 2;
/// Default GET cache TTL.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(30_000);

// ============================================================================
// Client Settings
// ============================================================================

/// Defaults applied to every request that does not override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Configured base URL: empty, absolute, or a bare path like `/api`.
    pub base_url: String,
    /// Origin the dashboard is served from, if known.
    pub page_origin: Option<String>,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub retry_limit: u32,
    /// GET cache TTL.
    pub cache_ttl: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
            page_origin: None,
            timeout: DEFAULT_TIMEOUT,
            retry_limit: DEFAULT_RETRY_LIMIT,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl ClientSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] if a numeric variable does not
    /// parse or a duration is zero.
    pub fn from_env() -> Result<Self, FetchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults. An unset base URL stays `/api`; a base
    /// URL set to the empty string means same-origin relative paths.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] if a numeric value does not
    /// parse or a duration is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FetchError> {
        let mut settings = Self::default();

        if let Some(base) = lookup(ENV_BASE_URL) {
            settings.base_url = base.trim().to_string();
        }
        settings.page_origin = lookup(ENV_PAGE_ORIGIN)
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty());

        if let Some(ms) = parse_u64(&lookup, ENV_TIMEOUT_MS)? {
            settings.timeout = positive_millis(ENV_TIMEOUT_MS, ms)?;
        }
        if let Some(retry) = parse_u64(&lookup, ENV_RETRY)? {
            settings.retry_limit = u32::try_from(retry).map_err(|_| {
                FetchError::InvalidConfig(format!("{ENV_RETRY} is out of range: {retry}"))
            })?;
        }
        if let Some(ms) = parse_u64(&lookup, ENV_CACHE_TTL_MS)? {
            settings.cache_ttl = positive_millis(ENV_CACHE_TTL_MS, ms)?;
        }

        Ok(settings)
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the page origin.
    pub fn with_page_origin(mut self, origin: impl Into<String>) -> Self {
        self.page_origin = Some(origin.into());
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry limit.
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Sets the cache TTL.
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<u64>, FetchError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|e| FetchError::InvalidConfig(format!("{key}={raw:?}: {e}")))
}

fn positive_millis(key: &str, ms: u64) -> Result<Duration, FetchError> {
    if ms == 0 {
        return Err(FetchError::InvalidConfig(format!("{key} must be positive")));
    }
    Ok(Duration::from_millis(ms))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.base_url, "/api");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.retry_limit, 2);
        assert_eq!(settings.cache_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let settings = ClientSettings::from_lookup(lookup(&[
            (ENV_BASE_URL, " https://shop.example.com/api "),
            (ENV_PAGE_ORIGIN, "https://shop.example.com"),
            (ENV_TIMEOUT_MS, "2500"),
            (ENV_RETRY, "0"),
            (ENV_CACHE_TTL_MS, "1000"),
        ]))
        .unwrap();

        assert_eq!(settings.base_url, "https://shop.example.com/api");
        assert_eq!(settings.page_origin.as_deref(), Some("https://shop.example.com"));
        assert_eq!(settings.timeout, Duration::from_millis(2500));
        assert_eq!(settings.retry_limit, 0);
        assert_eq!(settings.cache_ttl, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let settings =
            ClientSettings::from_lookup(lookup(&[(ENV_TIMEOUT_MS, ""), (ENV_PAGE_ORIGIN, " ")]))
                .unwrap();
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert!(settings.page_origin.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(ClientSettings::from_lookup(lookup(&[(ENV_RETRY, "two")])).is_err());
        assert!(ClientSettings::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "0")])).is_err());
        assert!(ClientSettings::from_lookup(lookup(&[(ENV_CACHE_TTL_MS, "-5")])).is_err());
    }
}
