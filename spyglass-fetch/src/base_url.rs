//! Base URL resolution and path joining.
//!
//! The configured base is reconciled against the dashboard's own origin once,
//! when the client is built. Cross-origin bases collapse to `""` so requests
//! go through the same-origin reverse proxy instead of failing CORS.

use url::Url;

/// Resolves the configured base URL into the prefix used for every request.
///
/// - empty or unparsable -> `""` (same-origin relative paths)
/// - bare path (`/api/`) -> as-is without the trailing slash
/// - absolute URL on a different host than `page_origin` -> `""`
/// - absolute URL on the same host -> its origin only; any path is dropped
///   so it cannot double up with the request paths
///
/// When `page_origin` is `None` there is no page to be cross-origin from, and
/// an absolute URL resolves to its origin.
pub fn resolve_base_url(configured: &str, page_origin: Option<&str>) -> String {
    let configured = configured.trim();
    if configured.is_empty() {
        return String::new();
    }
    if configured.starts_with('/') {
        return configured.trim_end_matches('/').to_string();
    }

    let Some(url) = parse_http(configured) else {
        return String::new();
    };

    if let Some(origin) = page_origin {
        let same_host = parse_http(origin).is_some_and(|page| host_key(&page) == host_key(&url));
        if !same_host {
            return String::new();
        }
    }

    url.origin().ascii_serialization()
}

/// Joins a resolved base and a request path into the final URL.
///
/// The path gets exactly one leading slash. A leading `/api` segment is
/// dropped when the base already ends in `/api`, and repeated `/api/api`
/// prefixes are collapsed.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let mut path = format!("/{}", path.trim_start_matches('/'));

    while path.starts_with("/api") && starts_with_segment(&path[4..], "/api") {
        path.replace_range(..4, "");
    }
    if base.ends_with("/api") && starts_with_segment(&path, "/api") {
        path.replace_range(..4, "");
    }

    format!("{base}{path}")
}

/// True if `path` begins with `segment` as a whole path segment.
fn starts_with_segment(path: &str, segment: &str) -> bool {
    path.strip_prefix(segment)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

fn parse_http(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    (matches!(url.scheme(), "http" | "https") && url.host_str().is_some()).then_some(url)
}

/// Host name plus any explicit non-default port. The scheme is not part of it.
fn host_key(url: &Url) -> (Option<&str>, Option<u16>) {
    (url.host_str(), url.port())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Option<&str> = Some("https://dash.example.com");

    #[test]
    fn test_empty_and_garbage_resolve_to_same_origin() {
        assert_eq!(resolve_base_url("", PAGE), "");
        assert_eq!(resolve_base_url("   ", PAGE), "");
        assert_eq!(resolve_base_url("not a url", PAGE), "");
        assert_eq!(resolve_base_url("ftp://dash.example.com", PAGE), "");
    }

    #[test]
    fn test_bare_path_strips_trailing_slash() {
        assert_eq!(resolve_base_url("/api/", PAGE), "/api");
        assert_eq!(resolve_base_url("/api", None), "/api");
        assert_eq!(resolve_base_url("/", PAGE), "");
    }

    #[test]
    fn test_cross_origin_base_is_dropped() {
        assert_eq!(resolve_base_url("http://shcamz.xyz:8081/api", PAGE), "");
        // Same host name, different port is still another origin's host.
        assert_eq!(resolve_base_url("https://dash.example.com:8443/api", PAGE), "");
    }

    #[test]
    fn test_same_origin_base_keeps_origin_only() {
        assert_eq!(resolve_base_url("https://dash.example.com/api/v1/", PAGE), "https://dash.example.com");
        assert_eq!(
            resolve_base_url("https://dash.example.com:443/api", PAGE),
            "https://dash.example.com"
        );
        // Only the scheme differs; the host is the same.
        assert_eq!(resolve_base_url("http://dash.example.com/api", PAGE), "http://dash.example.com");
    }

    #[test]
    fn test_absolute_base_without_page_origin() {
        assert_eq!(resolve_base_url("http://localhost:8081/api", None), "http://localhost:8081");
    }

    #[test]
    fn test_join_adds_single_leading_slash() {
        assert_eq!(join_url("", "api/asin"), "/api/asin");
        assert_eq!(join_url("", "//api/asin"), "/api/asin");
        assert_eq!(join_url("https://h.example", "/api/asin?page=0"), "https://h.example/api/asin?page=0");
    }

    #[test]
    fn test_join_collapses_duplicate_api_prefix() {
        assert_eq!(join_url("/api", "/api/asin/7"), "/api/asin/7");
        assert_eq!(join_url("/api/", "/api?x=1"), "/api?x=1");
        assert_eq!(join_url("/api", "/asin"), "/api/asin");
        assert_eq!(join_url("", "/api/api/groups"), "/api/groups");
        assert_eq!(join_url("/api", "/api/api/groups"), "/api/groups");
    }

    #[test]
    fn test_join_leaves_lookalike_segments_alone() {
        assert_eq!(join_url("/api", "/apis/list"), "/api/apis/list");
        assert_eq!(join_url("", "/api/apiary"), "/api/apiary");
    }
}
