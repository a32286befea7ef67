//! URL normalization.
//!
//! Ensures a single canonical representation for every stored URL so that
//! lookups and deduplication behave predictably.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Normalizes a URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. **Protocol**: only HTTP and HTTPS are allowed; the scheme is lower-cased
/// 2. **Hostname**: converted to lowercase
/// 3. **Default ports**: removed (80 for HTTP, 443 for HTTPS)
/// 4. **Trailing slash**: a single trailing `/` is stripped from the path,
///    including the bare root path when no query or fragment follows it
/// 5. **Query and fragment**: preserved verbatim
///
/// The function is idempotent: `normalize_url(normalize_url(u)) == normalize_url(u)`.
///
/// Rejects dangerous schemes like `javascript:`, `data:`, `file:`.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    // The url crate already lower-cases scheme and host and drops default
    // ports; only the trailing slash needs manual handling.
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let rendered = url.to_string();

    // Bare root with nothing after it: "https://example.com/" -> "https://example.com".
    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        return Ok(rendered.trim_end_matches('/').to_string());
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_scheme_and_host() {
        assert_eq!(
            normalize_url("HTTPS://EXAMPLE.COM/Path").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_normalize_strips_root_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/").unwrap(),
            "https://example.com"
        );
        assert_eq!(
            normalize_url("https://example.com").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_normalize_strips_path_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/a/b/").unwrap(),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn test_normalize_removes_default_ports() {
        assert_eq!(
            normalize_url("https://example.com:443/path").unwrap(),
            "https://example.com/path"
        );
        assert_eq!(
            normalize_url("http://example.com:80/path").unwrap(),
            "http://example.com/path"
        );
        assert_eq!(
            normalize_url("http://example.com:8080/path").unwrap(),
            "http://example.com:8080/path"
        );
    }

    #[test]
    fn test_normalize_preserves_query_and_fragment() {
        assert_eq!(
            normalize_url("https://example.com/search?q=Rust&lang=EN#results").unwrap(),
            "https://example.com/search?q=Rust&lang=EN#results"
        );
    }

    #[test]
    fn test_normalize_keeps_root_slash_before_query() {
        assert_eq!(
            normalize_url("https://example.com/?q=1").unwrap(),
            "https://example.com/?q=1"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "https://EXAMPLE.com/",
            "http://example.com:80/a/",
            "https://example.com/p?x=1#frag",
            "https://example.com",
        ] {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn test_normalize_rejects_invalid_url() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize_url(""),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_dangerous_schemes() {
        for input in [
            "javascript:alert('xss')",
            "data:text/plain,hi",
            "file:///etc/passwd",
            "ftp://example.com/file",
        ] {
            assert!(matches!(
                normalize_url(input),
                Err(UrlNormalizationError::UnsupportedProtocol)
            ));
        }
    }
}
