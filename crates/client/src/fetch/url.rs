//! Target URL parsing for upstream requests.
//!
//! Parsing only gates what the HTTP client may request. Cache keys keep the
//! caller's literal string.

/// Error type for unusable target URLs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse an absolute `http`/`https` target URL.
///
/// No scheme is assumed and nothing is rewritten beyond what URL parsing
/// itself normalizes.
pub fn parse_target(input: &str) -> Result<url::Url, UrlError> {
    if input.trim().is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(input).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https() {
        let url = parse_target("https://example.com/a?b=1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.query(), Some("b=1"));
    }

    #[test]
    fn test_parse_http_allowed() {
        let url = parse_target("http://example.com").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_parse_requires_scheme() {
        let result = parse_target("example.com/page");
        assert!(matches!(result, Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        let result = parse_target("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(parse_target(""), Err(UrlError::Empty)));
        assert!(matches!(parse_target("   "), Err(UrlError::Empty)));
    }
}
