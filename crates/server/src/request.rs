//! Request body validation.

use ogtag_core::Error;
use ogtag_core::error::MSG_URL_REQUIRED;
use serde_json::{Map, Value};

/// Extract the target URL from a raw request body.
///
/// The body must be a JSON object with a string `url`. The URL is returned
/// exactly as sent; it becomes part of the cache key.
pub fn target_url(body: Option<&str>) -> Result<String, Error> {
    let body = body.filter(|b| !b.trim().is_empty()).ok_or_else(invalid)?;

    let request: Map<String, Value> = serde_json::from_str(body).map_err(|e| {
        tracing::debug!(error = %e, "request body is not a JSON object");
        invalid()
    })?;

    require_url(request.get("url").and_then(Value::as_str).map(str::to_owned))
}

/// Reject a missing or empty URL.
pub fn require_url(url: Option<String>) -> Result<String, Error> {
    url.filter(|u| !u.is_empty()).ok_or_else(invalid)
}

fn invalid() -> Error {
    Error::InvalidParameters(MSG_URL_REQUIRED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(result: Result<String, Error>) {
        match result {
            Err(Error::InvalidParameters(detail)) => assert_eq!(detail, "URL을 입력해주세요."),
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }

    #[test]
    fn test_target_url_ok() {
        let url = target_url(Some(r#"{"url":"https://example.com/a"}"#)).unwrap();
        assert_eq!(url, "https://example.com/a");
    }

    #[test]
    fn test_target_url_kept_verbatim() {
        let url = target_url(Some(r#"{"url":"HTTPS://Example.com/a/?b=2&a=1"}"#)).unwrap();
        assert_eq!(url, "HTTPS://Example.com/a/?b=2&a=1");
    }

    #[test]
    fn test_target_url_ignores_extra_fields() {
        let url = target_url(Some(r#"{"url":"https://example.com","lang":"ko"}"#)).unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[test]
    fn test_missing_body() {
        assert_invalid(target_url(None));
        assert_invalid(target_url(Some("")));
    }

    #[test]
    fn test_unparsable_body() {
        assert_invalid(target_url(Some("url=https://example.com")));
        assert_invalid(target_url(Some("null")));
        assert_invalid(target_url(Some("[]")));
    }

    #[test]
    fn test_non_object_body() {
        assert_invalid(target_url(Some(r#"["https://example.com/a"]"#)));
        assert_invalid(target_url(Some(r#""https://example.com/a""#)));
        assert_invalid(target_url(Some("42")));
    }

    #[test]
    fn test_missing_url_field() {
        assert_invalid(target_url(Some(r#"{"link":"https://example.com"}"#)));
    }

    #[test]
    fn test_unusable_url_field() {
        assert_invalid(target_url(Some(r#"{"url":""}"#)));
        assert_invalid(target_url(Some(r#"{"url":null}"#)));
        assert_invalid(target_url(Some(r#"{"url":42}"#)));
        assert_invalid(target_url(Some(r#"{"url":["https://example.com"]}"#)));
    }
}
