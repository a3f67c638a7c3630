//! Charset resolution and decoding of fetched pages.
//!
//! Resolution order:
//! 1. `charset` parameter of the `Content-Type` header
//! 2. Byte order mark
//! 3. `<meta charset>` or `<meta http-equiv="Content-Type">` within the first
//!    [`PRESCAN_BYTES`] bytes
//!
//! Labels go through the WHATWG label table, so `ks_c_5601-1987` resolves to
//! EUC-KR and `latin1` to windows-1252. An unknown label counts as no answer.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use regex::bytes::Regex;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

/// How far into the body a meta declaration is searched for.
pub const PRESCAN_BYTES: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).expect("invalid charset pattern")
});

/// Determine the encoding of a response, or `None` when nothing declares one.
pub fn resolve(headers: &HeaderMap, body: &[u8]) -> Option<&'static Encoding> {
    let from_header = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(from_content_type);

    from_header
        .or_else(|| Encoding::for_bom(body).map(|(encoding, _)| encoding))
        .or_else(|| sniff_meta(body))
}

/// Encoding named by a `Content-Type` value's `charset` parameter.
pub fn from_content_type(value: &str) -> Option<&'static Encoding> {
    value
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, label)| Encoding::for_label(label.trim().trim_matches(['"', '\'']).as_bytes()))
}

/// Encoding declared by a `<meta>` tag near the top of the document.
///
/// A declared UTF-16 is read as UTF-8: a document that could be scanned as
/// ASCII here is not actually UTF-16.
pub fn sniff_meta(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(PRESCAN_BYTES)];
    let label = META_CHARSET.captures(head)?.get(1)?.as_bytes();

    Encoding::for_label(label).map(|encoding| {
        if encoding == UTF_16LE || encoding == UTF_16BE { UTF_8 } else { encoding }
    })
}

/// Decode `body` with `encoding`. Malformed sequences become U+FFFD.
pub fn decode(encoding: &'static Encoding, body: &[u8]) -> String {
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = used.name(), "decoded with replacement characters");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{EUC_KR, SHIFT_JIS, WINDOWS_1252};
    use reqwest::header::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_from_content_type() {
        assert_eq!(from_content_type("text/html; charset=euc-kr"), Some(EUC_KR));
        assert_eq!(from_content_type("text/html;charset=\"UTF-8\""), Some(UTF_8));
        assert_eq!(from_content_type("text/html; Charset = Shift_JIS"), Some(SHIFT_JIS));
    }

    #[test]
    fn test_from_content_type_missing_or_unknown() {
        assert_eq!(from_content_type("text/html"), None);
        assert_eq!(from_content_type("text/html; charset=klingon"), None);
    }

    #[test]
    fn test_whatwg_aliases() {
        assert_eq!(from_content_type("text/html; charset=ks_c_5601-1987"), Some(EUC_KR));
        assert_eq!(from_content_type("text/html; charset=latin1"), Some(WINDOWS_1252));
    }

    #[test]
    fn test_sniff_meta_charset() {
        let body = br#"<html><head><meta charset="euc-kr"><title>t</title>"#;
        assert_eq!(sniff_meta(body), Some(EUC_KR));
    }

    #[test]
    fn test_sniff_meta_http_equiv() {
        let body = br#"<HTML><HEAD><META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=Shift_JIS">"#;
        assert_eq!(sniff_meta(body), Some(SHIFT_JIS));
    }

    #[test]
    fn test_sniff_meta_outside_prescan() {
        let mut body = vec![b' '; PRESCAN_BYTES];
        body.extend_from_slice(br#"<meta charset="euc-kr">"#);
        assert_eq!(sniff_meta(&body), None);
    }

    #[test]
    fn test_sniff_meta_utf16_reads_as_utf8() {
        assert_eq!(sniff_meta(br#"<meta charset="utf-16">"#), Some(UTF_8));
    }

    #[test]
    fn test_resolve_prefers_header() {
        let body = br#"<meta charset="euc-kr">"#;
        assert_eq!(resolve(&headers("text/html; charset=utf-8"), body), Some(UTF_8));
    }

    #[test]
    fn test_resolve_falls_back_to_bom_then_meta() {
        let plain = headers("text/html");
        assert_eq!(resolve(&plain, b"\xEF\xBB\xBF<html>"), Some(UTF_8));
        assert_eq!(resolve(&plain, br#"<meta charset="euc-kr">"#), Some(EUC_KR));
    }

    #[test]
    fn test_resolve_nothing_declared() {
        assert_eq!(resolve(&HeaderMap::new(), b"<html><head></head></html>"), None);
    }

    #[test]
    fn test_decode_euc_kr() {
        let (bytes, _, _) = EUC_KR.encode("안녕하세요");
        assert_eq!(decode(EUC_KR, &bytes), "안녕하세요");
    }

    #[test]
    fn test_decode_replaces_malformed() {
        assert_eq!(decode(UTF_8, b"a\xFFb"), "a\u{FFFD}b");
    }
}
