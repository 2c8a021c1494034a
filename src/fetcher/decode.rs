use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

const SNIFF_BYTES: usize = 4096;

/// Decode a response body to UTF-8.
///
/// The charset comes from the `Content-Type` header, then from a `<meta>` tag
/// in the first 4KB, then from `chardetng`. Malformed sequences are replaced
/// rather than failing the page. Returns the text and the encoding name.
pub fn decode_body(content_type: &str, body: &[u8]) -> (String, &'static str) {
    let encoding = detect_encoding(content_type, body);
    let (decoded, used, _had_errors) = encoding.decode(body);
    (decoded.into_owned(), used.name())
}

fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_BYTES)];
    let head_str = String::from_utf8_lossy(head);

    // Also covers <meta http-equiv="Content-Type" content="text/html; charset=...">
    if let Some(encoding) = label_from(&META_CHARSET_REGEX, &head_str) {
        return encoding;
    }

    if std::str::from_utf8(head).is_ok() {
        return UTF_8;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body.len() <= SNIFF_BYTES);
    detector.guess(None, true)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_ascii_lowercase();
    Encoding::for_label(label.as_bytes())
}
