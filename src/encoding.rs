//! Character encoding detection for saved page snapshots.
//!
//! Pages handed to the clipper as raw bytes (a saved `.html` file, a host
//! piping a response body) are decoded to UTF-8 before parsing. A byte-order
//! mark wins, then a `<meta>` charset declaration in the first kilobyte, then
//! UTF-8.

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// `<meta charset=...>` or `<meta http-equiv=Content-Type content="...; charset=...">`.
#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s;>]+)"#).expect("valid regex")
});

/// How far into the document a charset declaration is looked for.
const SNIFF_LIMIT: usize = 1024;

/// Detect the character encoding of an HTML document.
#[must_use]
pub fn sniff_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LIMIT)]);
    META_CHARSET_RE
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode HTML bytes to a UTF-8 string.
///
/// Malformed sequences become U+FFFD; decoding never fails.
#[must_use]
pub fn decode_html(html: &[u8]) -> Cow<'_, str> {
    let encoding = sniff_encoding(html);
    let (decoded, used, had_errors) = encoding.decode(html);
    if had_errors {
        tracing::debug!(encoding = used.name(), "page bytes contained malformed sequences");
    }
    decoded
}
