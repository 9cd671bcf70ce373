//! Content-Encoding negotiation
//!
//! Fixed precedence gzip > deflate > identity; quality values in
//! `Accept-Encoding` are not consulted.

use std::fmt;

/// Compression transform applied to a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    /// zlib-wrapped deflate stream
    Deflate,
}

impl Encoding {
    /// `Content-Encoding` header value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a transform from the `Accept-Encoding` header, `None` for identity
///
/// # Examples
/// ```
/// use static_server::http::encoding::{negotiate, Encoding};
/// assert_eq!(negotiate(Some("deflate, gzip")), Some(Encoding::Gzip));
/// assert_eq!(negotiate(Some("br")), None);
/// ```
pub fn negotiate(accept_encoding: Option<&str>) -> Option<Encoding> {
    let header = accept_encoding?;
    if contains_word(header, "gzip") {
        Some(Encoding::Gzip)
    } else if contains_word(header, "deflate") {
        Some(Encoding::Deflate)
    } else {
        None
    }
}

/// Word-boundary match: `word` delimited by anything other than `[A-Za-z0-9_]`
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|token| token == word)
}
