//! HTTP Range request parsing module
//!
//! Single `bytes=<start>-<end>` ranges with lenient defaults: a missing or
//! unparsable bound falls back to the start or end of the file instead of
//! rejecting the request.

/// Inclusive byte window within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset
    pub start: u64,
    /// Last byte offset (inclusive), always `<= file_size - 1`
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the window
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a file of `file_size` bytes
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Non-empty window inside the file
    Valid(ByteRange),
    /// Header present but the window is empty (start past end, or empty file);
    /// the full body is served instead
    Empty,
    /// No Range header
    None,
}

/// Parse the `Range` header against a file of `file_size` bytes.
///
/// Fallback rules:
/// - a `bytes=` prefix is optional
/// - `start` is the run of digits right before the first `-`; missing or
///   unparsable means `0`
/// - `end` is the run of digits right after it; missing or unparsable means
///   `file_size - 1`
/// - a missing or unparsable `start` also discards `end`, so the window runs
///   to the last byte
/// - no `-` at all means both defaults
/// - `end` past the file is clamped to the last byte
///
/// So `bytes=-200` selects the whole file, not the last 200 bytes.
///
/// # Examples
/// ```
/// use static_server::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=500-"), 1000);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 500, end: 999 }));
///
/// let result = parse_range_header(None, 1000);
/// assert_eq!(result, RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let header = header.trim();
    let spec = header.strip_prefix("bytes=").unwrap_or(header);
    let (start_str, end_str) = spec.split_once('-').unwrap_or(("", ""));

    let Some(last) = file_size.checked_sub(1) else {
        return RangeParseResult::Empty;
    };

    let (start, end) = match trailing_digits(start_str).parse::<u64>() {
        Ok(start) => {
            let end = leading_digits(end_str)
                .parse::<u64>()
                .map_or(last, |e| e.min(last));
            (start, end)
        }
        Err(_) => (0, last),
    };

    if start > end {
        return RangeParseResult::Empty;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}

fn trailing_digits(s: &str) -> &str {
    let s = s.trim_end();
    &s[s.trim_end_matches(|c: char| c.is_ascii_digit()).len()..]
}

fn leading_digits(s: &str) -> &str {
    let s = s.trim_start();
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..len]
}
