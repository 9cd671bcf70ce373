//! HTTP protocol layer module
//!
//! Cache validation, range parsing, encoding negotiation, MIME detection and
//! response/body building, independent of how paths are resolved.

pub mod body;
pub mod cache;
pub mod encoding;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use range::parse_range_header;
pub use response::{
    build_405_response, build_error_response, build_html_response, build_options_response,
};
