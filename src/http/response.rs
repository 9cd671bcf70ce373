//! HTTP response building module
//!
//! Builders for the non-file responses: errors, method handling and HTML
//! pages.

use crate::error::ServeError;
use crate::http::body::{self, ResponseBody};
use hyper::Response;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Content-Type of rendered directory listings
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf8";

/// Build the response for a failed request: status from the error kind, body
/// is the human-readable error text
pub fn build_error_response(err: &ServeError) -> Response<ResponseBody> {
    let message = err.to_string();
    Response::builder()
        .status(err.status())
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", message.len())
        .body(body::full(message))
        .unwrap_or_else(|e| {
            log_build_error("error", &e);
            Response::new(body::empty())
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", ALLOWED_METHODS)
        .body(body::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(body::full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS)
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(body::empty())
        })
}

/// Build HTML page response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        body::empty()
    } else {
        body::full(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", HTML_CONTENT_TYPE)
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(body::empty())
        })
}

/// Log response build error
pub fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
