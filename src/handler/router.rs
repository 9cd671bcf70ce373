//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! building the per-request context, error conversion and access logging.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::{resolve, static_files};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Percent-decoded URL path, `/` when empty
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub accept_encoding: Option<String>,
    pub range_header: Option<String>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            path: resolve::requested_path(parts.uri.path()),
            is_head: parts.method == Method::HEAD,
            if_none_match: header("if-none-match"),
            if_modified_since: header("if-modified-since"),
            accept_encoding: header("accept-encoding"),
            range_header: header("range"),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every failure is turned into a response here; nothing propagates to the
/// connection.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();

    let response = match check_http_method(&parts.method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext::from_parts(&parts);
            match static_files::serve(&ctx, &state).await {
                Ok(resp) => resp,
                Err(err) => {
                    log_serve_error(&err);
                    http::build_error_response(&err)
                }
            }
        }
    };

    if state.access_log() {
        let entry = access_log_entry(&parts, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn log_serve_error(err: &ServeError) {
    match err {
        // Missing files are routine for a file server
        ServeError::NotFound { .. } => tracing::debug!(error = %err, "not found"),
        ServeError::PathEscapesRoot { path } => {
            logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        }
        ServeError::Render(_) => logger::log_error(&err.to_string()),
    }
}

fn access_log_entry(
    parts: &Parts,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = if parts.method == Method::HEAD {
        Some(0)
    } else {
        response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    };
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use std::fs::{self, File};
    use std::io::Read;
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    const PEER: &str = "127.0.0.1:50000";

    struct Fixture {
        _dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    /// Root with a 1000-byte `data.bin`, `a.txt`, `docs/` and a sibling
    /// `secret.txt` outside the root
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();

        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        fs::write(root.join("data.bin"), &data).unwrap();
        fs::write(root.join("a.txt"), b"hello world").unwrap();
        fs::write(root.join("docs/a.txt"), b"a").unwrap();
        fs::create_dir(root.join("docs/b")).unwrap();

        let state = Arc::new(AppState::for_root(root.canonicalize().unwrap()));
        Fixture { _dir: dir, state }
    }

    fn data() -> Vec<u8> {
        (0..1000u32).map(|i| (i % 251) as u8).collect()
    }

    fn set_mtime(path: &Path, secs: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    async fn get(
        fx: &Fixture,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> (Response<ResponseBody>, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder.body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&fx.state), PEER.parse().unwrap())
            .await
            .unwrap();
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (Response::from_parts(parts, http::body::empty()), bytes)
    }

    fn header<'a>(resp: &'a Response<ResponseBody>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_full_file() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::GET, "/a.txt", &[]).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(&body[..], b"hello world");
        assert_eq!(header(&resp, "content-type"), Some("text/plain;charset=utf8"));
        assert_eq!(header(&resp, "cache-control"), Some("max-age=30"));
        assert_eq!(header(&resp, "content-length"), Some("11"));
        assert!(header(&resp, "expires").is_some());
        assert!(header(&resp, "content-range").is_none());
        assert!(header(&resp, "content-encoding").is_none());

        let etag = header(&resp, "etag").unwrap();
        let last_modified = header(&resp, "last-modified").unwrap();
        assert_eq!(etag, format!("{last_modified}11"));
    }

    #[tokio::test]
    async fn test_validators_are_stable() {
        let fx = fixture();
        let (first, _) = get(&fx, Method::GET, "/a.txt", &[]).await;
        let (second, _) = get(&fx, Method::GET, "/a.txt", &[]).await;
        assert_eq!(header(&first, "etag"), header(&second, "etag"));
        assert_eq!(
            header(&first, "last-modified"),
            header(&second, "last-modified")
        );
    }

    #[tokio::test]
    async fn test_conditional_requires_both_validators() {
        let fx = fixture();
        let file = fx.state.root_dir().join("docs/a.txt");
        fs::write(&file, vec![b'x'; 100]).unwrap();
        set_mtime(&file, 1_704_067_200);

        let etag = "Mon, 01 Jan 2024 00:00:00 GMT100";
        let date = "Mon, 01 Jan 2024 00:00:00 GMT";

        let (resp, body) = get(
            &fx,
            Method::GET,
            "/docs/a.txt",
            &[("if-none-match", etag), ("if-modified-since", date)],
        )
        .await;
        assert_eq!(resp.status(), 304);
        assert!(body.is_empty());
        assert_eq!(header(&resp, "etag"), Some(etag));
        assert_eq!(header(&resp, "cache-control"), Some("max-age=30"));

        let (resp, body) = get(
            &fx,
            Method::GET,
            "/docs/a.txt",
            &[
                ("if-none-match", etag),
                ("if-modified-since", "Tue, 02 Jan 2024 00:00:00 GMT"),
            ],
        )
        .await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body.len(), 100);

        let (resp, _) = get(
            &fx,
            Method::GET,
            "/docs/a.txt",
            &[("if-none-match", "stale"), ("if-modified-since", date)],
        )
        .await;
        assert_eq!(resp.status(), 200);

        let (resp, _) = get(&fx, Method::GET, "/docs/a.txt", &[("if-none-match", etag)]).await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_range_window() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::GET, "/data.bin", &[("range", "bytes=100-199")]).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(header(&resp, "content-range"), Some("bytes 100-199/1000"));
        assert_eq!(header(&resp, "accept-ranges"), Some("bytes"));
        assert_eq!(header(&resp, "content-length"), Some("100"));
        assert_eq!(&body[..], &data()[100..200]);
    }

    #[tokio::test]
    async fn test_range_default_fill() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::GET, "/data.bin", &[("range", "bytes=500-")]).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(header(&resp, "content-range"), Some("bytes 500-999/1000"));
        assert_eq!(body.len(), 500);

        // Missing start defaults to 0; this is not a suffix range
        let (resp, body) = get(&fx, Method::GET, "/data.bin", &[("range", "bytes=-200")]).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(header(&resp, "content-range"), Some("bytes 0-999/1000"));
        assert_eq!(body.len(), 1000);
    }

    #[tokio::test]
    async fn test_unsatisfiable_range_sends_full_body() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::GET, "/data.bin", &[("range", "bytes=2000-")]).await;
        assert_eq!(resp.status(), 200);
        assert!(header(&resp, "content-range").is_none());
        assert_eq!(body.len(), 1000);
    }

    #[tokio::test]
    async fn test_gzip_preferred_and_beats_range() {
        let fx = fixture();
        let (resp, body) = get(
            &fx,
            Method::GET,
            "/data.bin",
            &[("accept-encoding", "deflate, gzip"), ("range", "bytes=0-99")],
        )
        .await;
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-encoding"), Some("gzip"));
        assert!(header(&resp, "content-range").is_none());
        assert!(header(&resp, "content-length").is_none());

        let mut decoded = Vec::new();
        GzDecoder::new(&body[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, data());
    }

    #[tokio::test]
    async fn test_deflate_when_gzip_absent() {
        let fx = fixture();
        let (resp, body) =
            get(&fx, Method::GET, "/a.txt", &[("accept-encoding", "deflate")]).await;
        assert_eq!(header(&resp, "content-encoding"), Some("deflate"));

        let mut decoded = String::new();
        flate2::read::ZlibDecoder::new(&body[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "hello world");
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::GET, "/docs", &[]).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-type"), Some("text/html; charset=utf8"));
        assert!(header(&resp, "etag").is_none());
        assert!(header(&resp, "cache-control").is_none());

        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(">a.txt</a>"));
        assert!(html.contains(">b</a>"));
    }

    #[tokio::test]
    async fn test_directory_listing_ignores_encoding_and_range() {
        let fx = fixture();
        let (resp, _) = get(
            &fx,
            Method::GET,
            "/",
            &[("accept-encoding", "gzip"), ("range", "bytes=0-10")],
        )
        .await;
        assert_eq!(resp.status(), 200);
        assert!(header(&resp, "content-encoding").is_none());
        assert!(header(&resp, "content-range").is_none());
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::GET, "/a.txt?v=3", &[]).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(&body[..], b"hello world");
    }

    #[tokio::test]
    async fn test_missing_file_is_404_with_message() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::GET, "/nope.txt", &[]).await;
        assert_eq!(resp.status(), 404);
        let message = String::from_utf8(body.to_vec()).unwrap();
        assert!(message.contains("stat '/nope.txt'"), "{message}");
    }

    #[tokio::test]
    async fn test_traversal_never_serves_outside_root() {
        let fx = fixture();
        for uri in [
            "/../secret.txt",
            "/docs/../../secret.txt",
            "/%2e%2e/secret.txt",
            "/docs/%2E%2E/%2e%2e/secret.txt",
            "/..%2fsecret.txt",
        ] {
            let (resp, body) = get(&fx, Method::GET, uri, &[]).await;
            assert_eq!(resp.status(), 404, "{uri}");
            assert!(
                !body.windows(10).any(|w| w == b"top secret"),
                "{uri} leaked a file outside the root"
            );
        }
    }

    #[tokio::test]
    async fn test_trailing_slash_on_file_is_404() {
        let fx = fixture();
        let (resp, _) = get(&fx, Method::GET, "/a.txt/", &[]).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_full_body_capped_at_stat_size() {
        let fx = fixture();
        let file = fx.state.root_dir().join("log.txt");
        fs::write(&file, vec![b'a'; 1000]).unwrap();

        let req = Request::builder().uri("/log.txt").body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&fx.state), PEER.parse().unwrap())
            .await
            .unwrap();

        // The file keeps growing after headers were built
        let mut appender = File::options().append(true).open(&file).unwrap();
        std::io::Write::write_all(&mut appender, &[b'b'; 500]).unwrap();
        drop(appender);

        assert_eq!(header(&resp, "content-length"), Some("1000"));
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.len(), 1000);
        assert!(body.iter().all(|&b| b == b'a'));
    }

    #[tokio::test]
    async fn test_head_sends_headers_only() {
        let fx = fixture();
        let (resp, body) = get(&fx, Method::HEAD, "/data.bin", &[]).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-length"), Some("1000"));
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_other_methods() {
        let fx = fixture();
        let (resp, _) = get(&fx, Method::POST, "/a.txt", &[]).await;
        assert_eq!(resp.status(), 405);
        assert_eq!(header(&resp, "allow"), Some("GET, HEAD, OPTIONS"));

        let (resp, _) = get(&fx, Method::OPTIONS, "/a.txt", &[]).await;
        assert_eq!(resp.status(), 204);
    }

    #[test]
    fn test_context_from_parts() {
        let (parts, ()) = Request::builder()
            .method(Method::HEAD)
            .uri("/a%20b.txt?x=1")
            .header("Range", "bytes=1-2")
            .header("Accept-Encoding", "gzip")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = RequestContext::from_parts(&parts);
        assert_eq!(ctx.path, "/a b.txt");
        assert!(ctx.is_head);
        assert_eq!(ctx.range_header.as_deref(), Some("bytes=1-2"));
        assert_eq!(ctx.accept_encoding.as_deref(), Some("gzip"));
        assert_eq!(ctx.if_none_match, None);
    }
}
