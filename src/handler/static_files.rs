//! Static content responder
//!
//! Resolves the request path, then answers with either a file (cached,
//! compressed, ranged or whole) or a rendered directory listing.

use crate::config::AppState;
use crate::error::{Result, ServeError};
use crate::handler::resolve::{self, Resolved};
use crate::handler::router::RequestContext;
use crate::http::body::{self, ResponseBody};
use crate::http::cache::{self, CacheValidator};
use crate::http::encoding::{self, Encoding};
use crate::http::range::{ByteRange, RangeParseResult};
use crate::http::{self, mime, response};
use crate::listing::{DirectoryEntry, DirectoryLister};
use hyper::http::response::Builder;
use hyper::Response;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs::{self, File};

/// The one shape a file response takes.
///
/// Selection order is cache, then compression, then range: a compressed
/// response is always the whole file, so a Range header only applies when
/// no transform was negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Client copy is fresh: 304, no body
    NotModified,
    /// Whole file through a compression transform: 200
    Compressed(Encoding),
    /// Byte window of the file: 206
    Partial(ByteRange),
    /// Whole file: 200
    Full,
}

/// Decide how to answer a file request
pub fn select_mode(ctx: &RequestContext, validator: &CacheValidator, size: u64) -> ResponseMode {
    if validator.is_fresh(ctx.if_none_match.as_deref(), ctx.if_modified_since.as_deref()) {
        return ResponseMode::NotModified;
    }

    if let Some(encoding) = encoding::negotiate(ctx.accept_encoding.as_deref()) {
        return ResponseMode::Compressed(encoding);
    }

    match http::parse_range_header(ctx.range_header.as_deref(), size) {
        RangeParseResult::Valid(range) => ResponseMode::Partial(range),
        RangeParseResult::Empty | RangeParseResult::None => ResponseMode::Full,
    }
}

/// Serve whatever the request path points at
pub async fn serve(ctx: &RequestContext, state: &AppState) -> Result<Response<ResponseBody>> {
    let resolved = resolve::resolve(state.root_dir(), &ctx.path).await?;

    if resolved.info.is_dir() {
        serve_directory(ctx, &state.lister, &resolved.path).await
    } else {
        serve_file(ctx, &resolved).await
    }
}

/// Serve a regular file
pub async fn serve_file(ctx: &RequestContext, resolved: &Resolved) -> Result<Response<ResponseBody>> {
    let size = resolved.info.size;
    let validator = CacheValidator::new(resolved.info.modified, size);

    let builder = Response::builder()
        .header("Cache-Control", cache::CACHE_CONTROL)
        .header("Expires", cache::expires_at(SystemTime::now()))
        .header("ETag", validator.etag.as_str())
        .header("Last-Modified", validator.last_modified.as_str());

    let mode = select_mode(ctx, &validator, size);
    if mode == ResponseMode::NotModified {
        return Ok(finish(builder.status(304), body::empty()));
    }

    let builder = builder.header("Content-Type", mime::get_content_type(&resolved.path));
    let builder = match mode {
        ResponseMode::Compressed(encoding) => builder
            .status(200)
            .header("Content-Encoding", encoding.as_str()),
        ResponseMode::Partial(range) => builder
            .status(206)
            .header("Accept-Ranges", "bytes")
            .header("Content-Range", range.content_range(size))
            .header("Content-Length", range.len()),
        ResponseMode::Full | ResponseMode::NotModified => {
            builder.status(200).header("Content-Length", size)
        }
    };

    if ctx.is_head {
        return Ok(finish(builder, body::empty()));
    }

    let file = File::open(&resolved.path)
        .await
        .map_err(|e| ServeError::not_found(ctx.path.as_str(), e))?;

    let body = match mode {
        ResponseMode::Compressed(encoding) => body::compressed_file(file, encoding),
        ResponseMode::Partial(range) => body::file_range(file, range)
            .await
            .map_err(|e| ServeError::not_found(ctx.path.as_str(), e))?,
        ResponseMode::Full | ResponseMode::NotModified => body::file(file, size),
    };

    Ok(finish(builder, body))
}

/// Serve a rendered listing of a directory's immediate children
pub async fn serve_directory(
    ctx: &RequestContext,
    lister: &DirectoryLister,
    dir: &Path,
) -> Result<Response<ResponseBody>> {
    let entries = list_directory(dir, &ctx.path).await?;
    let html = lister.render(&ctx.path, &entries)?;
    Ok(response::build_html_response(html, ctx.is_head))
}

/// Children of `dir` in enumeration order, linked under `requested_path`
pub async fn list_directory(dir: &Path, requested_path: &str) -> Result<Vec<DirectoryEntry>> {
    let not_found = |e| ServeError::not_found(requested_path, e);

    let mut read_dir = fs::read_dir(dir).await.map_err(not_found)?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(not_found)? {
        entries.push(DirectoryEntry::new(
            requested_path,
            entry.file_name().to_string_lossy(),
        ));
    }
    Ok(entries)
}

fn finish(builder: Builder, body: ResponseBody) -> Response<ResponseBody> {
    builder.body(body).unwrap_or_else(|e| {
        response::log_build_error("file", &e);
        Response::new(body::empty())
    })
}
