//! Response body types
//!
//! File bodies are streamed chunk by chunk from disk. A compression
//! transform, when selected, sits between the file stream and the socket.
//! Dropping the body (client gone, connection error) drops the file handle
//! and the encoder with it.

use crate::http::encoding::Encoding;
use crate::http::range::ByteRange;
use bytes::Bytes;
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use futures_util::{Stream, StreamExt, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use std::io::{self, SeekFrom, Write};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Body type of every response produced by the server
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// In-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty body (304, HEAD)
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Whole file, streamed and capped at the `size` seen by stat so the body
/// never outgrows its `Content-Length`
pub fn file(file: File, size: u64) -> ResponseBody {
    from_stream(ReaderStream::new(file.take(size)))
}

/// Whole file piped through a compression transform
pub fn compressed_file(file: File, encoding: Encoding) -> ResponseBody {
    from_stream(CompressStream::new(ReaderStream::new(file), encoding))
}

/// Byte window of a file
pub async fn file_range(mut file: File, range: ByteRange) -> io::Result<ResponseBody> {
    file.seek(SeekFrom::Start(range.start)).await?;
    Ok(from_stream(ReaderStream::new(file.take(range.len()))))
}

fn from_stream<S>(stream: S) -> ResponseBody
where
    S: Stream<Item = io::Result<Bytes>> + Send + 'static,
{
    let frames = stream
        .inspect_err(|e| tracing::warn!(error = %e, "response stream aborted"))
        .map_ok(Frame::data);
    StreamBody::new(frames).boxed_unsync()
}

/// Streaming compressor writing into an in-memory buffer that is drained
/// after every input chunk
enum Compressor {
    Gzip(GzEncoder<Vec<u8>>),
    Deflate(ZlibEncoder<Vec<u8>>),
}

impl Compressor {
    fn new(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Gzip => Self::Gzip(GzEncoder::new(Vec::new(), Compression::default())),
            Encoding::Deflate => {
                Self::Deflate(ZlibEncoder::new(Vec::new(), Compression::default()))
            }
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<Bytes> {
        let buf = match self {
            Self::Gzip(encoder) => {
                encoder.write_all(chunk)?;
                std::mem::take(encoder.get_mut())
            }
            Self::Deflate(encoder) => {
                encoder.write_all(chunk)?;
                std::mem::take(encoder.get_mut())
            }
        };
        Ok(Bytes::from(buf))
    }

    fn finish(self) -> io::Result<Bytes> {
        let buf = match self {
            Self::Gzip(encoder) => encoder.finish()?,
            Self::Deflate(encoder) => encoder.finish()?,
        };
        Ok(Bytes::from(buf))
    }
}

/// Stream adapter compressing every chunk of `inner`
struct CompressStream<S> {
    inner: S,
    /// `None` once the trailer has been emitted or an error occurred
    encoder: Option<Compressor>,
}

impl<S> CompressStream<S> {
    fn new(inner: S, encoding: Encoding) -> Self {
        Self {
            inner,
            encoder: Some(Compressor::new(encoding)),
        }
    }
}

impl<S> Stream for CompressStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(encoder) = this.encoder.as_mut() else {
                return Poll::Ready(None);
            };

            let result = match ready!(this.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => encoder.write_chunk(&chunk),
                Some(Err(err)) => Err(err),
                None => match this.encoder.take() {
                    Some(encoder) => encoder.finish(),
                    None => return Poll::Ready(None),
                },
            };

            match result {
                // deflate buffers small inputs internally
                Ok(out) if out.is_empty() => {}
                Ok(out) => return Poll::Ready(Some(Ok(out))),
                Err(err) => {
                    this.encoder = None;
                    return Poll::Ready(Some(Err(err)));
                }
            }
        }
    }
}
