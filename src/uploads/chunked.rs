//! Chunked transfer encoding support
//!
//! Streamed bodies (files, stdin, multipart) go out with unknown or
//! separately declared length. When trailers are requested the body is
//! wrapped so its final frame carries them after the last data chunk.

use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::HeaderMap;
use http_body::Frame;
use http_body_util::StreamBody;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::uploads::pipe::{pipe, PipeReader};

/// Default read size for streamed uploads (100KB)
pub const CHUNK_SIZE: usize = 100 * 1024;

/// A request body produced incrementally
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync>>;

/// Stream `reader` in [`CHUNK_SIZE`] pieces.
///
/// The reader is drained on its own task, so it only needs to be `Send`.
/// A read error ends the stream with that error.
pub fn stream_reader<R>(reader: R) -> PipeReader
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (writer, stream) = pipe();
    tokio::spawn(async move {
        let mut chunks = ReaderStream::with_capacity(reader, CHUNK_SIZE);
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    if writer.write(bytes).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    writer.close_with_error(e).await;
                    return;
                }
            }
        }
    });
    stream
}

/// A stream yielding `bytes` once
pub fn once_stream(bytes: Bytes) -> ByteStream {
    Box::pin(futures::stream::once(futures::future::ready(Ok::<_, io::Error>(bytes))))
}

/// Whether a `Transfer-Encoding` value asks for chunked framing
pub fn is_chunked_encoding(value: &str) -> bool {
    value
        .split(',')
        .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
}

/// Build a body that sends `stream` and then `trailers`
pub fn body_with_trailers(stream: ByteStream, trailers: HeaderMap) -> reqwest::Body {
    let frames = stream
        .map(|chunk| chunk.map(Frame::data))
        .chain(futures::stream::once(futures::future::ready(Ok(
            Frame::trailers(trailers),
        ))));
    reqwest::Body::wrap(StreamBody::new(frames))
}
