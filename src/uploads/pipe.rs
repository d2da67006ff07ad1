//! Bounded in-process byte pipe
//!
//! A producer task pushes chunks into a [`PipeWriter`] while the transport
//! drains the paired [`PipeReader`] as a body stream. The channel holds a
//! single chunk, so the producer waits until the transport has taken the
//! previous one. A producer failure is delivered to the reader as its final
//! item, so the transport sees a read error instead of a short body.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc;

/// Chunks buffered between producer and consumer
const PIPE_CAPACITY: usize = 1;

/// Create a connected writer/reader pair
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel(PIPE_CAPACITY);
    (PipeWriter { tx }, PipeReader { rx })
}

/// Producer half. Dropping it closes the pipe cleanly (EOF).
#[derive(Debug)]
pub struct PipeWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl PipeWriter {
    /// Send one chunk, waiting for room.
    ///
    /// Fails with `BrokenPipe` once the reader is gone, which is how a
    /// producer learns that the transport aborted the request.
    pub async fn write(&self, chunk: impl Into<Bytes>) -> io::Result<()> {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return Ok(());
        }
        self.tx
            .send(Ok(chunk))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader closed"))
    }

    /// Close the pipe so the reader's next item is `err`
    pub async fn close_with_error(self, err: io::Error) {
        // The reader may already be gone; nobody is left to tell.
        let _ = self.tx.send(Err(err)).await;
    }
}

/// Consumer half, a stream of body chunks
#[derive(Debug)]
pub struct PipeReader {
    rx: mpsc::Receiver<io::Result<Bytes>>,
}

impl Stream for PipeReader {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
