//! The single persistent connection a session runs over.
//!
//! Wraps any `AsyncRead + AsyncWrite` stream. Incoming bytes are framed on
//! `\n` and bounded to `MAX_LINE`; outgoing lines are written verbatim.

use crate::protocol::{Line, MAX_LINE};
use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Read buffer capacity
const BUFFER_SIZE: usize = 4 * MAX_LINE;

/// Outcome of a successful receive.
#[derive(Debug, PartialEq, Eq)]
pub enum Received {
    /// One line from the peer.
    Line(Line),
    /// The peer closed its side and nothing is left buffered.
    Closed,
}

/// A chat connection over a byte stream.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    closed: bool,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(BUFFER_SIZE),
            closed: false,
        }
    }

    /// Write one line and flush it.
    pub async fn send(&mut self, line: &Line) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already closed",
            ));
        }
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await?;
        trace!(bytes = line.len(), "Sent line");
        Ok(line.len())
    }

    /// Wait for the next line from the peer.
    ///
    /// Blocks until a full line, `MAX_LINE` bytes without a delimiter, or end
    /// of stream. Bytes still buffered when the peer closes are delivered as
    /// a final line before `Received::Closed`.
    pub async fn receive(&mut self) -> io::Result<Received> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already closed",
            ));
        }

        loop {
            if let Some(line) = self.take_line() {
                return Ok(Received::Line(line));
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                if self.buffer.is_empty() {
                    trace!("Connection closed by peer");
                    return Ok(Received::Closed);
                }
                let rest = self.buffer.split().freeze();
                return Ok(Received::Line(Line::from_wire(rest)));
            }
        }
    }

    /// Shut down the write half. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.shutdown().await {
            trace!(error = %e, "Shutdown after close failed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn take_line(&mut self) -> Option<Line> {
        let end = match self.buffer.iter().take(MAX_LINE).position(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None if self.buffer.len() >= MAX_LINE => MAX_LINE,
            None => return None,
        };
        Some(Line::from_wire(self.buffer.split_to(end).freeze()))
    }
}
