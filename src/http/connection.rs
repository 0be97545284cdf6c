use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::{Config, ReadMode};
use crate::http::parser::{ParseError, parse_complete_request, parse_http_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::router::Router;

/// Size of the one and only read in [`ReadMode::Single`]. Bytes past this
/// boundary are never seen by the parser.
pub const SINGLE_READ_CAPACITY: usize = 1024;

const READ_CHUNK: usize = 4096;

/// How a connection reads its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSettings {
    pub mode: ReadMode,
    /// Upper bound on buffered bytes in [`ReadMode::Buffered`]
    pub max_request_bytes: usize,
    /// Idle limit for each read; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ReadSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            mode: cfg.read_mode,
            max_request_bytes: cfg.max_request_bytes,
            timeout: cfg.read_timeout,
        }
    }
}

/// One request-response exchange over a client stream.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    router: Arc<Router>,
    settings: ReadSettings,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

enum ReadOutcome {
    Request(Request),
    Malformed(ParseError),
    /// Peer went away before sending anything.
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, settings: ReadSettings) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            router,
            settings,
            state: ConnectionState::Reading,
        }
    }

    /// Drives read, parse, route and write to completion.
    ///
    /// There is no keep-alive: the state machine always ends in `Closed`
    /// after one response. I/O errors end this connection only.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => match self.read_request().await? {
                    ReadOutcome::Request(req) => ConnectionState::Processing(req),
                    ReadOutcome::Malformed(e) => {
                        tracing::warn!(error = %e, "Malformed request");
                        ConnectionState::Writing(ResponseWriter::new(&Response::bad_request()))
                    }
                    ReadOutcome::Closed => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let response = self.router.route(&req).await;

                    tracing::info!(
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        "Request handled"
                    );

                    ConnectionState::Writing(ResponseWriter::new(&response))
                }

                ConnectionState::Writing(mut writer) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(error = %e, "Shutdown after response failed");
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        match self.settings.mode {
            ReadMode::Single => self.read_single().await,
            ReadMode::Buffered => self.read_buffered().await,
        }
    }

    /// Exactly one read; whatever arrived is the whole request.
    async fn read_single(&mut self) -> anyhow::Result<ReadOutcome> {
        let mut temp = [0u8; SINGLE_READ_CAPACITY];
        let n = with_timeout(self.settings.timeout, self.stream.read(&mut temp)).await?;

        if n == 0 {
            return Ok(ReadOutcome::Closed);
        }

        Ok(outcome(parse_complete_request(&temp[..n])))
    }

    /// Reads until the headers and any `Content-Length` body are in.
    async fn read_buffered(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(ReadOutcome::Request(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Ok(ReadOutcome::Malformed(e)),
            }

            if self.buffer.len() >= self.settings.max_request_bytes {
                return Ok(ReadOutcome::Malformed(ParseError::TooLarge));
            }

            // Never read past the cap
            let remaining = self.settings.max_request_bytes - self.buffer.len();
            self.buffer.reserve(READ_CHUNK.min(remaining));
            let mut limited = (&mut self.stream).take(remaining as u64);
            let n = with_timeout(self.settings.timeout, limited.read_buf(&mut self.buffer)).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(ReadOutcome::Closed);
                }
                // Client stopped sending mid-message; take what arrived.
                return Ok(outcome(parse_complete_request(&self.buffer)));
            }

            tracing::debug!(read = n, buffered = self.buffer.len(), "Read request bytes");
        }
    }
}

fn outcome(parsed: Result<Request, ParseError>) -> ReadOutcome {
    match parsed {
        Ok(request) => ReadOutcome::Request(request),
        Err(e) => ReadOutcome::Malformed(e),
    }
}

async fn with_timeout<T>(
    limit: Option<Duration>,
    read: impl Future<Output = std::io::Result<T>>,
) -> anyhow::Result<T> {
    match limit {
        Some(limit) => Ok(timeout(limit, read)
            .await
            .context("timed out waiting for request data")??),
        None => Ok(read.await?),
    }
}
