//! ProbeClient: the two-round connectivity test against an RPC service.
//!
//! # How the handshake works (for beginners)
//!
//! The RPC service refuses any request that lacks a valid session token, and
//! the only way to get a token is to be refused:
//!
//! 1. Connect and send the request without a token.
//! 2. Read the status line and headers.  A `401` means bad credentials and
//!    ends the probe.  Otherwise the `X-Transmission-Session-Id` header must
//!    be present.
//! 3. Drain what is left of that response, close the connection and open a
//!    fresh one.
//! 4. Send the same request with the token.
//! 5. Read the full response and pull the transfer rates out of the JSON.
//!
//! Every step that can fail ends the probe with one [`ProbeOutcome`].  No step
//! is retried.
//!
//! Each response read is bounded by 3 s.  Each connect gets its own 3 s bound
//! as well, instead of relying on the operating system's connect timeout, and
//! the first-round drain is capped at 250 ms.  A probe against a host that
//! accepts nothing and answers nothing therefore returns in a little over
//! 12 s at worst, not the 6 s two read bounds alone would give.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use nodelink_core::protocol::{
    build_request, format_speed, parse_head, parse_reply, HeadError, ResponseHead,
};
use nodelink_core::timing::{with_deadline, Waited};
use nodelink_core::{ProbeOutcome, ProbePhase, ProtocolFault, ReadStage, RpcTarget};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::ports::{Connector, Prober};

/// Default bound on each connect.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound on each response read.
pub const READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Responses larger than this are cut off; a stats reply is a few hundred bytes.
const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Upper bound on draining the first response before closing it.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

const READ_CHUNK: usize = 2048;

/// Why reading a response head stopped short.
#[derive(Debug, Error)]
enum HeadReadError {
    #[error("connection closed before the header block ended")]
    Closed,
    #[error(transparent)]
    Malformed(HeadError),
    #[error("header block larger than {MAX_RESPONSE_BYTES} bytes")]
    TooLarge,
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// Runs probes over connections opened by `C`.
pub struct ProbeClient<C: Connector> {
    connector: C,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl<C: Connector> ProbeClient<C> {
    /// Creates a client with the standard 3 s bounds.
    pub fn new(connector: C) -> Self {
        Self::with_timeouts(connector, CONNECT_TIMEOUT, READ_TIMEOUT)
    }

    pub fn with_timeouts(connector: C, connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connector,
            connect_timeout,
            read_timeout,
        }
    }

    /// Runs one probe against `target`.
    ///
    /// Never fails: every error is folded into the returned outcome.
    pub async fn probe(&self, target: &RpcTarget) -> ProbeOutcome {
        let probe_id = Uuid::new_v4();
        let span = info_span!("probe", %probe_id, host = %target.host, port = target.port);

        async {
            let outcome = self.run(target).await;
            match outcome.failure_class() {
                None => info!(%outcome, "probe finished"),
                Some(class) => warn!(?class, %outcome, "probe failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, target: &RpcTarget) -> ProbeOutcome {
        // ── Round 1: fetch a session token ────────────────────────────────────
        let Some(mut first) = self.connect(target).await else {
            return ProbeOutcome::ConnectFailed {
                phase: ProbePhase::Initial,
            };
        };

        if let Err(e) = first.write_all(&build_request(target, None)).await {
            debug!("first request write failed: {e}");
            return ProbeOutcome::ConnectFailed {
                phase: ProbePhase::Initial,
            };
        }

        let head = match with_deadline(self.read_timeout, read_head(&mut first)).await {
            Waited::TimedOut => {
                return ProbeOutcome::Timeout {
                    stage: ReadStage::FirstResponse,
                }
            }
            Waited::Ready(Ok(head)) => head,
            Waited::Ready(Err(e)) => {
                // Whatever arrived carried no usable token.
                debug!("first response unreadable: {e}");
                return ProbeOutcome::ProtocolError {
                    fault: ProtocolFault::MissingSessionToken,
                };
            }
        };
        debug!(status = head.status, "first response head received");

        if with_deadline(DRAIN_TIMEOUT, drain(&mut first)).await.is_timed_out() {
            debug!("first response still open after {DRAIN_TIMEOUT:?}; closing anyway");
        }
        let _ = first.shutdown().await;
        drop(first);

        if head.is_unauthorized() {
            return ProbeOutcome::AuthFailed;
        }
        let Some(token) = head.session_token else {
            return ProbeOutcome::ProtocolError {
                fault: ProtocolFault::MissingSessionToken,
            };
        };

        // ── Round 2: the real request, on a fresh connection ──────────────────
        let Some(mut second) = self.connect(target).await else {
            return ProbeOutcome::ConnectFailed {
                phase: ProbePhase::Retry,
            };
        };

        if let Err(e) = second.write_all(&build_request(target, Some(&token))).await {
            debug!("second request write failed: {e}");
            return ProbeOutcome::ConnectFailed {
                phase: ProbePhase::Retry,
            };
        }
        drop(token);

        let response = match with_deadline(self.read_timeout, read_response(&mut second)).await {
            Waited::TimedOut => {
                return ProbeOutcome::Timeout {
                    stage: ReadStage::SecondResponse,
                }
            }
            Waited::Ready(Ok(bytes)) => bytes,
            Waited::Ready(Err(e)) => {
                debug!("second response read failed: {e}");
                return ProbeOutcome::ProtocolError {
                    fault: ProtocolFault::InvalidBody,
                };
            }
        };
        let _ = second.shutdown().await;

        interpret_reply(&response)
    }

    /// Opens a connection, bounded by the connect timeout.
    async fn connect(&self, target: &RpcTarget) -> Option<C::Stream> {
        match with_deadline(
            self.connect_timeout,
            self.connector.connect(&target.host, target.port),
        )
        .await
        {
            Waited::Ready(Ok(stream)) => Some(stream),
            Waited::Ready(Err(e)) => {
                debug!("connect failed: {e}");
                None
            }
            Waited::TimedOut => {
                debug!("connect timed out after {:?}", self.connect_timeout);
                None
            }
        }
    }
}

#[async_trait]
impl<C: Connector> Prober for ProbeClient<C> {
    async fn probe(&self, target: &RpcTarget) -> ProbeOutcome {
        ProbeClient::probe(self, target).await
    }
}

/// Reads until the status line and headers are complete.
async fn read_head<S>(stream: &mut S) -> Result<ResponseHead, HeadReadError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(HeadReadError::Closed);
        }
        buf.extend_from_slice(&chunk[..n]);
        match parse_head(&buf) {
            Ok(head) => return Ok(head),
            Err(HeadError::Incomplete) if buf.len() < MAX_RESPONSE_BYTES => continue,
            Err(HeadError::Incomplete) => return Err(HeadReadError::TooLarge),
            Err(e) => return Err(HeadReadError::Malformed(e)),
        }
    }
}

/// Discards unread bytes until EOF, a read error, or [`MAX_RESPONSE_BYTES`].
async fn drain<S>(stream: &mut S)
where
    S: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK];
    let mut drained = 0;
    while drained < MAX_RESPONSE_BYTES {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => drained += n,
        }
    }
    if drained > 0 {
        debug!(bytes = drained, "drained first response");
    }
}

/// Reads a whole response: until EOF, or until the declared body has arrived.
async fn read_response<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() >= MAX_RESPONSE_BYTES {
            break;
        }
        if let Ok(head) = parse_head(&buf) {
            if head.body_complete(buf.len()) {
                break;
            }
        }
    }
    Ok(buf)
}

/// Turns the raw second response into the final outcome.
fn interpret_reply(response: &[u8]) -> ProbeOutcome {
    let invalid = ProbeOutcome::ProtocolError {
        fault: ProtocolFault::InvalidBody,
    };
    let body = match parse_head(response) {
        Ok(head) => &response[head.head_len..],
        Err(e) => {
            debug!("second response head unusable: {e}");
            return invalid;
        }
    };
    match parse_reply(body) {
        Ok(reply) if reply.is_success() => ProbeOutcome::Success {
            download_display: format_speed(reply.download_speed),
            upload_display: format_speed(reply.upload_speed),
        },
        Ok(reply) => ProbeOutcome::ProtocolError {
            fault: ProtocolFault::Rpc(reply.result),
        },
        Err(e) => {
            debug!("second response body unusable: {e}");
            invalid
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
