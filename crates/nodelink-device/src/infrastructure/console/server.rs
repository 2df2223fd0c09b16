//! Browser console HTTP server: accept loop and per-connection handling.
//!
//! A very small HTTP/1.1 server.  Every exchange is one
//! request and one response followed by `Connection: close`, which is all the
//! two console pages need.
//!
//! 1. The accept loop polls a shared `running` flag between 200 ms accept
//!    attempts, so shutdown never waits on an idle listener.
//! 2. Each connection gets its own task.  The request head is parsed with
//!    `httparse`; a body is read up to its `Content-Length`.  The whole request
//!    must arrive within 5 s.
//! 3. [`routes::dispatch`](super::routes::dispatch) turns the request into a
//!    console command, queues it for the control loop, and waits for the
//!    reply.
//!
//! The server holds no device state, so it keeps running across the control
//! loop's soft restarts.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nodelink_core::timing::{with_deadline, Waited};
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::application::commands::ConsoleQueue;
use crate::infrastructure::console::routes;

/// Budget for receiving a complete request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest request (head plus body) the console accepts.
pub const MAX_REQUEST_BYTES: usize = 16 * 1024;

const ACCEPT_POLL: Duration = Duration::from_millis(200);
const MAX_HEADERS: usize = 32;
const READ_CHUNK: usize = 1024;

/// Error type for reading console requests.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("request not complete within {0:?}")]
    Timeout(Duration),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("request larger than {MAX_REQUEST_BYTES} bytes")]
    TooLarge,

    /// The peer closed the connection before sending a whole request.
    #[error("connection closed before the request was complete")]
    Closed,
}

// ── Request / response ────────────────────────────────────────────────────────

/// A parsed console request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    pub body: Vec<u8>,
}

/// A console response, written with `Connection: close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into().into_bytes(),
        }
    }

    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    /// A `200` JSON response, or a `500` if `value` cannot be serialized.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status: 200,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                error!("could not serialize console reply: {e}");
                Self::text(500, "Internal error")
            }
        }
    }

    /// The body as text, lossily decoded.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Serializes status line, headers, and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len()
        );
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

// ── Accept loop ───────────────────────────────────────────────────────────────

/// Runs the accept loop until `running` is cleared.
///
/// The listener is bound by the caller so that a port conflict surfaces as a
/// startup error instead of inside a background task.
pub async fn serve(listener: TcpListener, queue: ConsoleQueue, running: Arc<AtomicBool>) {
    match listener.local_addr() {
        Ok(addr) => info!("console listening on http://{addr}"),
        Err(e) => warn!("console listening on an unknown address: {e}"),
    }

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping console");
            break;
        }

        match tokio::time::timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                debug!("console connection from {peer}");
                let queue = queue.clone();
                tokio::spawn(async move {
                    handle_connection(stream, peer, queue).await;
                });
            }
            Ok(Err(e)) => error!("console accept error: {e}"),
            // No connection in the last poll interval.
            Err(_) => {}
        }
    }
}

async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, queue: ConsoleQueue) {
    let response = match with_deadline(REQUEST_TIMEOUT, read_request(&mut stream)).await {
        Waited::Ready(Ok(request)) => {
            info!(%peer, method = %request.method, path = %request.path, "console request");
            routes::dispatch(&request, &queue).await
        }
        Waited::Ready(Err(ConsoleError::Closed)) => {
            debug!("{peer} closed without a request");
            return;
        }
        Waited::Ready(Err(ConsoleError::TooLarge)) => HttpResponse::text(413, "Request too large"),
        Waited::Ready(Err(e)) => {
            warn!("bad console request from {peer}: {e}");
            HttpResponse::text(400, "Bad request")
        }
        Waited::TimedOut => {
            debug!("{}", ConsoleError::Timeout(REQUEST_TIMEOUT));
            HttpResponse::text(408, "Request timeout")
        }
    };

    if let Err(e) = stream.write_all(&response.to_bytes()).await {
        debug!("could not write console response to {peer}: {e}");
        return;
    }
    // Best effort; the browser may already be gone.
    let _ = stream.shutdown().await;
}

// ── Request parsing ───────────────────────────────────────────────────────────

/// Reads one complete request from `stream`.
pub async fn read_request<S>(stream: &mut S) -> Result<HttpRequest, ConsoleError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ConsoleError::Closed);
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(request) = parse_request(&buf)? {
            return Ok(request);
        }
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(ConsoleError::TooLarge);
        }
    }
}

/// Parses `buf` if it holds a complete request.  `Ok(None)` means "read more".
pub fn parse_request(buf: &[u8]) -> Result<Option<HttpRequest>, ConsoleError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    let head_len = match req.parse(buf) {
        Ok(httparse::Status::Complete(len)) => len,
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(e) => return Err(ConsoleError::Malformed(e.to_string())),
    };

    let content_length = match req
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-length"))
    {
        Some(h) => std::str::from_utf8(h.value)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .ok_or_else(|| ConsoleError::Malformed("bad Content-Length".into()))?,
        None => 0,
    };
    if head_len.saturating_add(content_length) > MAX_REQUEST_BYTES {
        return Err(ConsoleError::TooLarge);
    }
    if buf.len() < head_len + content_length {
        return Ok(None);
    }

    let method = req.method.unwrap_or_default().to_string();
    let target = req.path.unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();
    Ok(Some(HttpRequest {
        method,
        path,
        body: buf[head_len..head_len + content_length].to_vec(),
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
