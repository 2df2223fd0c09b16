//! Staged response parsing.
//!
//! Stage 1 ([`parse_head`]) reads the status line and headers with `httparse`
//! and reports how many bytes they occupied.  Stage 2 ([`parse_reply`]) takes
//! whatever follows the head and extracts the RPC result.  Each stage has its
//! own error enum so callers can tell "not enough bytes yet" apart from
//! "garbage on the wire".

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::protocol::session::{SessionToken, SESSION_ID_HEADER};

/// Upper bound on header count accepted from the service.
const MAX_HEADERS: usize = 32;

/// HTTP status the service returns when credentials are wrong.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Errors from the status-line/header stage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeadError {
    /// The blank line ending the header block has not arrived yet.
    #[error("response head incomplete")]
    Incomplete,

    #[error("malformed response head: {0}")]
    Malformed(String),
}

/// Errors from the body stage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BodyError {
    /// No `{` anywhere after the head.
    #[error("no JSON object in response body")]
    NoJsonStart,

    #[error("invalid JSON in response body: {0}")]
    InvalidJson(String),
}

/// Status line and the headers the probe cares about.
#[derive(Debug)]
pub struct ResponseHead {
    pub status: u16,
    /// Present when the exact header name [`SESSION_ID_HEADER`] carried a
    /// non-blank value.
    pub session_token: Option<SessionToken>,
    pub content_length: Option<usize>,
    /// Bytes occupied by the status line, headers, and the terminating blank line.
    pub head_len: usize,
}

impl ResponseHead {
    pub fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }

    /// Whether `buffered` bytes (head included) hold the whole declared body.
    ///
    /// Always `false` without a `Content-Length`; such responses end at EOF.
    pub fn body_complete(&self, buffered: usize) -> bool {
        match self.content_length {
            Some(len) => buffered >= self.head_len + len,
            None => false,
        }
    }
}

/// Parses the status line and headers at the start of `buf`.
///
/// # Errors
///
/// [`HeadError::Incomplete`] if more bytes are needed, [`HeadError::Malformed`]
/// if the bytes cannot be an HTTP/1.x response.
pub fn parse_head(buf: &[u8]) -> Result<ResponseHead, HeadError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut response = httparse::Response::new(&mut headers);

    let head_len = match response.parse(buf) {
        Ok(httparse::Status::Complete(n)) => n,
        Ok(httparse::Status::Partial) => return Err(HeadError::Incomplete),
        Err(e) => return Err(HeadError::Malformed(e.to_string())),
    };

    let status = response
        .code
        .ok_or_else(|| HeadError::Malformed("missing status code".into()))?;

    let mut session_token = None;
    let mut content_length = None;
    for header in response.headers.iter() {
        if header.name == SESSION_ID_HEADER {
            session_token = std::str::from_utf8(header.value)
                .ok()
                .and_then(SessionToken::from_header_value);
        } else if header.name.eq_ignore_ascii_case("content-length") {
            content_length = std::str::from_utf8(header.value)
                .ok()
                .and_then(|v| v.trim().parse().ok());
        }
    }

    Ok(ResponseHead {
        status,
        session_token,
        content_length,
        head_len,
    })
}

/// The parts of a `session-stats` reply the probe reports.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    /// `"success"` on success, otherwise the service's error text.  A
    /// non-string `result` is kept as its JSON text (`42`, `null`).
    pub result: String,
    /// Bytes per second.
    pub download_speed: f64,
    /// Bytes per second.
    pub upload_speed: f64,
}

impl RpcReply {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

#[derive(Deserialize)]
struct RawReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    arguments: RawArguments,
}

#[derive(Deserialize, Default)]
struct RawArguments {
    #[serde(rename = "downloadSpeed", default)]
    download_speed: f64,
    #[serde(rename = "uploadSpeed", default)]
    upload_speed: f64,
}

/// Extracts the RPC reply from the bytes following the head.
///
/// Parsing starts at the first `{` and stops after the first complete JSON
/// value, so stray bytes before or after the object are tolerated.  Missing
/// speed fields read as zero; a missing `result` reads as `null`.
pub fn parse_reply(body: &[u8]) -> Result<RpcReply, BodyError> {
    let start = body
        .iter()
        .position(|&b| b == b'{')
        .ok_or(BodyError::NoJsonStart)?;

    let raw: RawReply = serde_json::Deserializer::from_slice(&body[start..])
        .into_iter::<RawReply>()
        .next()
        .ok_or(BodyError::NoJsonStart)?
        .map_err(|e| BodyError::InvalidJson(e.to_string()))?;

    let result = match raw.result {
        Value::String(text) => text,
        other => other.to_string(),
    };
    Ok(RpcReply {
        result,
        download_speed: raw.arguments.download_speed,
        upload_speed: raw.arguments.upload_speed,
    })
}
