//! The anti-forgery session token.

use std::fmt;

/// Header that carries the token in both directions.  Matched case-sensitively.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// A token issued by the RPC service on the first round trip of a probe.
///
/// Neither `Clone` nor serializable: a token lives inside a
/// single probe call and is dropped with it.
#[derive(PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw header value, trimming surrounding whitespace.
    ///
    /// Returns `None` if nothing is left after trimming.
    pub fn from_header_value(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens authorize requests; keep them out of logs.
        write!(f, "SessionToken(<{} chars>)", self.0.len())
    }
}
