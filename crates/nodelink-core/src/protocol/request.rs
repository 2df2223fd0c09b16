//! Request encoding for both rounds of the probe.
//!
//! Wire format (CRLF line endings, headers in exactly this order):
//!
//! ```text
//! POST <path> HTTP/1.1
//! Host: <host>
//! Authorization: Basic <base64(user:pass)>     (only with credentials)
//! X-Transmission-Session-Id: <token>           (second round only)
//! Content-Type: application/json
//! Content-Length: 26
//! Connection: close
//!
//! {"method":"session-stats"}
//! ```

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::domain::target::RpcTarget;
use crate::protocol::session::{SessionToken, SESSION_ID_HEADER};

/// The JSON-RPC body sent on both rounds.
pub const RPC_BODY: &str = r#"{"method":"session-stats"}"#;

/// Encodes `username:password` for an `Authorization: Basic` header.
///
/// # Examples
///
/// ```rust
/// use nodelink_core::protocol::basic_auth_value;
///
/// assert_eq!(basic_auth_value("user", "pass"), "dXNlcjpwYXNz");
/// ```
pub fn basic_auth_value(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{username}:{password}"))
}

/// Builds the full request bytes for one round.
///
/// `token` is `None` on the first round and the captured token on the second.
/// Host and path are written verbatim, so callers pass only targets that
/// passed [`RpcTarget::validate`].
pub fn build_request(target: &RpcTarget, token: Option<&SessionToken>) -> Vec<u8> {
    let mut head = String::with_capacity(256);

    // Writing into a String cannot fail.
    let _ = write!(head, "POST {} HTTP/1.1\r\n", target.path);
    let _ = write!(head, "Host: {}\r\n", target.host);
    if target.has_credentials() {
        let _ = write!(
            head,
            "Authorization: Basic {}\r\n",
            basic_auth_value(&target.username, &target.password)
        );
    }
    if let Some(token) = token {
        let _ = write!(head, "{SESSION_ID_HEADER}: {}\r\n", token.as_str());
    }
    head.push_str("Content-Type: application/json\r\n");
    let _ = write!(head, "Content-Length: {}\r\n", RPC_BODY.len());
    head.push_str("Connection: close\r\n\r\n");

    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(RPC_BODY.as_bytes());
    bytes
}
