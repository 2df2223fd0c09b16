//! Wire format for the connectivity probe.
//!
//! The probe talks to a JSON-RPC service that protects itself against
//! cross-site request forgery with a session token:
//!
//! ```text
//! Device                                         RPC service
//! ──────                                         ───────────
//! POST /transmission/rpc  (no token)      ──►
//!                                         ◄──    409 Conflict
//!                                                X-Transmission-Session-Id: abc
//! POST /transmission/rpc                  ──►
//! X-Transmission-Session-Id: abc
//!                                         ◄──    200 OK {"result":"success",...}
//! ```
//!
//! The first rejection is the expected way to obtain a token, not a failure.
//!
//! This module holds the socket-free pieces of that exchange:
//!
//! - **`request`** – builds the exact request bytes for either round.
//! - **`response`** – staged parsing: status line and headers first, then the
//!   JSON body, each stage with its own error type.
//! - **`session`** – the short-lived token type.
//! - **`outcome`** – the terminal result of one probe.
//! - **`speed`** – human-readable transfer-rate formatting.

pub mod outcome;
pub mod request;
pub mod response;
pub mod session;
pub mod speed;

pub use outcome::{FailureClass, ProbeOutcome, ProbePhase, ProtocolFault, ReadStage};
pub use request::{basic_auth_value, build_request, RPC_BODY};
pub use response::{parse_head, parse_reply, BodyError, HeadError, ResponseHead, RpcReply};
pub use session::{SessionToken, SESSION_ID_HEADER};
pub use speed::format_speed;
