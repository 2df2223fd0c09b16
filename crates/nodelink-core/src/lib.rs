//! # nodelink-core
//!
//! Shared library for NodeLink appliances containing the connectivity state
//! machine, timing primitives, and the wire format of the RPC connectivity
//! probe.
//!
//! This crate has no dependencies on radios, files, or sockets.  The
//! `nodelink-device` crate wires it to real hardware and the network.
//!
//! # Architecture overview (for beginners)
//!
//! A NodeLink appliance is a small networked box with no keyboard or screen
//! worth speaking of.  On first boot it does not know which Wi-Fi network to
//! join, so it broadcasts its own access point and serves a setup page.  Once
//! an operator saves credentials it joins that network, and from then on it
//! keeps reconnecting on its own.  From the console an operator can also check
//! that a remote download-manager RPC service is reachable.
//!
//! This crate (`nodelink-core`) is the pure foundation.  It defines:
//!
//! - **`timing`** – A monotonic clock abstraction plus deadlines and bounded
//!   waits, so every time-dependent rule can be tested without sleeping.
//!
//! - **`domain`** – The three device modes and the state machine that moves
//!   between them, the RPC target description, and the view models behind the
//!   indicator light and status bar.
//!
//! - **`protocol`** – The two-round session-token handshake of the RPC probe:
//!   request bytes, staged response parsing, and the probe's final outcome.

pub mod domain;
pub mod protocol;
pub mod timing;

// Re-export the most-used types at the crate root so callers can write
// `nodelink_core::ConnectivityMachine` instead of the full module path.
pub use domain::connectivity::{
    ConnectivityMachine, JoinAttempt, LinkState, RadioCommand, Transition, WifiCredentials,
    JOIN_BUDGET,
};
pub use domain::mode::DeviceMode;
pub use domain::target::{RpcTarget, TargetError, TargetOverrides};
pub use protocol::outcome::{ProbeOutcome, ProbePhase, ProtocolFault, ReadStage};
pub use timing::{Clock, ManualClock, SystemClock, TokioClock};
