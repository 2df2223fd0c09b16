//! nodelink-device library crate.
//!
//! The daemon that turns a small Linux board into a self-provisioning network
//! appliance.  The binary in `main.rs` only parses arguments and wires the
//! pieces below together; everything it uses is exported here so the
//! integration tests in `tests/` drive the same code.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser ──HTTP──▶ infrastructure::console ──ConsoleRequest──▶ application::control_loop
//!                                                                  │ owns DeviceContext
//!                          ┌───────────────────────────────────────┤
//!                          ▼                 ▼                     ▼
//!              infrastructure::radio   ::storage          application::probe ──▶ ::network
//!              (nmcli / simulated)     (TOML file)        (two-round RPC test)   (TCP)
//! ```
//!
//! # Layer rules
//!
//! - `domain` holds runtime configuration types; no I/O.
//! - `application` depends on `domain` and `nodelink-core`, and reaches the
//!   outside world only through the traits in `application::ports`.
//! - `infrastructure` implements those traits with `tokio`, `nmcli`, and the
//!   file system.

/// Domain layer: runtime configuration.
pub mod domain;

/// Application layer: ports, the control loop, and the probe use case.
pub mod application;

/// Infrastructure layer: radio, storage, network, console, presentation.
pub mod infrastructure;
