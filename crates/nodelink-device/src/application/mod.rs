//! Application layer for the device daemon.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The application layer sits between the pure rules in `nodelink_core`
//! (the connectivity machine, the probe wire format) and the infrastructure
//! adapters that touch the radio, the disk, and sockets.  It depends only on
//! the traits in [`ports`], so every use case here can be tested with mocks.
//!
//! # Sub-modules
//!
//! - **`ports`**        – Traits the outside world implements (radio,
//!   connector, settings store, LED, status bar).
//! - **`context`**      – The one owned [`DeviceContext`] the loop works on.
//! - **`control_loop`** – Ticks the connectivity machine, drives the
//!   indicator and status bar, and answers console requests in order.
//! - **`commands`**     – The request/reply messages between the console
//!   server and the loop.
//! - **`probe`**        – The two-round RPC connectivity test.

pub mod commands;
pub mod context;
pub mod control_loop;
pub mod ports;
pub mod probe;

pub use commands::{
    ConsoleCommand, ConsoleQueue, ConsoleReply, ConsoleRequest, DeviceOverview, StatusSnapshot,
    CONSOLE_QUEUE_DEPTH,
};
pub use context::{DeviceContext, DeviceParts, StoredSettings};
pub use control_loop::{run, LoopExit, LoopTimings};
pub use probe::ProbeClient;
