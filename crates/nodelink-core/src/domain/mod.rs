//! Domain entities for a NodeLink appliance.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: nothing here touches a socket, a file, or a radio.  The
//! device crate feeds observations in (timestamps, link reports) and carries
//! the resulting commands out.
//!
//! # Sub-modules
//!
//! - **`mode`** – the three network modes a device can be in.
//! - **`connectivity`** – the state machine that moves between those modes,
//!   including the 20 s join budget and the fallback to provisioning.
//! - **`target`** – the remote RPC endpoint a connectivity test probes.
//! - **`indicator`** – LED blink cadence derived from the current mode.
//! - **`status_bar`** – the status display's view model and redraw diffing.

pub mod connectivity;
pub mod indicator;
pub mod mode;
pub mod status_bar;
pub mod target;
