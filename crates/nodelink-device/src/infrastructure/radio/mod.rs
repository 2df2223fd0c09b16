//! Radio adapters implementing the [`Radio`](crate::application::ports::Radio) port.
//!
//! - **`nmcli`**     – NetworkManager through its command-line client.  The
//!   production adapter on any Linux board running NetworkManager.
//! - **`simulated`** – In-memory networks for tests and for running the
//!   daemon on a development machine without touching its Wi-Fi.

pub mod nmcli;
pub mod simulated;

pub use nmcli::NmcliRadio;
pub use simulated::{RadioCall, SimulatedRadio};
