//! Domain layer for nodelink-device.
//!
//! The connectivity rules themselves live in `nodelink-core`; this module only
//! adds the daemon's runtime configuration, kept free of CLI parsing and
//! environment reads so tests can build it directly.

pub mod config;

pub use config::{AccessPointConfig, DeviceConfig, RadioBackend};
