//! Infrastructure layer for the device daemon.
//!
//! OS-facing adapters for the application ports: the NetworkManager and
//! simulated radios, the TOML settings file, outbound TCP for the probe, the
//! browser console server, and the LED and status bar sinks.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `nodelink_core`, but MUST NOT be imported by the `application` layer.

pub mod console;
pub mod network;
pub mod presentation;
pub mod radio;
pub mod storage;
