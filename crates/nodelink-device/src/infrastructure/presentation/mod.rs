//! Presentation sinks: the indicator LED and the status bar.
//!
//! The control loop decides *what* to show; these adapters only put it
//! somewhere.  Both are called only when something changed.

pub mod led;
pub mod status_log;

pub use led::{LogLed, SysfsLed};
pub use status_log::LogStatusBar;
