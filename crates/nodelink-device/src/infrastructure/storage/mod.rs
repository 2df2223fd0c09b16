//! Storage infrastructure: the operator settings file.
//!
//! The `config` sub-module reads and writes the TOML file that holds the
//! Wi-Fi credentials and the RPC target, and adapts it to the
//! [`SettingsStore`](crate::application::ports::SettingsStore) port.  A
//! missing file is the normal first-boot state and yields the defaults.

pub mod config;

pub use config::{config_file_path, ConfigError, SettingsFile, TomlSettingsStore};
