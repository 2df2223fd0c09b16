//! TOML persistence for the operator settings.
//!
//! The default location follows the XDG convention:
//! `$XDG_CONFIG_HOME/nodelink/config.toml`, or `~/.config/nodelink/config.toml`
//! when `XDG_CONFIG_HOME` is unset.  `--config` overrides it.
//!
//! # File layout (for beginners)
//!
//! ```toml
//! [wifi]
//! ssid = "home"
//! password = "hunter22"
//!
//! [rpc]
//! host = "192.168.1.10"
//! port = 9091
//! path = "/transmission/rpc"
//! username = "admin"
//! password = "secret"
//! ```
//!
//! The `[wifi]` table is absent until the device has been provisioned.  Every
//! `[rpc]` field is optional: `#[serde(default = "...")]` fills in the value a
//! fresh device would use, so a hand-edited file with only `host` still loads.

use std::io;
use std::path::{Path, PathBuf};

use nodelink_core::domain::target::{DEFAULT_RPC_PATH, DEFAULT_RPC_PORT};
use nodelink_core::{RpcTarget, WifiCredentials};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::context::StoredSettings;
use crate::application::ports::{SettingsStore, StoreError};

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        StoreError(e.to_string())
    }
}

// ── File schema ───────────────────────────────────────────────────────────────

/// The settings file as it appears on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi: Option<WifiSection>,
    #[serde(default)]
    pub rpc: RpcSection,
}

/// `[wifi]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WifiSection {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
}

/// `[rpc]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcSection {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_RPC_PORT
}
fn default_path() -> String {
    DEFAULT_RPC_PATH.to_string()
}

impl Default for RpcSection {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            path: default_path(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl From<&StoredSettings> for SettingsFile {
    fn from(settings: &StoredSettings) -> Self {
        let target = &settings.target;
        Self {
            wifi: settings.wifi.as_ref().map(|c| WifiSection {
                ssid: c.ssid.clone(),
                password: c.password.clone(),
            }),
            rpc: RpcSection {
                host: target.host.clone(),
                port: target.port,
                path: target.path.clone(),
                username: target.username.clone(),
                password: target.password.clone(),
            },
        }
    }
}

impl From<SettingsFile> for StoredSettings {
    /// A `[wifi]` table with an empty SSID counts as unprovisioned.
    fn from(file: SettingsFile) -> Self {
        let wifi = file
            .wifi
            .map(|w| WifiCredentials::new(w.ssid, w.password))
            .filter(WifiCredentials::is_usable);
        Self {
            wifi,
            target: RpcTarget {
                host: file.rpc.host,
                port: file.rpc.port,
                path: file.rpc.path,
                username: file.rpc.username,
                password: file.rpc.password,
            },
        }
    }
}

// ── Paths ─────────────────────────────────────────────────────────────────────

/// Resolves the default settings file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when neither
/// `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(platform_config_dir()
        .ok_or(ConfigError::NoPlatformConfigDir)?
        .join("config.toml"))
}

fn platform_config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("nodelink"))
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// [`SettingsStore`] backed by one TOML file.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file, returning the defaults if it does not exist yet.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] for file-system errors other than "not found",
    /// [`ConfigError::Parse`] if the TOML is malformed.
    pub fn read(&self) -> Result<SettingsFile, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file yet");
                Ok(SettingsFile::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes the file, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] for file-system failures,
    /// [`ConfigError::Serialize`] if serialization fails.
    pub fn write(&self, file: &SettingsFile) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(file)?;
        std::fs::write(&self.path, content).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Deletes the file.  Deleting a file that is not there succeeds.
    pub fn remove(&self) -> Result<(), ConfigError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "settings file removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ConfigError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<StoredSettings, StoreError> {
        Ok(self.read()?.into())
    }

    fn save(&self, settings: &StoredSettings) -> Result<(), StoreError> {
        Ok(self.write(&SettingsFile::from(settings))?)
    }

    fn erase(&self) -> Result<(), StoreError> {
        Ok(self.remove()?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
