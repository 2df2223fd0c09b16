//! The remote JSON-RPC endpoint probed by the connectivity test.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default RPC port of the download manager.
pub const DEFAULT_RPC_PORT: u16 = 9091;

/// Default RPC path of the download manager.
pub const DEFAULT_RPC_PATH: &str = "/transmission/rpc";

/// Why a target cannot be put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("host is empty")]
    EmptyHost,

    /// Whitespace or control characters would end up in the `Host` header.
    #[error("host contains whitespace or control characters")]
    InvalidHost,

    /// The path lands in the request line, so it must be a single token
    /// starting with `/`.
    #[error("path must start with '/' and contain no whitespace or control characters")]
    InvalidPath,
}

fn is_header_safe(value: &str) -> bool {
    !value.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Whether `host` can be written into a `Host` header as is.
pub fn is_valid_host(host: &str) -> bool {
    is_header_safe(host)
}

/// Whether `path` can be written into a request line as is.
pub fn is_valid_path(path: &str) -> bool {
    path.starts_with('/') && is_header_safe(path)
}

/// Where and how to reach the remote RPC service.
///
/// Owned by the configuration store; the probe only ever borrows it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcTarget {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub username: String,
    pub password: String,
}

impl Default for RpcTarget {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_RPC_PORT,
            path: DEFAULT_RPC_PATH.to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl RpcTarget {
    /// Whether an `Authorization: Basic` header should be sent.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }

    /// Checks that host and path can go onto the wire unchanged.
    ///
    /// # Errors
    ///
    /// The first [`TargetError`] found, host before path.
    pub fn validate(&self) -> Result<(), TargetError> {
        if self.host.trim().is_empty() {
            return Err(TargetError::EmptyHost);
        }
        if !is_valid_host(&self.host) {
            return Err(TargetError::InvalidHost);
        }
        if !is_valid_path(&self.path) {
            return Err(TargetError::InvalidPath);
        }
        Ok(())
    }

    /// A target with no host, or with a host or path that would corrupt the
    /// request, cannot be probed.
    pub fn is_probeable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns a copy with every present override applied.
    pub fn with_overrides(&self, overrides: &TargetOverrides) -> RpcTarget {
        RpcTarget {
            host: overrides.host.clone().unwrap_or_else(|| self.host.clone()),
            port: overrides.port.unwrap_or(self.port),
            path: overrides.path.clone().unwrap_or_else(|| self.path.clone()),
            username: overrides
                .username
                .clone()
                .unwrap_or_else(|| self.username.clone()),
            password: overrides
                .password
                .clone()
                .unwrap_or_else(|| self.password.clone()),
        }
    }
}

impl fmt::Debug for RpcTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-request field overrides for a one-off connectivity test.
///
/// Absent fields fall back to the stored [`RpcTarget`].  Overrides are never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOverrides {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
