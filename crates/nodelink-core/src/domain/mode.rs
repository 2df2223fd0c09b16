//! Device network mode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The network mode of the appliance.  Exactly one applies at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    /// Broadcasting an own access point so an operator can enter credentials.
    Provisioning,
    /// Trying to associate with the configured network within a time budget.
    Joining,
    /// Associated with the configured network and holding an address.
    Connected,
}

impl DeviceMode {
    /// Short lowercase label used in logs and the console status endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceMode::Provisioning => "provisioning",
            DeviceMode::Joining => "joining",
            DeviceMode::Connected => "connected",
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
