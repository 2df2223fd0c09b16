//! Runtime configuration types.
//!
//! [`DeviceConfig`] holds the options that do not change while the daemon
//! runs: where the settings file lives, which interface the radio drives,
//! how the provisioning access point is named, and so on.  It is built once
//! from CLI arguments (see `main.rs`) and survives soft restarts.
//!
//! Operator-editable settings (Wi-Fi credentials, the RPC target) are a
//! different thing: they live in the settings file and are reloaded on every
//! restart.  See `infrastructure::storage`.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

/// Default SSID of the provisioning access point.
pub const DEFAULT_AP_SSID: &str = "NodeLink_Config";

/// Default console listener port.
pub const DEFAULT_CONSOLE_PORT: u16 = 80;

/// Default control-loop tick.  Fine enough for the 200 ms joining blink.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Name and passphrase of the provisioning access point.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessPointConfig {
    pub ssid: String,
    /// Empty for an open network.
    pub password: String,
}

impl AccessPointConfig {
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            ssid: DEFAULT_AP_SSID.to_string(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for AccessPointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessPointConfig")
            .field("ssid", &self.ssid)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Which radio adapter drives the Wi-Fi hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioBackend {
    /// NetworkManager through the `nmcli` command-line tool.
    Nmcli,
    /// In-memory simulation for headless development.
    Simulated,
}

/// All runtime configuration for the device daemon.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Path of the TOML settings file.
    pub settings_path: PathBuf,
    /// Address the browser console listens on.
    pub console_bind: SocketAddr,
    pub access_point: AccessPointConfig,
    /// Wireless interface name, e.g. `wlan0`.
    pub interface: String,
    pub radio: RadioBackend,
    /// Sysfs brightness file of the indicator LED; `None` logs the LED instead.
    pub led_path: Option<PathBuf>,
    /// Control-loop tick period.
    pub tick: Duration,
}

impl Default for DeviceConfig {
    /// Defaults suitable for local development.
    ///
    /// | Field          | Default              |
    /// |----------------|----------------------|
    /// | settings_path  | `nodelink.toml`      |
    /// | console_bind   | `0.0.0.0:80`         |
    /// | access_point   | open `NodeLink_Config` |
    /// | interface      | `wlan0`              |
    /// | radio          | `Simulated`          |
    /// | led_path       | none                 |
    /// | tick           | 100 ms               |
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("nodelink.toml"),
            console_bind: SocketAddr::V4(SocketAddrV4::new(
                Ipv4Addr::UNSPECIFIED,
                DEFAULT_CONSOLE_PORT,
            )),
            access_point: AccessPointConfig::default(),
            interface: "wlan0".to_string(),
            radio: RadioBackend::Simulated,
            led_path: None,
            tick: DEFAULT_TICK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_console_listens_on_all_interfaces_port_80() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.console_bind.port(), 80);
        assert!(cfg.console_bind.ip().is_unspecified());
    }

    #[test]
    fn test_default_access_point_is_open() {
        let ap = AccessPointConfig::default();
        assert_eq!(ap.ssid, "NodeLink_Config");
        assert!(ap.is_open());
    }

    #[test]
    fn test_access_point_debug_hides_password() {
        let ap = AccessPointConfig {
            ssid: "setup".into(),
            password: "topsecret".into(),
        };
        let debug = format!("{ap:?}");
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("open: false"));
    }
}
