//! Ports: the traits the application layer needs the outside world to implement.
//!
//! The control loop never talks to NetworkManager, the file system, or a
//! socket directly.  It talks to these traits, and `main.rs` plugs in the
//! infrastructure adapters.  Tests plug in doubles instead.
//!
//! | Port            | Production adapter             | Test double              |
//! |-----------------|--------------------------------|--------------------------|
//! | [`Radio`]       | `NmcliRadio`                   | `SimulatedRadio`, mock   |
//! | [`Connector`]   | `TcpConnector`                 | scripted in-memory streams |
//! | [`Prober`]      | `ProbeClient<TcpConnector>`    | mock                     |
//! | [`SettingsStore`] | `TomlSettingsStore`          | mock                     |
//! | [`IndicatorSink`] | `SysfsLed`, `LogLed`         | mock                     |
//! | [`StatusSink`]  | `LogStatusBar`                 | mock                     |

use std::io;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use nodelink_core::domain::status_bar::{StatusBarChanges, StatusBarFrame};
use nodelink_core::{LinkState, ProbeOutcome, RpcTarget, WifiCredentials};
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

#[cfg(test)]
use mockall::automock;

use crate::application::context::StoredSettings;
use crate::domain::AccessPointConfig;

// ── Radio ─────────────────────────────────────────────────────────────────────

/// Error type for radio operations.
#[derive(Debug, Error)]
pub enum RadioError {
    /// The radio tool ran but reported failure.
    #[error("radio command `{command}` failed: {detail}")]
    Command { command: String, detail: String },

    /// The radio tool could not be started.
    #[error("radio I/O error: {0}")]
    Io(#[from] io::Error),

    /// The radio tool printed something we could not interpret.
    #[error("unexpected radio output: {0}")]
    Parse(String),
}

/// Snapshot of the station link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Associated with the network we asked to join.
    pub associated: bool,
    /// Station IPv4 address, once DHCP has completed.
    pub address: Option<Ipv4Addr>,
    pub ssid: Option<String>,
    pub signal_dbm: Option<i32>,
    /// MAC address of the wireless interface.
    pub hardware_address: Option<String>,
}

impl LinkReport {
    /// The two facts the connectivity machine cares about.
    pub fn link_state(&self) -> LinkState {
        LinkState {
            associated: self.associated,
            has_address: self.address.is_some(),
        }
    }
}

/// One network seen by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedNetwork {
    pub ssid: String,
    /// Signal strength in dBm.
    pub rssi: i32,
}

/// The Wi-Fi radio.
///
/// Every call returns promptly: `join` only starts association, and the loop
/// learns the result by polling `link`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Radio: Send + Sync {
    /// Switches to access-point mode.  Returns the access point's own address
    /// when the radio knows it.
    async fn start_access_point(
        &self,
        config: &AccessPointConfig,
    ) -> Result<Option<Ipv4Addr>, RadioError>;

    /// Switches to station mode and starts associating with `credentials`.
    async fn join(&self, credentials: &WifiCredentials) -> Result<(), RadioError>;

    /// Reports the current station link.
    async fn link(&self) -> Result<LinkReport, RadioError>;

    /// Lists visible networks.
    async fn scan(&self) -> Result<Vec<ScannedNetwork>, RadioError>;
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Opens byte streams to a host.  The probe uses one per round.
#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream>;
}

/// Runs the connectivity test against an RPC target.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &RpcTarget) -> ProbeOutcome;
}

// ── Persistence ───────────────────────────────────────────────────────────────

/// Error type for the settings store port.
#[derive(Debug, Error)]
#[error("settings store: {0}")]
pub struct StoreError(pub String);

/// Operator-editable settings on durable storage.
#[cfg_attr(test, automock)]
pub trait SettingsStore: Send {
    /// Reads the stored settings; a missing store yields the defaults.
    fn load(&self) -> Result<StoredSettings, StoreError>;

    fn save(&self, settings: &StoredSettings) -> Result<(), StoreError>;

    /// Removes everything; the next `load` returns the defaults.
    fn erase(&self) -> Result<(), StoreError>;
}

// ── Presentation ──────────────────────────────────────────────────────────────

/// Error type for presentation sinks.
#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("indicator write failed: {0}")]
    Io(#[from] io::Error),
}

/// The indicator LED.  Called only when the level changes.
#[cfg_attr(test, automock)]
pub trait IndicatorSink: Send {
    fn set_lit(&mut self, lit: bool) -> Result<(), PresentationError>;
}

/// The status bar.  Called only when some region changed.
#[cfg_attr(test, automock)]
pub trait StatusSink: Send {
    fn render(&mut self, frame: &StatusBarFrame, changes: StatusBarChanges);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_report_without_address_is_not_up() {
        let report = LinkReport {
            associated: true,
            address: None,
            ..LinkReport::default()
        };
        assert!(!report.link_state().is_up());
    }

    #[test]
    fn test_link_report_with_association_and_address_is_up() {
        let report = LinkReport {
            associated: true,
            address: Some(Ipv4Addr::new(192, 168, 1, 42)),
            ..LinkReport::default()
        };
        assert!(report.link_state().is_up());
    }

    #[test]
    fn test_scanned_network_serializes_as_console_json() {
        let json = serde_json::to_string(&ScannedNetwork {
            ssid: "home".into(),
            rssi: -55,
        })
        .unwrap();
        assert_eq!(json, r#"{"ssid":"home","rssi":-55}"#);
    }
}
