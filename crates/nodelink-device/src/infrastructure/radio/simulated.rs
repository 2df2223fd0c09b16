//! Simulated radio for tests and headless development.
//!
//! # How the simulation behaves
//!
//! The radio knows a fixed list of networks.  `join` associates at once when
//! the SSID is known and the password matches; otherwise the link simply
//! stays down, which is what a real radio looks like to the control loop
//! until the join budget runs out.  Tests can also drop and restore an
//! established link to exercise the Connected → Joining path.
//!
//! Every call is recorded in order so tests can assert exactly what the
//! control loop asked the radio to do.

use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use nodelink_core::WifiCredentials;

use crate::application::ports::{LinkReport, Radio, RadioError, ScannedNetwork};
use crate::domain::AccessPointConfig;

/// Address the simulated access point hands itself.
pub const SIMULATED_AP_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

/// Address the simulated station receives from "DHCP".
pub const SIMULATED_STATION_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

const SIMULATED_MAC: &str = "02:00:00:00:00:01";

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCall {
    /// `start_access_point` with this SSID.
    StartAccessPoint(String),
    /// `join` with this SSID.
    Join(String),
    Scan,
}

#[derive(Debug, Clone)]
struct SimulatedNetwork {
    ssid: String,
    password: String,
    rssi: i32,
}

#[derive(Debug, Default)]
struct SimState {
    networks: Vec<SimulatedNetwork>,
    /// The network we are associated with, if any.
    joined: Option<SimulatedNetwork>,
    link_dropped: bool,
    calls: Vec<RadioCall>,
}

/// In-memory [`Radio`].
#[derive(Debug, Default)]
pub struct SimulatedRadio {
    state: Mutex<SimState>,
}

impl SimulatedRadio {
    /// A radio that sees no networks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible network.
    pub fn with_network(self, ssid: &str, password: &str, rssi: i32) -> Self {
        self.lock().networks.push(SimulatedNetwork {
            ssid: ssid.to_string(),
            password: password.to_string(),
            rssi,
        });
        self
    }

    /// Makes an established link look lost until [`restore_link`](Self::restore_link).
    pub fn drop_link(&self) {
        self.lock().link_dropped = true;
    }

    pub fn restore_link(&self) {
        self.lock().link_dropped = false;
    }

    /// Calls made so far, oldest first.
    pub fn calls(&self) -> Vec<RadioCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // A panicking test thread must not hide the recorded calls.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Radio for SimulatedRadio {
    async fn start_access_point(
        &self,
        config: &AccessPointConfig,
    ) -> Result<Option<Ipv4Addr>, RadioError> {
        let mut state = self.lock();
        state.calls.push(RadioCall::StartAccessPoint(config.ssid.clone()));
        state.joined = None;
        Ok(Some(SIMULATED_AP_ADDRESS))
    }

    async fn join(&self, credentials: &WifiCredentials) -> Result<(), RadioError> {
        let mut state = self.lock();
        state.calls.push(RadioCall::Join(credentials.ssid.clone()));
        state.joined = state
            .networks
            .iter()
            .find(|n| n.ssid == credentials.ssid && n.password == credentials.password)
            .cloned();
        Ok(())
    }

    async fn link(&self) -> Result<LinkReport, RadioError> {
        let state = self.lock();
        let report = match &state.joined {
            Some(network) if !state.link_dropped => LinkReport {
                associated: true,
                address: Some(SIMULATED_STATION_ADDRESS),
                ssid: Some(network.ssid.clone()),
                signal_dbm: Some(network.rssi),
                hardware_address: Some(SIMULATED_MAC.to_string()),
            },
            _ => LinkReport {
                hardware_address: Some(SIMULATED_MAC.to_string()),
                ..LinkReport::default()
            },
        };
        Ok(report)
    }

    async fn scan(&self) -> Result<Vec<ScannedNetwork>, RadioError> {
        let mut state = self.lock();
        state.calls.push(RadioCall::Scan);
        Ok(state
            .networks
            .iter()
            .map(|n| ScannedNetwork {
                ssid: n.ssid.clone(),
                rssi: n.rssi,
            })
            .collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
