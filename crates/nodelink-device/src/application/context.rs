//! The single owned state of a running device.
//!
//! Everything the control loop touches lives in one [`DeviceContext`]: the
//! connectivity machine, the operator settings, and the injected ports.  The
//! loop owns it exclusively, so nothing here needs a lock.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nodelink_core::domain::indicator::IndicatorLight;
use nodelink_core::domain::status_bar::StatusBarFrame;
use nodelink_core::{Clock, ConnectivityMachine, DeviceMode, RpcTarget, WifiCredentials};
use tracing::{info, warn};

use crate::application::ports::{
    IndicatorSink, LinkReport, Prober, Radio, SettingsStore, StatusSink,
};
use crate::domain::AccessPointConfig;

/// Operator-editable settings, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSettings {
    /// Network to join; `None` until provisioned.
    pub wifi: Option<WifiCredentials>,
    pub target: RpcTarget,
}

/// The injected collaborators a context is built from.
pub struct DeviceParts {
    pub radio: Arc<dyn Radio>,
    pub prober: Arc<dyn Prober>,
    pub store: Box<dyn SettingsStore>,
    pub indicator: Box<dyn IndicatorSink>,
    pub status: Box<dyn StatusSink>,
    pub clock: Arc<dyn Clock>,
    pub access_point: AccessPointConfig,
}

/// Mutable presentation state carried between ticks.
#[derive(Debug, Default)]
pub(crate) struct PresentationState {
    pub(crate) indicator: IndicatorLight,
    pub(crate) last_frame: Option<StatusBarFrame>,
}

/// Everything the control loop owns.
pub struct DeviceContext {
    pub(crate) machine: ConnectivityMachine,
    pub(crate) settings: StoredSettings,
    pub(crate) radio: Arc<dyn Radio>,
    pub(crate) prober: Arc<dyn Prober>,
    pub(crate) store: Box<dyn SettingsStore>,
    pub(crate) indicator: Box<dyn IndicatorSink>,
    pub(crate) status: Box<dyn StatusSink>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) access_point: AccessPointConfig,
    pub(crate) access_point_address: Option<Ipv4Addr>,
    pub(crate) last_link: LinkReport,
    pub(crate) presentation: PresentationState,
    booted_at: Instant,
}

impl DeviceContext {
    /// Builds a context, reading settings from the store.
    ///
    /// A store that cannot be read is not fatal: the device starts with
    /// default settings, which means it comes up in provisioning.
    pub fn boot(parts: DeviceParts) -> Self {
        let settings = match parts.store.load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("could not load settings, using defaults: {e}");
                StoredSettings::default()
            }
        };
        info!(
            provisioned = settings.wifi.is_some(),
            rpc_host = %settings.target.host,
            "settings loaded"
        );
        let booted_at = parts.clock.now();

        Self {
            machine: ConnectivityMachine::new(),
            settings,
            radio: parts.radio,
            prober: parts.prober,
            store: parts.store,
            indicator: parts.indicator,
            status: parts.status,
            clock: parts.clock,
            access_point: parts.access_point,
            access_point_address: None,
            last_link: LinkReport::default(),
            presentation: PresentationState::default(),
            booted_at,
        }
    }

    pub fn current_mode(&self) -> DeviceMode {
        self.machine.current_mode()
    }

    pub fn settings(&self) -> &StoredSettings {
        &self.settings
    }

    /// The most recent link report from the radio.
    pub fn last_link(&self) -> &LinkReport {
        &self.last_link
    }

    /// Time since this context was built.
    pub fn since_boot(&self) -> Duration {
        self.clock.elapsed_since(self.booted_at)
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }
}
