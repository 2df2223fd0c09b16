//! Status display view model.
//!
//! The appliance's status bar shows two things: an icon on the right (access
//! point badge, signal bars, or a blinking placeholder while joining) and the
//! current IP address on the left.  Redrawing a small display is slow, so the
//! renderer asks [`StatusBarFrame::changes_since`] which regions actually
//! changed and repaints only those.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::domain::mode::DeviceMode;

/// Half-period of the joining icon blink.
pub const ICON_BLINK: Duration = Duration::from_millis(500);

/// What the icon region shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    /// "AP" badge while provisioning.
    AccessPoint,
    /// Signal strength, 0–4 bars.
    Signal(u8),
    /// Nothing (the dark half of the joining blink).
    Blank,
}

/// Converts a received signal strength in dBm to 0–4 bars.
pub fn signal_bars(rssi_dbm: i32) -> u8 {
    match rssi_dbm {
        r if r >= -60 => 4,
        r if r >= -70 => 3,
        r if r >= -80 => 2,
        r if r >= -90 => 1,
        _ => 0,
    }
}

/// Everything the status bar shows at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBarFrame {
    pub mode: DeviceMode,
    pub icon: StatusIcon,
    /// Address to print, if any.
    pub address: Option<Ipv4Addr>,
    /// Signal strength behind the icon (connected only).
    pub rssi_dbm: Option<i32>,
}

/// Inputs needed to compose a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusInputs {
    /// Station address (meaningful when connected).
    pub station_address: Option<Ipv4Addr>,
    /// Access-point address (meaningful when provisioning).
    pub access_point_address: Option<Ipv4Addr>,
    pub rssi_dbm: Option<i32>,
}

/// Regions of the bar that need repainting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusBarChanges {
    pub background: bool,
    pub icon: bool,
    pub address: bool,
}

impl StatusBarChanges {
    pub fn any(&self) -> bool {
        self.background || self.icon || self.address
    }
}

impl StatusBarFrame {
    /// Composes the frame for `mode` at `since_boot`.
    pub fn compose(mode: DeviceMode, inputs: StatusInputs, since_boot: Duration) -> Self {
        match mode {
            DeviceMode::Provisioning => Self {
                mode,
                icon: StatusIcon::AccessPoint,
                address: inputs.access_point_address,
                rssi_dbm: None,
            },
            DeviceMode::Joining => {
                let visible = (since_boot.as_millis() / ICON_BLINK.as_millis()) % 2 == 0;
                Self {
                    mode,
                    // A full-strength placeholder signals "working on it".
                    icon: if visible { StatusIcon::Signal(4) } else { StatusIcon::Blank },
                    address: None,
                    rssi_dbm: None,
                }
            }
            DeviceMode::Connected => {
                let rssi = inputs.rssi_dbm.unwrap_or(-100);
                Self {
                    mode,
                    icon: StatusIcon::Signal(signal_bars(rssi)),
                    address: inputs.station_address,
                    rssi_dbm: Some(rssi),
                }
            }
        }
    }

    /// Which regions differ from `previous` (everything, on the first frame).
    pub fn changes_since(&self, previous: Option<&StatusBarFrame>) -> StatusBarChanges {
        let Some(prev) = previous else {
            return StatusBarChanges {
                background: true,
                icon: true,
                address: true,
            };
        };
        let mode_changed = prev.mode != self.mode;
        StatusBarChanges {
            background: mode_changed,
            icon: mode_changed || prev.icon != self.icon,
            address: mode_changed || prev.address != self.address,
        }
    }

    /// The address split over two lines the way the narrow bar prints it.
    pub fn address_lines(&self) -> Option<(String, String)> {
        self.address.map(|ip| {
            let [a, b, c, d] = ip.octets();
            (format!("{a}.{b}"), format!("{c}.{d}"))
        })
    }
}
