//! Indicator-light cadence.
//!
//! The LED tells an operator what the appliance is doing without a screen:
//!
//! | Mode         | Pattern                    |
//! |--------------|----------------------------|
//! | Provisioning | slow blink, toggles 1000 ms |
//! | Joining      | fast blink, toggles 200 ms  |
//! | Connected    | steady off                 |
//!
//! The phase is derived from tick parity (time since boot divided by the
//! toggle period), so it needs no timer state of its own.

use std::time::Duration;

use crate::domain::mode::DeviceMode;

/// Toggle period while Joining.
pub const JOINING_TOGGLE: Duration = Duration::from_millis(200);

/// Toggle period while Provisioning.
pub const PROVISIONING_TOGGLE: Duration = Duration::from_millis(1000);

/// The toggle period for `mode`, or `None` when the light is steady.
pub fn toggle_period(mode: DeviceMode) -> Option<Duration> {
    match mode {
        DeviceMode::Provisioning => Some(PROVISIONING_TOGGLE),
        DeviceMode::Joining => Some(JOINING_TOGGLE),
        DeviceMode::Connected => None,
    }
}

/// Whether the light is lit at `since_boot` in `mode`.
///
/// The first period after boot is dark; odd periods are lit.
pub fn blink_phase(mode: DeviceMode, since_boot: Duration) -> bool {
    match toggle_period(mode) {
        Some(period) => (since_boot.as_millis() / period.as_millis()) % 2 == 1,
        None => false,
    }
}

/// Remembers the last level written so sinks are only touched on change.
#[derive(Debug, Default)]
pub struct IndicatorLight {
    last: Option<bool>,
}

impl IndicatorLight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new level if it differs from the last one reported.
    pub fn update(&mut self, mode: DeviceMode, since_boot: Duration) -> Option<bool> {
        let lit = blink_phase(mode, since_boot);
        if self.last == Some(lit) {
            return None;
        }
        self.last = Some(lit);
        Some(lit)
    }
}
