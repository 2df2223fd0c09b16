//! Indicator LED sinks.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::application::ports::{IndicatorSink, PresentationError};

/// Drives a Linux LED class device by writing its `brightness` file,
/// e.g. `/sys/class/leds/led0/brightness`.
#[derive(Debug, Clone)]
pub struct SysfsLed {
    brightness: PathBuf,
}

impl SysfsLed {
    pub fn new(brightness: impl Into<PathBuf>) -> Self {
        let brightness = brightness.into();
        info!(path = %brightness.display(), "indicator LED on sysfs");
        Self { brightness }
    }
}

impl IndicatorSink for SysfsLed {
    fn set_lit(&mut self, lit: bool) -> Result<(), PresentationError> {
        std::fs::write(&self.brightness, if lit { "1" } else { "0" })?;
        Ok(())
    }
}

/// Logs LED changes instead of driving hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLed;

impl IndicatorSink for LogLed {
    fn set_lit(&mut self, lit: bool) -> Result<(), PresentationError> {
        debug!(lit, "indicator");
        Ok(())
    }
}
