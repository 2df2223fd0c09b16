//! Status bar sink that writes to the log.
//!
//! Boards without a display still get the status bar: each repaint becomes
//! one `tracing` event naming the regions that changed.

use nodelink_core::domain::status_bar::{StatusBarChanges, StatusBarFrame, StatusIcon};
use tracing::info;

use crate::application::ports::StatusSink;

/// [`StatusSink`] that logs repaints.
#[derive(Debug, Default)]
pub struct LogStatusBar {
    repaints: u64,
}

impl LogStatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repaints so far.
    pub fn repaints(&self) -> u64 {
        self.repaints
    }
}

impl StatusSink for LogStatusBar {
    fn render(&mut self, frame: &StatusBarFrame, changes: StatusBarChanges) {
        self.repaints += 1;
        info!(
            mode = %frame.mode,
            icon = %icon_label(frame.icon),
            address = %address_label(frame),
            regions = %regions_label(changes),
            "status bar"
        );
    }
}

fn icon_label(icon: StatusIcon) -> String {
    match icon {
        StatusIcon::AccessPoint => "AP".to_string(),
        StatusIcon::Signal(bars) => {
            let lit = usize::from(bars.min(4));
            format!("{}{}", "▮".repeat(lit), "▯".repeat(4 - lit))
        }
        StatusIcon::Blank => "-".to_string(),
    }
}

fn address_label(frame: &StatusBarFrame) -> String {
    match frame.address_lines() {
        Some((top, bottom)) => format!("{top}/{bottom}"),
        None => "-".to_string(),
    }
}

fn regions_label(changes: StatusBarChanges) -> String {
    let mut regions = Vec::new();
    if changes.background {
        regions.push("background");
    }
    if changes.icon {
        regions.push("icon");
    }
    if changes.address {
        regions.push("address");
    }
    regions.join(",")
}
