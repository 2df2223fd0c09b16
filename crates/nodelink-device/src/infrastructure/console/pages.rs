//! The two HTML pages of the console.
//!
//! Both are compiled into the binary with `include_str!`.  Placeholders of
//! the form `%NAME%` are replaced at request time; every substituted value is
//! HTML-escaped because SSIDs come from the air and can contain anything.

use crate::application::commands::DeviceOverview;

const PROVISION_PAGE: &str = include_str!("../../../assets/provision.html");
const DASHBOARD_PAGE: &str = include_str!("../../../assets/dashboard.html");

/// Version shown on both pages.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The Wi-Fi setup page served while not connected.
pub fn render_provisioning() -> String {
    PROVISION_PAGE.replace("%VERSION%", VERSION)
}

/// The dashboard served while connected.
pub fn render_dashboard(overview: &DeviceOverview) -> String {
    let ssid = overview.ssid.as_deref().unwrap_or("");
    let address = overview
        .address
        .map(|ip| ip.to_string())
        .unwrap_or_default();
    let rssi = overview.rssi_dbm.unwrap_or(0).to_string();
    let mac = overview
        .hardware_address
        .as_deref()
        .unwrap_or("")
        .to_ascii_uppercase();

    DASHBOARD_PAGE
        .replace("%SSID%", &escape_html(ssid))
        .replace("%IP%", &escape_html(&address))
        .replace("%RSSI%", &escape_html(&rssi))
        .replace("%MAC%", &escape_html(&mac))
        .replace("%VERSION%", VERSION)
}

/// Escapes the five characters that matter in HTML text and attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use nodelink_core::DeviceMode;

    fn overview() -> DeviceOverview {
        DeviceOverview {
            mode: DeviceMode::Connected,
            ssid: Some("home".into()),
            address: Some(Ipv4Addr::new(192, 168, 1, 42)),
            rssi_dbm: Some(-58),
            hardware_address: Some("aa:bb:cc:dd:ee:ff".into()),
        }
    }

    #[test]
    fn test_dashboard_substitutes_every_placeholder() {
        // Act
        let page = render_dashboard(&overview());

        // Assert
        assert!(page.contains(">home<"));
        assert!(page.contains("192.168.1.42"));
        assert!(page.contains(">-58<"));
        assert!(page.contains("AA:BB:CC:DD:EE:FF"));
        assert!(page.contains(VERSION));
        for placeholder in ["%SSID%", "%IP%", "%RSSI%", "%MAC%", "%VERSION%"] {
            assert!(!page.contains(placeholder), "{placeholder} left in page");
        }
    }

    #[test]
    fn test_dashboard_escapes_hostile_ssid() {
        let mut o = overview();
        o.ssid = Some("<script>alert(1)</script>".into());

        let page = render_dashboard(&o);

        assert!(!page.contains("<script>alert(1)"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_provisioning_page_shows_version() {
        let page = render_provisioning();
        assert!(page.contains("Wi-Fi Setup"));
        assert!(!page.contains("%VERSION%"));
    }

    #[test]
    fn test_escape_html_handles_quotes_and_ampersand() {
        assert_eq!(escape_html(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &#39;d&#39;");
    }
}
