//! NetworkManager radio adapter.
//!
//! Drives the Wi-Fi interface through `nmcli`, run as a child process with
//! `tokio::process` so the control loop never blocks on it.
//!
//! # Terse output (for beginners)
//!
//! `nmcli -t` prints one record per line with fields separated by `:`.  A
//! literal `:` inside a value (a MAC address, say) is escaped as `\:`, and a
//! literal backslash as `\\`.  [`split_terse`] undoes that.  All parsing lives
//! in small pure functions so it can be tested without NetworkManager.
//!
//! # Modes
//!
//! - Access point: a dedicated connection profile (`nodelink-ap`) in `ap`
//!   mode with `ipv4.method shared`, so NetworkManager also runs DHCP for
//!   the operator's phone or laptop.
//! - Station: `nmcli --wait 0 device wifi connect ...` returns as soon as
//!   activation has started; the control loop polls [`Radio::link`] for the
//!   outcome.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use nodelink_core::WifiCredentials;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::application::ports::{LinkReport, Radio, RadioError, ScannedNetwork};
use crate::domain::AccessPointConfig;

/// Name of the connection profile used for the provisioning access point.
pub const AP_CONNECTION_NAME: &str = "nodelink-ap";

/// NetworkManager device state code for "connected".
const NM_STATE_ACTIVATED: u32 = 100;

/// [`Radio`] backed by NetworkManager.
#[derive(Debug, Clone)]
pub struct NmcliRadio {
    interface: String,
    program: String,
}

impl NmcliRadio {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            program: "nmcli".to_string(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<String, RadioError> {
        let described = describe(args);
        debug!(command = %described, "running nmcli");
        let output = Command::new(&self.program).args(args).output().await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(RadioError::Command {
                command: described,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn device_show(&self) -> Result<DeviceShow, RadioError> {
        let out = self.run(&device_show_args(&self.interface)).await?;
        Ok(parse_device_show(&out))
    }
}

#[async_trait]
impl Radio for NmcliRadio {
    async fn start_access_point(
        &self,
        config: &AccessPointConfig,
    ) -> Result<Option<Ipv4Addr>, RadioError> {
        // A stale profile from an earlier run would make `add` fail.
        if let Err(e) = self.run(&delete_ap_args()).await {
            debug!("no previous access point profile: {e}");
        }
        self.run(&add_ap_args(&self.interface, config)).await?;
        self.run(&up_ap_args()).await?;
        Ok(self.device_show().await?.address)
    }

    async fn join(&self, credentials: &WifiCredentials) -> Result<(), RadioError> {
        if let Err(e) = self.run(&down_ap_args()).await {
            debug!("access point was not active: {e}");
        }
        self.run(&connect_args(&self.interface, credentials)).await?;
        Ok(())
    }

    async fn link(&self) -> Result<LinkReport, RadioError> {
        let device = self.device_show().await?;
        let associated = device.state == Some(NM_STATE_ACTIVATED)
            && device
                .connection
                .as_deref()
                .is_some_and(|c| c != AP_CONNECTION_NAME);

        let mut report = LinkReport {
            associated,
            address: if associated { device.address } else { None },
            hardware_address: device.hardware_address,
            ..LinkReport::default()
        };

        if associated {
            match self.run(&wifi_list_args(&self.interface, false)).await {
                Ok(out) => {
                    if let Some((ssid, rssi)) = parse_in_use(&out) {
                        report.ssid = Some(ssid);
                        report.signal_dbm = Some(rssi);
                    }
                }
                Err(e) => warn!("could not read signal strength: {e}"),
            }
        }
        Ok(report)
    }

    async fn scan(&self) -> Result<Vec<ScannedNetwork>, RadioError> {
        let out = self.run(&wifi_list_args(&self.interface, true)).await?;
        Ok(parse_wifi_list(&out))
    }
}

// ── Argument builders ─────────────────────────────────────────────────────────

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn delete_ap_args() -> Vec<String> {
    args(&["connection", "delete", AP_CONNECTION_NAME])
}

fn add_ap_args(interface: &str, config: &AccessPointConfig) -> Vec<String> {
    let mut out = args(&[
        "connection",
        "add",
        "type",
        "wifi",
        "ifname",
        interface,
        "con-name",
        AP_CONNECTION_NAME,
        "autoconnect",
        "no",
        "ssid",
        &config.ssid,
        "802-11-wireless.mode",
        "ap",
        "ipv4.method",
        "shared",
    ]);
    if !config.is_open() {
        out.extend(args(&[
            "wifi-sec.key-mgmt",
            "wpa-psk",
            "wifi-sec.psk",
            &config.password,
        ]));
    }
    out
}

fn up_ap_args() -> Vec<String> {
    args(&["connection", "up", AP_CONNECTION_NAME])
}

fn down_ap_args() -> Vec<String> {
    args(&["connection", "down", AP_CONNECTION_NAME])
}

fn connect_args(interface: &str, credentials: &WifiCredentials) -> Vec<String> {
    let mut out = args(&[
        "--wait",
        "0",
        "device",
        "wifi",
        "connect",
        &credentials.ssid,
    ]);
    if !credentials.password.is_empty() {
        out.extend(args(&["password", &credentials.password]));
    }
    out.extend(args(&["ifname", interface]));
    out
}

fn device_show_args(interface: &str) -> Vec<String> {
    args(&[
        "-t",
        "-f",
        "GENERAL.STATE,GENERAL.CONNECTION,GENERAL.HWADDR,IP4.ADDRESS",
        "device",
        "show",
        interface,
    ])
}

fn wifi_list_args(interface: &str, rescan: bool) -> Vec<String> {
    args(&[
        "-t",
        "-f",
        "IN-USE,SIGNAL,SSID",
        "device",
        "wifi",
        "list",
        "ifname",
        interface,
        "--rescan",
        if rescan { "yes" } else { "no" },
    ])
}

/// The command line for logs and errors, with secrets masked.
fn describe(args: &[String]) -> String {
    let mut masked = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            masked.push("***");
            hide_next = false;
        } else {
            hide_next = arg == "password" || arg == "wifi-sec.psk";
            masked.push(arg.as_str());
        }
    }
    format!("nmcli {}", masked.join(" "))
}

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Splits one line of `nmcli -t` output into unescaped fields.
pub fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// The subset of `nmcli device show` the adapter uses.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeviceShow {
    /// Numeric device state, e.g. `100` for connected.
    pub state: Option<u32>,
    pub connection: Option<String>,
    pub hardware_address: Option<String>,
    /// First IPv4 address.
    pub address: Option<Ipv4Addr>,
}

/// Parses `nmcli -t -f GENERAL.STATE,GENERAL.CONNECTION,GENERAL.HWADDR,IP4.ADDRESS device show`.
pub fn parse_device_show(output: &str) -> DeviceShow {
    let mut show = DeviceShow::default();
    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = split_terse(value).join(":");
        let value = value.trim();
        match key {
            "GENERAL.STATE" => {
                show.state = value
                    .split_whitespace()
                    .next()
                    .and_then(|code| code.parse().ok());
            }
            "GENERAL.CONNECTION" if !value.is_empty() && value != "--" => {
                show.connection = Some(value.to_string());
            }
            "GENERAL.HWADDR" if !value.is_empty() => {
                show.hardware_address = Some(value.to_ascii_lowercase());
            }
            k if k.starts_with("IP4.ADDRESS") && show.address.is_none() => {
                show.address = parse_ipv4_cidr(value);
            }
            _ => {}
        }
    }
    show
}

/// Parses `192.168.1.42/24` (or a bare address).
pub fn parse_ipv4_cidr(value: &str) -> Option<Ipv4Addr> {
    value.split('/').next()?.trim().parse().ok()
}

/// Converts NetworkManager's 0–100 signal quality to dBm.
///
/// Inverse of NetworkManager's own mapping (`quality = 2 * (dBm + 100)`).
pub fn percent_to_dbm(percent: u8) -> i32 {
    i32::from(percent.min(100)) / 2 - 100
}

fn parse_wifi_line(line: &str) -> Option<(bool, String, i32)> {
    let fields = split_terse(line);
    let [in_use, signal, ssid] = fields.as_slice() else {
        return None;
    };
    let percent: u8 = signal.trim().parse().ok()?;
    Some((in_use.trim() == "*", ssid.clone(), percent_to_dbm(percent)))
}

/// Parses `nmcli -t -f IN-USE,SIGNAL,SSID device wifi list`.
///
/// Hidden networks (empty SSID) are skipped.  An SSID seen on several access
/// points is listed once with its strongest signal.  Strongest first.
pub fn parse_wifi_list(output: &str) -> Vec<ScannedNetwork> {
    let mut networks: Vec<ScannedNetwork> = Vec::new();
    for (_, ssid, rssi) in output.lines().filter_map(parse_wifi_line) {
        if ssid.is_empty() {
            continue;
        }
        match networks.iter_mut().find(|n| n.ssid == ssid) {
            Some(existing) => existing.rssi = existing.rssi.max(rssi),
            None => networks.push(ScannedNetwork { ssid, rssi }),
        }
    }
    networks.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    networks
}

/// The SSID and signal of the access point currently in use.
pub fn parse_in_use(output: &str) -> Option<(String, i32)> {
    output
        .lines()
        .filter_map(parse_wifi_line)
        .find(|(in_use, _, _)| *in_use)
        .map(|(_, ssid, rssi)| (ssid, rssi))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── split_terse ───────────────────────────────────────────────────────────

    #[test]
    fn test_split_terse_unescapes_colons_in_values() {
        assert_eq!(
            split_terse(r"GENERAL.HWADDR:AA\:BB\:CC\:DD\:EE\:FF"),
            vec!["GENERAL.HWADDR", "AA:BB:CC:DD:EE:FF"]
        );
    }

    #[test]
    fn test_split_terse_keeps_empty_fields() {
        assert_eq!(split_terse(" :42:"), vec![" ", "42", ""]);
    }

    #[test]
    fn test_split_terse_unescapes_backslash() {
        assert_eq!(split_terse(r"a\\b:c"), vec![r"a\b", "c"]);
    }

    // ── device show ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_device_show_connected_station() {
        // Arrange
        let out = "GENERAL.STATE:100 (connected)\n\
                   GENERAL.CONNECTION:home\n\
                   GENERAL.HWADDR:AA\\:BB\\:CC\\:DD\\:EE\\:FF\n\
                   IP4.ADDRESS[1]:192.168.1.42/24\n\
                   IP4.ADDRESS[2]:10.0.0.5/8\n";

        // Act
        let show = parse_device_show(out);

        // Assert
        assert_eq!(
            show,
            DeviceShow {
                state: Some(100),
                connection: Some("home".into()),
                hardware_address: Some("aa:bb:cc:dd:ee:ff".into()),
                address: Some(Ipv4Addr::new(192, 168, 1, 42)),
            }
        );
    }

    #[test]
    fn test_parse_device_show_disconnected() {
        let out = "GENERAL.STATE:30 (disconnected)\nGENERAL.CONNECTION:--\nGENERAL.HWADDR:AA\\:BB\\:CC\\:DD\\:EE\\:FF\n";
        let show = parse_device_show(out);
        assert_eq!(show.state, Some(30));
        assert_eq!(show.connection, None);
        assert_eq!(show.address, None);
    }

    #[test]
    fn test_parse_ipv4_cidr_accepts_bare_and_prefixed() {
        assert_eq!(
            parse_ipv4_cidr("10.42.0.1/24"),
            Some(Ipv4Addr::new(10, 42, 0, 1))
        );
        assert_eq!(
            parse_ipv4_cidr("10.42.0.1"),
            Some(Ipv4Addr::new(10, 42, 0, 1))
        );
        assert_eq!(parse_ipv4_cidr("fe80::1/64"), None);
    }

    // ── wifi list ─────────────────────────────────────────────────────────────

    #[test]
    fn test_percent_to_dbm_matches_network_manager_scale() {
        assert_eq!(percent_to_dbm(100), -50);
        assert_eq!(percent_to_dbm(80), -60);
        assert_eq!(percent_to_dbm(0), -100);
        assert_eq!(percent_to_dbm(255), -50);
    }

    #[test]
    fn test_parse_wifi_list_dedups_sorts_and_skips_hidden() {
        // Arrange
        let out = " :40:cafe\n*:80:home\n :60:cafe\n :90:\n :70:office\\:2F\n";

        // Act
        let networks = parse_wifi_list(out);

        // Assert
        assert_eq!(
            networks,
            vec![
                ScannedNetwork { ssid: "home".into(), rssi: -60 },
                ScannedNetwork { ssid: "office:2F".into(), rssi: -65 },
                ScannedNetwork { ssid: "cafe".into(), rssi: -70 },
            ]
        );
    }

    #[test]
    fn test_parse_in_use_finds_starred_line() {
        let out = " :40:cafe\n*:80:home\n";
        assert_eq!(parse_in_use(out), Some(("home".into(), -60)));
        assert_eq!(parse_in_use(" :40:cafe\n"), None);
    }

    #[test]
    fn test_parse_wifi_list_ignores_garbage_lines() {
        assert!(parse_wifi_list("not terse output\n:x:y\n").is_empty());
    }

    // ── Argument builders ─────────────────────────────────────────────────────

    #[test]
    fn test_connect_args_do_not_wait_for_activation() {
        let a = connect_args("wlan0", &WifiCredentials::new("home", "hunter22"));
        assert_eq!(
            a,
            args(&[
                "--wait", "0", "device", "wifi", "connect", "home", "password", "hunter22",
                "ifname", "wlan0"
            ])
        );
    }

    #[test]
    fn test_connect_args_omit_password_for_open_network() {
        let a = connect_args("wlan0", &WifiCredentials::new("cafe", ""));
        assert!(!a.iter().any(|s| s == "password"));
    }

    #[test]
    fn test_open_access_point_has_no_security_settings() {
        let a = add_ap_args("wlan0", &AccessPointConfig::default());
        assert!(a.windows(2).any(|w| w == ["ssid", "NodeLink_Config"]));
        assert!(a.windows(2).any(|w| w == ["ipv4.method", "shared"]));
        assert!(!a.iter().any(|s| s == "wifi-sec.psk"));
    }

    #[test]
    fn test_secured_access_point_sets_psk() {
        let config = AccessPointConfig {
            ssid: "setup".into(),
            password: "letmein99".into(),
        };
        let a = add_ap_args("wlan0", &config);
        assert!(a.windows(2).any(|w| w == ["wifi-sec.psk", "letmein99"]));
    }

    #[test]
    fn test_describe_masks_secrets() {
        let line = describe(&connect_args(
            "wlan0",
            &WifiCredentials::new("home", "hunter22"),
        ));
        assert!(!line.contains("hunter22"), "got {line}");
        assert!(line.contains("password ***"));
    }
}
