//! Requests from the browser console to the control loop.
//!
//! The console server runs in its own task but never touches device state.
//! It turns each HTTP request into a [`ConsoleRequest`], sends it over a
//! bounded channel, and waits on the attached oneshot for the reply.  The
//! channel is the queue: requests are handled one at a time, in order.

use std::net::Ipv4Addr;

use nodelink_core::{DeviceMode, ProbeOutcome, RpcTarget, TargetOverrides, WifiCredentials};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::ScannedNetwork;

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Data for the landing page.
    Overview,
    /// List visible networks.
    Scan,
    /// Persist new Wi-Fi credentials, then restart.
    SaveWifi(WifiCredentials),
    /// Erase all settings, then restart.
    Reset,
    Restart,
    /// Mode and signal strength.
    Status,
    /// The stored RPC target.
    GetParams,
    /// Persist a new RPC target.
    SaveParams(RpcTarget),
    /// Probe the stored target with one-off overrides applied.
    TestConnectivity(TargetOverrides),
}

/// What the landing page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOverview {
    pub mode: DeviceMode,
    pub ssid: Option<String>,
    pub address: Option<Ipv4Addr>,
    pub rssi_dbm: Option<i32>,
    pub hardware_address: Option<String>,
}

/// Body of the `/status` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Station signal in dBm; `0` when not associated.
    pub rssi: i32,
    pub mode: DeviceMode,
}

/// The control loop's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleReply {
    Overview(DeviceOverview),
    Networks(Vec<ScannedNetwork>),
    Status(StatusSnapshot),
    Params(RpcTarget),
    /// Plain-text acknowledgement ("Saved", "Params saved!", ...).
    Done(String),
    Probe(ProbeOutcome),
    /// The request was understood but refused ("Host invalid").
    Rejected(String),
    /// The request failed on the device side (store or radio error).
    Failed(String),
}

/// One queued console request.
#[derive(Debug)]
pub struct ConsoleRequest {
    pub command: ConsoleCommand,
    pub reply: oneshot::Sender<ConsoleReply>,
}

/// Sending half held by the console server.
pub type ConsoleQueue = mpsc::Sender<ConsoleRequest>;

/// Queue depth between the console server and the control loop.
pub const CONSOLE_QUEUE_DEPTH: usize = 8;

impl ConsoleRequest {
    /// Builds a request and the receiver its reply will arrive on.
    pub fn new(command: ConsoleCommand) -> (Self, oneshot::Receiver<ConsoleReply>) {
        let (reply, rx) = oneshot::channel();
        (Self { command, reply }, rx)
    }
}
