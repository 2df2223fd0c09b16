//! NodeLink device daemon: entry point.
//!
//! # Usage
//!
//! ```text
//! nodelink-device [OPTIONS]
//!
//! Options:
//!   --config <PATH>          Settings file [default: ~/.config/nodelink/config.toml]
//!   --console-bind <ADDR>    Browser console address [default: 0.0.0.0:80]
//!   --ap-ssid <SSID>         Provisioning access point name [default: NodeLink_Config]
//!   --ap-password <PASS>     Provisioning access point passphrase [default: open]
//!   --interface <IFACE>      Wireless interface [default: wlan0]
//!   --radio <nmcli|mock>     Radio backend [default: mock]
//!   --led <PATH>             Sysfs LED brightness file [default: log only]
//!   --tick-ms <MS>           Control loop tick [default: 100]
//!   --log-level <LEVEL>      Used when RUST_LOG is unset [default: info]
//! ```
//!
//! Every option can also be set through a `NODELINK_*` environment variable
//! (e.g. `NODELINK_RADIO=nmcli`).  CLI args take precedence.
//!
//! # What happens at startup
//!
//! 1. Logging is initialised from `RUST_LOG`, or `--log-level` if unset.
//! 2. The console listener is bound and its accept loop spawned.
//! 3. The control loop runs on a fresh [`DeviceContext`] built from the
//!    settings file.  When it returns `Restart` (after a save, reset, or
//!    restart from the console) a new context is built and the loop runs
//!    again; the console keeps serving throughout.
//! 4. Ctrl+C ends the loop and stops the console.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use nodelink_core::TokioClock;
use nodelink_device::application::ports::{IndicatorSink, Prober, Radio};
use nodelink_device::application::{
    control_loop, DeviceContext, DeviceParts, LoopExit, LoopTimings, ProbeClient,
    CONSOLE_QUEUE_DEPTH,
};
use nodelink_device::domain::config::DEFAULT_AP_SSID;
use nodelink_device::domain::{AccessPointConfig, DeviceConfig, RadioBackend};
use nodelink_device::infrastructure::console;
use nodelink_device::infrastructure::network::TcpConnector;
use nodelink_device::infrastructure::presentation::{LogLed, LogStatusBar, SysfsLed};
use nodelink_device::infrastructure::radio::{NmcliRadio, SimulatedRadio};
use nodelink_device::infrastructure::storage::{config_file_path, TomlSettingsStore};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Radio backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RadioArg {
    /// NetworkManager via `nmcli`.
    Nmcli,
    /// Simulated radio with one demo network.
    #[value(alias = "simulated")]
    Mock,
}

/// NodeLink appliance daemon.
#[derive(Debug, Parser)]
#[command(
    name = "nodelink-device",
    about = "Wi-Fi provisioning, connectivity supervision, and browser console",
    version
)]
struct Cli {
    /// Settings file holding the Wi-Fi credentials and the RPC target.
    #[arg(long, env = "NODELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Address the browser console listens on.
    #[arg(long, default_value = "0.0.0.0:80", env = "NODELINK_CONSOLE_BIND")]
    console_bind: String,

    /// SSID of the provisioning access point.
    #[arg(long, default_value = DEFAULT_AP_SSID, env = "NODELINK_AP_SSID")]
    ap_ssid: String,

    /// WPA2 passphrase of the provisioning access point; empty for open.
    #[arg(
        long,
        default_value = "",
        env = "NODELINK_AP_PASSWORD",
        hide_env_values = true
    )]
    ap_password: String,

    /// Wireless interface the radio drives.
    #[arg(long, default_value = "wlan0", env = "NODELINK_INTERFACE")]
    interface: String,

    #[arg(long, value_enum, default_value_t = RadioArg::Mock, env = "NODELINK_RADIO")]
    radio: RadioArg,

    /// Sysfs brightness file of the indicator LED.
    #[arg(long, env = "NODELINK_LED")]
    led: Option<PathBuf>,

    /// Control loop tick in milliseconds.
    #[arg(long, default_value_t = 100, env = "NODELINK_TICK_MS")]
    tick_ms: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", env = "NODELINK_LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    /// Converts the parsed arguments into a [`DeviceConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable `--console-bind`, a zero
    /// `--tick-ms`, or an access point passphrase WPA2 would reject.
    fn into_device_config(self) -> anyhow::Result<DeviceConfig> {
        let console_bind: SocketAddr = self
            .console_bind
            .parse()
            .with_context(|| format!("invalid console bind address: '{}'", self.console_bind))?;

        if self.tick_ms == 0 {
            bail!("--tick-ms must be at least 1");
        }
        let password_len = self.ap_password.chars().count();
        if password_len != 0 && !(8..=63).contains(&password_len) {
            bail!("--ap-password must be empty or 8 to 63 characters");
        }
        if self.ap_ssid.is_empty() {
            bail!("--ap-ssid must not be empty");
        }

        let settings_path = match self.config {
            Some(path) => path,
            None => config_file_path().unwrap_or_else(|_| DeviceConfig::default().settings_path),
        };

        Ok(DeviceConfig {
            settings_path,
            console_bind,
            access_point: AccessPointConfig {
                ssid: self.ap_ssid,
                password: self.ap_password,
            },
            interface: self.interface,
            radio: match self.radio {
                RadioArg::Nmcli => RadioBackend::Nmcli,
                RadioArg::Mock => RadioBackend::Simulated,
            },
            led_path: self.led,
            tick: Duration::from_millis(self.tick_ms),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = cli.into_device_config()?;

    // One thread is plenty: the control loop and the console are both
    // I/O-bound, and the loop owns all device state.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the tokio runtime")?;
    runtime.block_on(run_device(config))
}

async fn run_device(config: DeviceConfig) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        console = %config.console_bind,
        settings = %config.settings_path.display(),
        radio = ?config.radio,
        "NodeLink device starting"
    );

    let listener = TcpListener::bind(config.console_bind)
        .await
        .with_context(|| format!("failed to bind console listener on {}", config.console_bind))?;

    let running = Arc::new(AtomicBool::new(true));
    let (queue, mut requests) = mpsc::channel(CONSOLE_QUEUE_DEPTH);
    let console_task = tokio::spawn(console::serve(listener, queue, Arc::clone(&running)));

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("received Ctrl+C; shutting down");
                    shutdown.notify_one();
                }
                Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
            }
        });
    }

    // Both survive soft restarts.
    let radio = build_radio(&config);
    let prober: Arc<dyn Prober> = Arc::new(ProbeClient::new(TcpConnector));
    let timings = LoopTimings::with_tick(config.tick);

    loop {
        let mut ctx = DeviceContext::boot(device_parts(&config, &radio, &prober));
        let exit = tokio::select! {
            exit = control_loop::run(&mut ctx, &mut requests, timings) => exit,
            _ = shutdown.notified() => LoopExit::Shutdown,
        };
        match exit {
            LoopExit::Restart => info!("soft restart"),
            LoopExit::Shutdown => break,
        }
    }

    running.store(false, Ordering::Relaxed);
    if let Err(e) = console_task.await {
        warn!("console task ended abnormally: {e}");
    }
    info!("NodeLink device stopped");
    Ok(())
}

fn build_radio(config: &DeviceConfig) -> Arc<dyn Radio> {
    match config.radio {
        RadioBackend::Nmcli => Arc::new(NmcliRadio::new(config.interface.clone())),
        RadioBackend::Simulated => {
            info!("simulated radio: join 'NodeLink_Demo' with password 'nodelink'");
            Arc::new(SimulatedRadio::new().with_network("NodeLink_Demo", "nodelink", -55))
        }
    }
}

fn device_parts(
    config: &DeviceConfig,
    radio: &Arc<dyn Radio>,
    prober: &Arc<dyn Prober>,
) -> DeviceParts {
    let indicator: Box<dyn IndicatorSink> = match &config.led_path {
        Some(path) => Box::new(SysfsLed::new(path)),
        None => Box::new(LogLed),
    };
    DeviceParts {
        radio: Arc::clone(radio),
        prober: Arc::clone(prober),
        store: Box::new(TomlSettingsStore::new(&config.settings_path)),
        indicator,
        status: Box::new(LogStatusBar::new()),
        clock: Arc::new(TokioClock),
        access_point: config.access_point.clone(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
