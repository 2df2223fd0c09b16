//! The device control loop.
//!
//! One task runs this loop and owns the [`DeviceContext`].  It wakes on two
//! things:
//!
//! - **Ticks** (100 ms by default).  Each tick steps the connectivity machine
//!   with the latest link report, applies any radio command the step returned,
//!   and updates the indicator LED.  Every 500 ms it also re-reads the radio
//!   link and refreshes the status bar.
//! - **Console requests**, handled one at a time to completion.  A
//!   connectivity probe is awaited right here, so while it runs no ticks are
//!   processed; missed ticks are skipped rather than replayed.
//!
//! The loop ends with a [`LoopExit`]: `Restart` after a save/reset/restart
//! request (once a short grace period lets the reply reach the browser), or
//! `Shutdown` when the console queue closes.

use std::time::{Duration, Instant};

use nodelink_core::domain::status_bar::{StatusBarFrame, StatusInputs};
use nodelink_core::{RadioCommand, TargetError, Transition};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::commands::{
    ConsoleCommand, ConsoleReply, ConsoleRequest, DeviceOverview, StatusSnapshot,
};
use crate::application::context::{DeviceContext, StoredSettings};
use crate::application::ports::LinkReport;

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Rebuild the context from the settings store and run again.
    Restart,
    /// Stop the daemon.
    Shutdown,
}

/// Periods that drive the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTimings {
    pub tick: Duration,
    /// How often the radio link is re-read.
    pub link_poll: Duration,
    /// How often the status bar is recomposed.
    pub display_refresh: Duration,
    /// Delay between acknowledging a restart request and restarting.
    pub restart_grace: Duration,
}

impl Default for LoopTimings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            link_poll: Duration::from_millis(500),
            display_refresh: Duration::from_millis(500),
            restart_grace: Duration::from_secs(1),
        }
    }
}

impl LoopTimings {
    /// Defaults with a custom tick.
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }
}

/// Runs the loop until a restart or shutdown is due.
pub async fn run(
    ctx: &mut DeviceContext,
    requests: &mut mpsc::Receiver<ConsoleRequest>,
    timings: LoopTimings,
) -> LoopExit {
    enter_initial_mode(ctx).await;

    let mut ticker = tokio::time::interval(timings.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_link_poll: Option<Instant> = None;
    let mut last_display: Option<Instant> = None;
    let mut restart_at: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = ctx.now();
                if restart_at.is_some_and(|at| now >= at) {
                    info!("restarting");
                    return LoopExit::Restart;
                }
                if is_due(last_link_poll, now, timings.link_poll) {
                    refresh_link(ctx).await;
                    last_link_poll = Some(now);
                }
                step_machine(ctx, now).await;
                update_indicator(ctx);
                if is_due(last_display, now, timings.display_refresh) {
                    refresh_status_bar(ctx);
                    last_display = Some(now);
                }
            }
            request = requests.recv() => {
                let Some(request) = request else {
                    info!("console queue closed; shutting down");
                    return LoopExit::Shutdown;
                };
                if handle_request(ctx, request).await && restart_at.is_none() {
                    restart_at = Some(ctx.now() + timings.restart_grace);
                }
            }
        }
    }
}

fn is_due(last: Option<Instant>, now: Instant, period: Duration) -> bool {
    last.map_or(true, |t| now.saturating_duration_since(t) >= period)
}

// ── Connectivity ──────────────────────────────────────────────────────────────

/// Boot: join with stored credentials, or open the access point.
async fn enter_initial_mode(ctx: &mut DeviceContext) {
    let stored = ctx.settings.wifi.clone().filter(|c| c.is_usable());
    match stored {
        Some(credentials) => {
            let now = ctx.now();
            if let Some(transition) = ctx.machine.credentials_available(credentials, now) {
                apply_transition(ctx, transition).await;
            }
        }
        None => {
            info!("no stored credentials; entering provisioning");
            start_access_point(ctx).await;
        }
    }
}

async fn step_machine(ctx: &mut DeviceContext, now: Instant) {
    let link = ctx.last_link.link_state();
    if let Some(transition) = ctx.machine.tick(now, link) {
        apply_transition(ctx, transition).await;
    }
}

async fn apply_transition(ctx: &mut DeviceContext, transition: Transition) {
    info!(from = %transition.from, to = %transition.to, "mode transition");
    match transition.command {
        Some(RadioCommand::StartAccessPoint) => start_access_point(ctx).await,
        Some(RadioCommand::JoinNetwork(credentials)) => {
            info!(ssid = %credentials.ssid, "joining network");
            ctx.access_point_address = None;
            ctx.last_link = LinkReport::default();
            if let Err(e) = ctx.radio.join(&credentials).await {
                // Only elapsed time decides the fallback; the error is informational.
                warn!("radio join failed: {e}");
            }
        }
        None => {}
    }
}

async fn start_access_point(ctx: &mut DeviceContext) {
    ctx.last_link = LinkReport::default();
    match ctx.radio.start_access_point(&ctx.access_point).await {
        Ok(address) => {
            info!(ssid = %ctx.access_point.ssid, ?address, "access point up");
            ctx.access_point_address = address;
        }
        Err(e) => warn!("could not start access point: {e}"),
    }
}

async fn refresh_link(ctx: &mut DeviceContext) {
    match ctx.radio.link().await {
        Ok(report) => ctx.last_link = report,
        Err(e) => {
            debug!("link query failed: {e}");
            ctx.last_link = LinkReport::default();
        }
    }
}

// ── Presentation ──────────────────────────────────────────────────────────────

fn update_indicator(ctx: &mut DeviceContext) {
    let mode = ctx.current_mode();
    let since_boot = ctx.since_boot();
    if let Some(lit) = ctx.presentation.indicator.update(mode, since_boot) {
        if let Err(e) = ctx.indicator.set_lit(lit) {
            warn!("{e}");
        }
    }
}

fn refresh_status_bar(ctx: &mut DeviceContext) {
    let inputs = StatusInputs {
        station_address: ctx.last_link.address,
        access_point_address: ctx.access_point_address,
        rssi_dbm: ctx.last_link.signal_dbm,
    };
    let frame = StatusBarFrame::compose(ctx.current_mode(), inputs, ctx.since_boot());
    let changes = frame.changes_since(ctx.presentation.last_frame.as_ref());
    if changes.any() {
        ctx.status.render(&frame, changes);
    }
    ctx.presentation.last_frame = Some(frame);
}

// ── Console requests ──────────────────────────────────────────────────────────

/// Handles one request.  Returns `true` if a restart should follow.
async fn handle_request(ctx: &mut DeviceContext, request: ConsoleRequest) -> bool {
    let ConsoleRequest { command, reply } = request;
    debug!(?command, "console request");

    let (answer, restart) = match command {
        ConsoleCommand::Overview => (ConsoleReply::Overview(overview(ctx)), false),
        ConsoleCommand::Status => (
            ConsoleReply::Status(StatusSnapshot {
                rssi: ctx.last_link.signal_dbm.unwrap_or(0),
                mode: ctx.current_mode(),
            }),
            false,
        ),
        ConsoleCommand::Scan => match ctx.radio.scan().await {
            Ok(networks) => (ConsoleReply::Networks(networks), false),
            Err(e) => {
                warn!("scan failed: {e}");
                (ConsoleReply::Failed(format!("Scan failed: {e}")), false)
            }
        },
        ConsoleCommand::SaveWifi(credentials) => {
            let updated = StoredSettings {
                wifi: Some(credentials),
                ..ctx.settings.clone()
            };
            match persist(ctx, updated) {
                Ok(()) => (ConsoleReply::Done("Saved".into()), true),
                Err(reply) => (reply, false),
            }
        }
        ConsoleCommand::Reset => match ctx.store.erase() {
            Ok(()) => {
                info!("settings erased");
                ctx.settings = StoredSettings::default();
                (ConsoleReply::Done("Reset".into()), true)
            }
            Err(e) => {
                warn!("could not erase settings: {e}");
                (ConsoleReply::Failed(e.to_string()), false)
            }
        },
        ConsoleCommand::Restart => (ConsoleReply::Done("Restarting...".into()), true),
        ConsoleCommand::GetParams => (ConsoleReply::Params(ctx.settings.target.clone()), false),
        ConsoleCommand::SaveParams(target) => {
            let updated = StoredSettings {
                target,
                ..ctx.settings.clone()
            };
            match persist(ctx, updated) {
                Ok(()) => (ConsoleReply::Done("Params saved!".into()), false),
                Err(reply) => (reply, false),
            }
        }
        ConsoleCommand::TestConnectivity(overrides) => {
            let target = ctx.settings.target.with_overrides(&overrides);
            match target.validate() {
                Ok(()) => (ConsoleReply::Probe(ctx.prober.probe(&target).await), false),
                Err(e) => {
                    debug!("connectivity test refused: {e}");
                    let message = match e {
                        TargetError::InvalidPath => "Path invalid",
                        TargetError::EmptyHost | TargetError::InvalidHost => "Host invalid",
                    };
                    (ConsoleReply::Rejected(message.into()), false)
                }
            }
        }
    };

    if reply.send(answer).is_err() {
        debug!("console client went away before the reply");
    }
    restart
}

fn persist(ctx: &mut DeviceContext, updated: StoredSettings) -> Result<(), ConsoleReply> {
    match ctx.store.save(&updated) {
        Ok(()) => {
            ctx.settings = updated;
            info!("settings saved");
            Ok(())
        }
        Err(e) => {
            warn!("could not save settings: {e}");
            Err(ConsoleReply::Failed(e.to_string()))
        }
    }
}

fn overview(ctx: &DeviceContext) -> DeviceOverview {
    let link = &ctx.last_link;
    DeviceOverview {
        mode: ctx.current_mode(),
        ssid: link.ssid.clone(),
        address: link.address,
        rssi_dbm: link.signal_dbm,
        hardware_address: link.hardware_address.clone(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use nodelink_core::{
        DeviceMode, ProbeOutcome, RpcTarget, TargetOverrides, TokioClock, WifiCredentials,
    };

    use crate::application::context::DeviceParts;
    use crate::application::ports::{
        MockIndicatorSink, MockProber, MockRadio, MockSettingsStore, MockStatusSink, StoreError,
    };
    use crate::domain::AccessPointConfig;

    // ── Fixtures ──────────────────────────────────────────────────────────────

    fn creds() -> WifiCredentials {
        WifiCredentials::new("home", "hunter22")
    }

    fn connected_report() -> LinkReport {
        LinkReport {
            associated: true,
            address: Some(Ipv4Addr::new(192, 168, 1, 42)),
            ssid: Some("home".into()),
            signal_dbm: Some(-58),
            hardware_address: Some("aa:bb:cc:dd:ee:ff".into()),
        }
    }

    fn quiet_presentation() -> (MockIndicatorSink, MockStatusSink) {
        let mut led = MockIndicatorSink::new();
        led.expect_set_lit().returning(|_| Ok(()));
        let mut status = MockStatusSink::new();
        status.expect_render().returning(|_, _| ());
        (led, status)
    }

    fn store_with(settings: StoredSettings) -> MockSettingsStore {
        let mut store = MockSettingsStore::new();
        store.expect_load().returning(move || Ok(settings.clone()));
        store
    }

    fn context(radio: MockRadio, prober: MockProber, store: MockSettingsStore) -> DeviceContext {
        let (led, status) = quiet_presentation();
        DeviceContext::boot(DeviceParts {
            radio: Arc::new(radio),
            prober: Arc::new(prober),
            store: Box::new(store),
            indicator: Box::new(led),
            status: Box::new(status),
            clock: Arc::new(TokioClock),
            access_point: AccessPointConfig::default(),
        })
    }

    /// Sends `commands` one after another and collects the replies, then
    /// keeps the queue open for `linger` before closing it.
    async fn drive(
        tx: mpsc::Sender<ConsoleRequest>,
        commands: Vec<ConsoleCommand>,
        linger: Duration,
    ) -> Vec<ConsoleReply> {
        let mut replies = Vec::new();
        for command in commands {
            let (request, rx) = ConsoleRequest::new(command);
            tx.send(request).await.unwrap();
            replies.push(rx.await.unwrap());
        }
        tokio::time::sleep(linger).await;
        drop(tx);
        replies
    }

    // ── Boot ──────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_boot_without_credentials_starts_access_point() {
        // Arrange
        let mut radio = MockRadio::new();
        radio
            .expect_start_access_point()
            .times(1)
            .returning(|_| Ok(Some(Ipv4Addr::new(10, 42, 0, 1))));
        radio.expect_join().never();
        radio.expect_link().returning(|| Ok(LinkReport::default()));
        let mut ctx = context(radio, MockProber::new(), store_with(StoredSettings::default()));
        let (tx, mut rx) = mpsc::channel(4);

        // Act
        let (exit, _) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(tx, vec![], Duration::from_secs(30))
        );

        // Assert: provisioning never times out
        assert_eq!(exit, LoopExit::Shutdown);
        assert_eq!(ctx.current_mode(), DeviceMode::Provisioning);
        assert_eq!(ctx.access_point_address, Some(Ipv4Addr::new(10, 42, 0, 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_with_credentials_joins_and_connects() {
        // Arrange
        let mut radio = MockRadio::new();
        radio
            .expect_join()
            .withf(|c: &WifiCredentials| c.ssid == "home")
            .times(1)
            .returning(|_| Ok(()));
        radio.expect_start_access_point().never();
        radio.expect_link().returning(|| Ok(connected_report()));
        let settings = StoredSettings {
            wifi: Some(creds()),
            ..StoredSettings::default()
        };
        let mut ctx = context(radio, MockProber::new(), store_with(settings));
        let (tx, mut rx) = mpsc::channel(4);

        // Act
        let (_, _) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(tx, vec![], Duration::from_secs(2))
        );

        // Assert
        assert_eq!(ctx.current_mode(), DeviceMode::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_that_never_associates_falls_back_once() {
        // Arrange
        let mut radio = MockRadio::new();
        radio.expect_join().times(1).returning(|_| Ok(()));
        radio
            .expect_start_access_point()
            .times(1)
            .returning(|_| Ok(None));
        radio.expect_link().returning(|| Ok(LinkReport::default()));
        let settings = StoredSettings {
            wifi: Some(creds()),
            ..StoredSettings::default()
        };
        let mut ctx = context(radio, MockProber::new(), store_with(settings));
        let (tx, mut rx) = mpsc::channel(4);

        // Act: well past the 20 s budget
        let (_, _) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(tx, vec![], Duration::from_secs(45))
        );

        // Assert
        assert_eq!(ctx.current_mode(), DeviceMode::Provisioning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_store_boots_into_provisioning() {
        let mut store = MockSettingsStore::new();
        store
            .expect_load()
            .returning(|| Err(StoreError("disk on fire".into())));
        let mut radio = MockRadio::new();
        radio
            .expect_start_access_point()
            .times(1)
            .returning(|_| Ok(None));
        radio.expect_link().returning(|| Ok(LinkReport::default()));
        let mut ctx = context(radio, MockProber::new(), store);
        let (tx, mut rx) = mpsc::channel(4);

        let (exit, _) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(tx, vec![], Duration::from_millis(500))
        );

        assert_eq!(exit, LoopExit::Shutdown);
        assert_eq!(ctx.settings(), &StoredSettings::default());
    }

    // ── Console requests ──────────────────────────────────────────────────────

    fn provisioning_radio() -> MockRadio {
        let mut radio = MockRadio::new();
        radio.expect_start_access_point().returning(|_| Ok(None));
        radio.expect_link().returning(|| Ok(LinkReport::default()));
        radio
    }

    #[tokio::test(start_paused = true)]
    async fn test_test_connectivity_with_empty_host_is_rejected_without_probing() {
        // Arrange
        let mut prober = MockProber::new();
        prober.expect_probe().never();
        let mut ctx = context(
            provisioning_radio(),
            prober,
            store_with(StoredSettings::default()),
        );
        let (tx, mut rx) = mpsc::channel(4);

        // Act
        let (_, replies) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(
                tx,
                vec![ConsoleCommand::TestConnectivity(TargetOverrides {
                    host: Some("   ".into()),
                    ..TargetOverrides::default()
                })],
                Duration::ZERO
            )
        );

        // Assert
        assert_eq!(replies, vec![ConsoleReply::Rejected("Host invalid".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_test_connectivity_with_line_break_in_path_is_refused_up_front() {
        // Arrange: the stored host is fine, the override path is not
        let stored = StoredSettings {
            wifi: None,
            target: RpcTarget {
                host: "nas.local".into(),
                ..RpcTarget::default()
            },
        };
        let mut prober = MockProber::new();
        prober.expect_probe().never();
        let mut ctx = context(provisioning_radio(), prober, store_with(stored));
        let (tx, mut rx) = mpsc::channel(4);

        // Act
        let (_, replies) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(
                tx,
                vec![ConsoleCommand::TestConnectivity(TargetOverrides {
                    path: Some("/rpc HTTP/1.1\r\nX-Transmission-Session-Id: forged\r\nX:".into()),
                    ..TargetOverrides::default()
                })],
                Duration::ZERO
            )
        );

        // Assert
        assert_eq!(replies, vec![ConsoleReply::Rejected("Path invalid".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_test_connectivity_probes_stored_target_with_overrides() {
        // Arrange: stored target has credentials, the request overrides the host
        let stored = StoredSettings {
            wifi: None,
            target: RpcTarget {
                host: "old-host".into(),
                username: "admin".into(),
                ..RpcTarget::default()
            },
        };
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .withf(|t: &RpcTarget| t.host == "10.0.0.9" && t.username == "admin" && t.port == 9091)
            .times(1)
            .returning(|_| ProbeOutcome::AuthFailed);
        let mut ctx = context(provisioning_radio(), prober, store_with(stored.clone()));
        let (tx, mut rx) = mpsc::channel(4);

        // Act
        let (_, replies) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(
                tx,
                vec![ConsoleCommand::TestConnectivity(TargetOverrides {
                    host: Some("10.0.0.9".into()),
                    ..TargetOverrides::default()
                })],
                Duration::ZERO
            )
        );

        // Assert: the stored target is untouched
        assert_eq!(replies, vec![ConsoleReply::Probe(ProbeOutcome::AuthFailed)]);
        assert_eq!(ctx.settings(), &stored);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_wifi_persists_then_restarts_after_grace() {
        // Arrange
        let saved = Arc::new(AtomicBool::new(false));
        let saved_flag = Arc::clone(&saved);
        let mut store = store_with(StoredSettings::default());
        store
            .expect_save()
            .withf(|s: &StoredSettings| s.wifi.as_ref().map(|c| c.ssid.as_str()) == Some("home"))
            .times(1)
            .returning(move |_| {
                saved_flag.store(true, Ordering::SeqCst);
                Ok(())
            });
        let mut ctx = context(provisioning_radio(), MockProber::new(), store);
        let (tx, mut rx) = mpsc::channel(4);

        // Act: keep the queue open so only the restart can end the loop
        let (exit, replies) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(
                tx,
                vec![ConsoleCommand::SaveWifi(creds())],
                Duration::from_secs(60)
            )
        );

        // Assert
        assert_eq!(replies, vec![ConsoleReply::Done("Saved".into())]);
        assert_eq!(exit, LoopExit::Restart);
        assert!(saved.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_reports_error_and_does_not_restart() {
        let mut store = store_with(StoredSettings::default());
        store
            .expect_save()
            .returning(|_| Err(StoreError("read-only file system".into())));
        let mut ctx = context(provisioning_radio(), MockProber::new(), store);
        let (tx, mut rx) = mpsc::channel(4);

        let (exit, replies) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(tx, vec![ConsoleCommand::SaveWifi(creds())], Duration::from_secs(3))
        );

        assert!(matches!(replies[0], ConsoleReply::Failed(_)));
        assert_eq!(exit, LoopExit::Shutdown);
        assert_eq!(ctx.settings().wifi, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_erases_and_restarts() {
        let mut store = store_with(StoredSettings {
            wifi: Some(creds()),
            ..StoredSettings::default()
        });
        store.expect_erase().times(1).returning(|| Ok(()));
        let mut radio = MockRadio::new();
        radio.expect_join().returning(|_| Ok(()));
        radio.expect_link().returning(|| Ok(connected_report()));
        let mut ctx = context(radio, MockProber::new(), store);
        let (tx, mut rx) = mpsc::channel(4);

        let (exit, replies) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(tx, vec![ConsoleCommand::Reset], Duration::from_secs(60))
        );

        assert_eq!(replies, vec![ConsoleReply::Done("Reset".into())]);
        assert_eq!(exit, LoopExit::Restart);
        assert_eq!(ctx.settings(), &StoredSettings::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_params_persists_without_restart() {
        let target = RpcTarget {
            host: "nas.local".into(),
            ..RpcTarget::default()
        };
        let mut store = store_with(StoredSettings::default());
        store.expect_save().times(1).returning(|_| Ok(()));
        let mut ctx = context(provisioning_radio(), MockProber::new(), store);
        let (tx, mut rx) = mpsc::channel(4);

        let (exit, replies) = tokio::join!(
            run(&mut ctx, &mut rx, LoopTimings::default()),
            drive(
                tx,
                vec![
                    ConsoleCommand::SaveParams(target.clone()),
                    ConsoleCommand::GetParams
                ],
                Duration::from_secs(3)
            )
        );

        assert_eq!(
            replies,
            vec![
                ConsoleReply::Done("Params saved!".into()),
                ConsoleReply::Params(target)
            ]
        );
        assert_eq!(exit, LoopExit::Shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reports_mode_and_signal() {
        let mut radio = MockRadio::new();
        radio.expect_join().returning(|_| Ok(()));
        radio.expect_link().returning(|| Ok(connected_report()));
        let settings = StoredSettings {
            wifi: Some(creds()),
            ..StoredSettings::default()
        };
        let mut ctx = context(radio, MockProber::new(), store_with(settings));
        let (tx, mut rx) = mpsc::channel(4);

        let (_, replies) = tokio::join!(run(&mut ctx, &mut rx, LoopTimings::default()), async {
            // Let a few ticks pass so the link is polled and the machine connects
            tokio::time::sleep(Duration::from_secs(1)).await;
            drive(tx, vec![ConsoleCommand::Status], Duration::ZERO).await
        });

        assert_eq!(
            replies,
            vec![ConsoleReply::Status(StatusSnapshot {
                rssi: -58,
                mode: DeviceMode::Connected,
            })]
        );
    }
}
