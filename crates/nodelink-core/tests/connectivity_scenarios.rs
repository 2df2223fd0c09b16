//! Integration tests for the connectivity state machine.
//!
//! These tests drive the machine through complete device lifecycles using
//! only the public API and a manual clock, the way the device control loop
//! does on real hardware.

use std::time::Duration;

use nodelink_core::domain::indicator::blink_phase;
use nodelink_core::{
    Clock, ConnectivityMachine, DeviceMode, LinkState, ManualClock, RadioCommand, WifiCredentials,
    JOIN_BUDGET,
};

const TICK: Duration = Duration::from_millis(100);

fn creds() -> WifiCredentials {
    WifiCredentials::new("workshop", "correct horse")
}

/// Ticks every 100 ms for `span` with a fixed link state, collecting the
/// modes entered.
fn run_for(
    machine: &mut ConnectivityMachine,
    clock: &ManualClock,
    span: Duration,
    link: LinkState,
) -> Vec<DeviceMode> {
    let mut entered = Vec::new();
    let steps = span.as_millis() / TICK.as_millis();
    for _ in 0..steps {
        clock.advance(TICK);
        if let Some(transition) = machine.tick(clock.now(), link) {
            entered.push(transition.to);
        }
    }
    entered
}

#[test]
fn test_first_boot_provision_then_join() {
    // Arrange: fresh device, no credentials, operator submits them
    let clock = ManualClock::new();
    let mut machine = ConnectivityMachine::new();
    assert_eq!(machine.current_mode(), DeviceMode::Provisioning);

    // Act
    let transition = machine
        .credentials_available(creds(), clock.now())
        .expect("provisioning accepts credentials");
    let entered = run_for(&mut machine, &clock, Duration::from_secs(2), LinkState::UP);

    // Assert
    assert_eq!(transition.command, Some(RadioCommand::JoinNetwork(creds())));
    assert_eq!(entered, vec![DeviceMode::Connected]);
}

#[test]
fn test_wrong_password_falls_back_after_budget() {
    // Arrange
    let clock = ManualClock::new();
    let mut machine = ConnectivityMachine::new();
    machine.credentials_available(creds(), clock.now());

    // Act: the link never comes up
    let entered = run_for(&mut machine, &clock, JOIN_BUDGET * 2, LinkState::DOWN);

    // Assert: exactly one fallback, then the device stays put
    assert_eq!(entered, vec![DeviceMode::Provisioning]);
    assert_eq!(machine.current_mode(), DeviceMode::Provisioning);
}

#[test]
fn test_router_reboot_reconnects_without_provisioning() {
    // Arrange: connected device
    let clock = ManualClock::new();
    let mut machine = ConnectivityMachine::new();
    machine.credentials_available(creds(), clock.now());
    run_for(&mut machine, &clock, TICK, LinkState::UP);
    assert_eq!(machine.current_mode(), DeviceMode::Connected);

    // Act: router disappears for 10 s, then returns
    let mut entered = run_for(&mut machine, &clock, Duration::from_secs(10), LinkState::DOWN);
    entered.extend(run_for(&mut machine, &clock, Duration::from_secs(1), LinkState::UP));

    // Assert
    assert_eq!(entered, vec![DeviceMode::Joining, DeviceMode::Connected]);
}

#[test]
fn test_indicator_follows_machine_mode() {
    let clock = ManualClock::new();
    let start = clock.now();
    let mut machine = ConnectivityMachine::new();
    machine.credentials_available(creds(), clock.now());

    clock.advance(Duration::from_millis(250));
    let since_boot = clock.elapsed_since(start);
    assert!(blink_phase(machine.current_mode(), since_boot));

    machine.tick(clock.now(), LinkState::UP);
    assert!(!blink_phase(machine.current_mode(), since_boot));
}
