//! Connectivity state machine: provisioning → joining → connected.
//!
//! # Lifecycle (for beginners)
//!
//! ```text
//!                credentials available
//!  Provisioning ───────────────────────► Joining ──── link up ────► Connected
//!       ▲                                  │  ▲                        │
//!       └──── 20 s budget exceeded ────────┘  └────── link lost ───────┘
//! ```
//!
//! - `Provisioning`: the radio broadcasts the appliance's own access point
//!   and the console waits for an operator to enter network credentials.
//! - `Joining`: the radio is associating with the configured network.  A
//!   [`JoinAttempt`] records when this episode started; if the link is not up
//!   within [`JOIN_BUDGET`] the machine falls back to `Provisioning`.
//! - `Connected`: associated and holding an address.  Losing the link starts
//!   a brand-new Joining episode with a fresh budget.
//!
//! The machine is pure: it never talks to the radio itself.  Each call that
//! changes mode returns a [`Transition`] carrying the [`RadioCommand`] (if
//! any) the control loop must apply.  At most one transition happens per
//! call, so no mode is ever skipped.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::domain::mode::DeviceMode;
use crate::timing::Deadline;

/// How long a single Joining episode may last before falling back.
pub const JOIN_BUDGET: Duration = Duration::from_millis(20_000);

/// Network credentials for station (client) mode.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }

    /// Credentials with an empty SSID cannot be joined and count as absent.
    pub fn is_usable(&self) -> bool {
        !self.ssid.is_empty()
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Link observation reported by the radio on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkState {
    /// The radio is associated with an access point.
    pub associated: bool,
    /// An IP address has been acquired on the station interface.
    pub has_address: bool,
}

impl LinkState {
    pub const DOWN: LinkState = LinkState {
        associated: false,
        has_address: false,
    };

    pub const UP: LinkState = LinkState {
        associated: true,
        has_address: true,
    };

    /// Usable link: associated and addressed.
    pub fn is_up(&self) -> bool {
        self.associated && self.has_address
    }
}

/// Side effect the control loop applies to the radio after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCommand {
    /// Switch to access-point mode and broadcast the provisioning network.
    StartAccessPoint,
    /// Switch to station mode and begin associating with the given network.
    JoinNetwork(WifiCredentials),
}

/// One mode change, returned by the machine for the loop to act on and log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: DeviceMode,
    pub to: DeviceMode,
    pub command: Option<RadioCommand>,
}

/// The ephemeral record of one Joining episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinAttempt {
    deadline: Deadline,
}

impl JoinAttempt {
    fn begin(now: Instant, budget: Duration) -> Self {
        Self {
            deadline: Deadline::starting_at(now, budget),
        }
    }

    /// When this Joining episode began.
    pub fn started_at(&self) -> Instant {
        self.deadline.started_at()
    }

    /// Time spent joining so far.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.deadline.elapsed(now)
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_expired(now)
    }
}

/// Mode plus the data that only exists in that mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeState {
    Provisioning,
    Joining(JoinAttempt),
    Connected,
}

impl ModeState {
    fn mode(&self) -> DeviceMode {
        match self {
            ModeState::Provisioning => DeviceMode::Provisioning,
            ModeState::Joining(_) => DeviceMode::Joining,
            ModeState::Connected => DeviceMode::Connected,
        }
    }
}

/// The connectivity state machine.
#[derive(Debug, Clone)]
pub struct ConnectivityMachine {
    state: ModeState,
    credentials: Option<WifiCredentials>,
    join_budget: Duration,
}

impl Default for ConnectivityMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMachine {
    /// A fresh machine in `Provisioning` with no credentials and the
    /// standard [`JOIN_BUDGET`].
    pub fn new() -> Self {
        Self::with_join_budget(JOIN_BUDGET)
    }

    /// A fresh machine with a custom join budget.
    pub fn with_join_budget(join_budget: Duration) -> Self {
        Self {
            state: ModeState::Provisioning,
            credentials: None,
            join_budget,
        }
    }

    pub fn current_mode(&self) -> DeviceMode {
        self.state.mode()
    }

    /// The current Joining episode, present iff the mode is `Joining`.
    pub fn join_attempt(&self) -> Option<&JoinAttempt> {
        match &self.state {
            ModeState::Joining(attempt) => Some(attempt),
            _ => None,
        }
    }

    /// Credentials the machine joins with, once supplied.
    pub fn credentials(&self) -> Option<&WifiCredentials> {
        self.credentials.as_ref()
    }

    pub fn join_budget(&self) -> Duration {
        self.join_budget
    }

    /// Offers credentials (stored at boot, or just saved by an operator).
    ///
    /// Only `Provisioning` reacts: the machine moves to `Joining`, starts the
    /// episode budget at `now`, and asks the radio to join.  In any other mode
    /// the offer is ignored and `None` is returned.  Unusable credentials
    /// (empty SSID) are always ignored.
    pub fn credentials_available(
        &mut self,
        credentials: WifiCredentials,
        now: Instant,
    ) -> Option<Transition> {
        if !credentials.is_usable() || self.state != ModeState::Provisioning {
            debug!(mode = %self.current_mode(), "credentials offer ignored");
            return None;
        }
        self.credentials = Some(credentials.clone());
        self.state = ModeState::Joining(JoinAttempt::begin(now, self.join_budget));
        Some(Transition {
            from: DeviceMode::Provisioning,
            to: DeviceMode::Joining,
            command: Some(RadioCommand::JoinNetwork(credentials)),
        })
    }

    /// Advances the machine with the latest link observation.
    ///
    /// Returns the transition taken, or `None` if the mode is unchanged.
    pub fn tick(&mut self, now: Instant, link: LinkState) -> Option<Transition> {
        match self.state {
            ModeState::Provisioning => None,
            ModeState::Joining(attempt) => {
                if link.is_up() {
                    self.state = ModeState::Connected;
                    Some(Transition {
                        from: DeviceMode::Joining,
                        to: DeviceMode::Connected,
                        command: None,
                    })
                } else if attempt.is_expired(now) {
                    info!(
                        elapsed_ms = attempt.elapsed(now).as_millis() as u64,
                        "join attempt exceeded its budget; falling back to access point"
                    );
                    self.state = ModeState::Provisioning;
                    Some(Transition {
                        from: DeviceMode::Joining,
                        to: DeviceMode::Provisioning,
                        command: Some(RadioCommand::StartAccessPoint),
                    })
                } else {
                    None
                }
            }
            ModeState::Connected => {
                if link.is_up() {
                    None
                } else {
                    // The radio keeps its station profile, so the same stored
                    // credentials are reused without a new join command.
                    self.state = ModeState::Joining(JoinAttempt::begin(now, self.join_budget));
                    Some(Transition {
                        from: DeviceMode::Connected,
                        to: DeviceMode::Joining,
                        command: None,
                    })
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> WifiCredentials {
        WifiCredentials::new("home-net", "hunter22")
    }

    fn joining_machine(t0: Instant) -> ConnectivityMachine {
        let mut machine = ConnectivityMachine::new();
        machine
            .credentials_available(creds(), t0)
            .expect("provisioning must accept credentials");
        machine
    }

    #[test]
    fn test_new_machine_starts_in_provisioning_without_attempt() {
        let machine = ConnectivityMachine::new();
        assert_eq!(machine.current_mode(), DeviceMode::Provisioning);
        assert!(machine.join_attempt().is_none());
        assert!(machine.credentials().is_none());
    }

    #[test]
    fn test_credentials_move_provisioning_to_joining_with_join_command() {
        // Arrange
        let t0 = Instant::now();
        let mut machine = ConnectivityMachine::new();

        // Act
        let transition = machine.credentials_available(creds(), t0);

        // Assert
        assert_eq!(
            transition,
            Some(Transition {
                from: DeviceMode::Provisioning,
                to: DeviceMode::Joining,
                command: Some(RadioCommand::JoinNetwork(creds())),
            })
        );
        assert_eq!(machine.current_mode(), DeviceMode::Joining);
        assert_eq!(machine.join_attempt().map(|a| a.started_at()), Some(t0));
    }

    #[test]
    fn test_empty_ssid_is_ignored() {
        let mut machine = ConnectivityMachine::new();
        let transition = machine.credentials_available(WifiCredentials::new("", "pw"), Instant::now());
        assert!(transition.is_none());
        assert_eq!(machine.current_mode(), DeviceMode::Provisioning);
    }

    #[test]
    fn test_credentials_ignored_outside_provisioning() {
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);
        let again = machine.credentials_available(WifiCredentials::new("other", "x"), t0);
        assert!(again.is_none());
        assert_eq!(machine.credentials(), Some(&creds()));
    }

    #[test]
    fn test_provisioning_tick_never_transitions() {
        let mut machine = ConnectivityMachine::new();
        let t0 = Instant::now();
        assert!(machine.tick(t0, LinkState::UP).is_none());
        assert!(machine.tick(t0 + Duration::from_secs(60), LinkState::DOWN).is_none());
        assert_eq!(machine.current_mode(), DeviceMode::Provisioning);
    }

    #[test]
    fn test_joining_to_connected_when_link_up_clears_attempt() {
        // Arrange
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);

        // Act
        let transition = machine.tick(t0 + Duration::from_secs(4), LinkState::UP);

        // Assert
        assert_eq!(
            transition.map(|t| (t.from, t.to, t.command)),
            Some((DeviceMode::Joining, DeviceMode::Connected, None))
        );
        assert!(machine.join_attempt().is_none());
    }

    #[test]
    fn test_association_without_address_keeps_joining() {
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);
        let half_up = LinkState {
            associated: true,
            has_address: false,
        };
        assert!(machine.tick(t0 + Duration::from_secs(1), half_up).is_none());
        assert_eq!(machine.current_mode(), DeviceMode::Joining);
    }

    #[test]
    fn test_joining_stays_put_at_exact_budget_boundary() {
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);
        let at_boundary = t0 + Duration::from_millis(20_000);
        assert!(machine.tick(at_boundary, LinkState::DOWN).is_none());
        assert_eq!(machine.current_mode(), DeviceMode::Joining);
    }

    #[test]
    fn test_joining_times_out_to_provisioning_exactly_once() {
        // Arrange: Joining entered at t0, link never comes up
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);
        let mut transitions = Vec::new();

        // Act: tick every 100 ms up to t0 + 25 s
        for step in 1..=250u64 {
            let now = t0 + Duration::from_millis(step * 100);
            if let Some(t) = machine.tick(now, LinkState::DOWN) {
                transitions.push((now - t0, t));
            }
        }

        // Assert: exactly one transition, straight to Provisioning, just past 20 s
        assert_eq!(transitions.len(), 1);
        let (at, transition) = &transitions[0];
        assert_eq!(transition.from, DeviceMode::Joining);
        assert_eq!(transition.to, DeviceMode::Provisioning);
        assert_eq!(transition.command, Some(RadioCommand::StartAccessPoint));
        assert_eq!(*at, Duration::from_millis(20_100));
        assert!(machine.join_attempt().is_none());
    }

    #[test]
    fn test_link_up_wins_over_expired_budget() {
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);
        let transition = machine.tick(t0 + Duration::from_secs(30), LinkState::UP);
        assert_eq!(transition.map(|t| t.to), Some(DeviceMode::Connected));
    }

    #[test]
    fn test_connected_link_loss_starts_fresh_attempt() {
        // Arrange
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);
        machine.tick(t0 + Duration::from_secs(5), LinkState::UP);

        // Act: link lost a minute later
        let lost_at = t0 + Duration::from_secs(65);
        let transition = machine.tick(lost_at, LinkState::DOWN);

        // Assert: new episode measured from the loss, credentials unchanged
        assert_eq!(
            transition,
            Some(Transition {
                from: DeviceMode::Connected,
                to: DeviceMode::Joining,
                command: None,
            })
        );
        assert_eq!(machine.join_attempt().map(|a| a.started_at()), Some(lost_at));
        assert_eq!(machine.credentials(), Some(&creds()));
    }

    #[test]
    fn test_budget_is_charged_per_episode_not_accumulated() {
        // Arrange: first episode uses 15 s before connecting
        let t0 = Instant::now();
        let mut machine = joining_machine(t0);
        machine.tick(t0 + Duration::from_secs(15), LinkState::UP);

        // Act: link lost at 100 s, second episode ticks 15 s in
        let lost_at = t0 + Duration::from_secs(100);
        machine.tick(lost_at, LinkState::DOWN);
        let mid_second = machine.tick(lost_at + Duration::from_secs(15), LinkState::DOWN);

        // Assert: 15 + 15 > 20 but each episode is charged separately
        assert!(mid_second.is_none());
        assert_eq!(machine.current_mode(), DeviceMode::Joining);
    }

    #[test]
    fn test_custom_join_budget_is_honoured() {
        let t0 = Instant::now();
        let mut machine = ConnectivityMachine::with_join_budget(Duration::from_secs(2));
        machine.credentials_available(creds(), t0);
        let transition = machine.tick(t0 + Duration::from_millis(2_001), LinkState::DOWN);
        assert_eq!(transition.map(|t| t.to), Some(DeviceMode::Provisioning));
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let debug = format!("{:?}", creds());
        assert!(debug.contains("home-net"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_flapping_link_sequence_keeps_episode_invariants() {
        // Arrange: a deterministic pseudo-random link pattern (LCG), 0.5 s ticks
        let t0 = Instant::now();
        let mut machine = ConnectivityMachine::new();
        let mut seed: u32 = 0x2545_F491;
        let mut previous = machine.current_mode();
        let mut episode_start: Option<Instant> = None;
        let mut transitions = 0;

        for step in 0..2_000u64 {
            let now = t0 + Duration::from_millis(step * 500);
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let link = if (seed >> 24) % 5 == 0 { LinkState::UP } else { LinkState::DOWN };

            // Re-offer credentials every time the machine sits in Provisioning
            let transition = if machine.current_mode() == DeviceMode::Provisioning {
                machine.credentials_available(creds(), now)
            } else {
                machine.tick(now, link)
            };

            if let Some(t) = transition {
                transitions += 1;
                // Act / Assert: each call changes mode by exactly one edge
                assert_eq!(t.from, previous);
                assert_ne!(t.from, t.to);
                match (t.from, t.to) {
                    (DeviceMode::Provisioning, DeviceMode::Joining)
                    | (DeviceMode::Connected, DeviceMode::Joining) => {
                        episode_start = Some(now);
                    }
                    (DeviceMode::Joining, DeviceMode::Connected)
                    | (DeviceMode::Joining, DeviceMode::Provisioning) => {
                        let started = episode_start.take().expect("joining had an episode");
                        // Left within the budget plus one tick of granularity
                        assert!(now - started <= JOIN_BUDGET + Duration::from_millis(500));
                    }
                    other => panic!("illegal transition {other:?}"),
                }
                previous = t.to;
            }

            // JoinAttempt exists iff Joining
            assert_eq!(
                machine.join_attempt().is_some(),
                machine.current_mode() == DeviceMode::Joining
            );
        }

        assert!(transitions > 0);
    }
}
