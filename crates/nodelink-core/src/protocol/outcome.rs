//! The terminal result of one probe and its console rendering.

use std::fmt;

use serde::Serialize;

/// Which of the two connections a connect failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbePhase {
    /// The token-fetching round.
    Initial,
    /// The authenticated round, on a fresh connection.
    Retry,
}

impl ProbePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbePhase::Initial => "initial",
            ProbePhase::Retry => "retry",
        }
    }
}

/// Which response read hit its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadStage {
    FirstResponse,
    SecondResponse,
}

impl ReadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadStage::FirstResponse => "first-response",
            ReadStage::SecondResponse => "second-response",
        }
    }
}

/// Why a reachable service still failed the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolFault {
    /// The first response carried no session token.
    MissingSessionToken,
    /// The second response had no parseable JSON with a `result` string.
    InvalidBody,
    /// The service answered with a `result` other than `"success"`.
    Rpc(String),
}

impl fmt::Display for ProtocolFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolFault::MissingSessionToken => f.write_str("missing session token"),
            ProtocolFault::InvalidBody => f.write_str("invalid body"),
            ProtocolFault::Rpc(result) => f.write_str(result),
        }
    }
}

/// Broad category of a failed probe, for logging and dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Nothing answered in time.
    Transport,
    /// Something answered and rejected the credentials.
    Auth,
    /// Something answered but not the way the RPC service should.
    Protocol,
}

/// Exactly one of these ends every probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success {
        download_display: String,
        upload_display: String,
    },
    AuthFailed,
    ConnectFailed {
        phase: ProbePhase,
    },
    Timeout {
        stage: ReadStage,
    },
    ProtocolError {
        fault: ProtocolFault,
    },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    /// `None` for a successful probe.
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            ProbeOutcome::Success { .. } => None,
            ProbeOutcome::AuthFailed => Some(FailureClass::Auth),
            ProbeOutcome::ConnectFailed { .. } | ProbeOutcome::Timeout { .. } => {
                Some(FailureClass::Transport)
            }
            ProbeOutcome::ProtocolError { .. } => Some(FailureClass::Protocol),
        }
    }

    /// The one-line text shown to the operator on the console.
    pub fn console_message(&self) -> String {
        match self {
            ProbeOutcome::Success {
                download_display,
                upload_display,
            } => format!("Success! DL: {download_display} | UL: {upload_display}"),
            ProbeOutcome::AuthFailed => "Auth Failed (401)".to_string(),
            ProbeOutcome::ConnectFailed {
                phase: ProbePhase::Initial,
            } => "Conn Failed (TCP)".to_string(),
            ProbeOutcome::ConnectFailed {
                phase: ProbePhase::Retry,
            } => "Conn Failed (Reconnect)".to_string(),
            ProbeOutcome::Timeout {
                stage: ReadStage::FirstResponse,
            } => "Timeout (1)".to_string(),
            ProbeOutcome::Timeout {
                stage: ReadStage::SecondResponse,
            } => "Timeout (2)".to_string(),
            ProbeOutcome::ProtocolError {
                fault: ProtocolFault::MissingSessionToken,
            } => "No Session ID (Path?)".to_string(),
            ProbeOutcome::ProtocolError {
                fault: ProtocolFault::InvalidBody,
            } => "Invalid Resp Body".to_string(),
            ProbeOutcome::ProtocolError {
                fault: ProtocolFault::Rpc(result),
            } => format!("RPC Error: {result}"),
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Success {
                download_display,
                upload_display,
            } => write!(f, "success (down {download_display}, up {upload_display})"),
            ProbeOutcome::AuthFailed => f.write_str("auth failed"),
            ProbeOutcome::ConnectFailed { phase } => {
                write!(f, "connect failed ({})", phase.as_str())
            }
            ProbeOutcome::Timeout { stage } => write!(f, "timeout ({})", stage.as_str()),
            ProbeOutcome::ProtocolError { fault } => write!(f, "protocol error: {fault}"),
        }
    }
}
