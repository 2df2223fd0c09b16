//! Console routes: HTTP requests to console commands and back.
//!
//! | Route               | Method | Command              |
//! |---------------------|--------|----------------------|
//! | `/`                 | GET    | `Overview`           |
//! | `/scan`             | GET    | `Scan`               |
//! | `/save`             | POST   | `SaveWifi`           |
//! | `/reset`            | POST   | `Reset`              |
//! | `/restart`          | POST   | `Restart`            |
//! | `/status`           | GET    | `Status`             |
//! | `/getParams`        | GET    | `GetParams`          |
//! | `/saveParams`       | POST   | `SaveParams`         |
//! | `/testTransmission` | POST   | `TestConnectivity`   |
//!
//! POST bodies are JSON.  The parameter objects use the short field names
//! the dashboard has always used (`user`, `pass`).

use nodelink_core::domain::target::{
    is_valid_host, is_valid_path, DEFAULT_RPC_PATH, DEFAULT_RPC_PORT,
};
use nodelink_core::{DeviceMode, RpcTarget, TargetOverrides, WifiCredentials};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::commands::{ConsoleCommand, ConsoleQueue, ConsoleReply, ConsoleRequest};
use crate::infrastructure::console::pages;
use crate::infrastructure::console::server::{HttpRequest, HttpResponse};

// ── Wire types ────────────────────────────────────────────────────────────────

/// Body of `POST /save`.  Both fields must be present.
#[derive(Debug, Deserialize)]
struct WifiForm {
    ssid: Option<String>,
    password: Option<String>,
}

/// The RPC target as the dashboard sends and receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsDto {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

fn default_port() -> u16 {
    DEFAULT_RPC_PORT
}
fn default_path() -> String {
    DEFAULT_RPC_PATH.to_string()
}

impl From<&RpcTarget> for ParamsDto {
    fn from(t: &RpcTarget) -> Self {
        Self {
            host: t.host.clone(),
            port: t.port,
            path: t.path.clone(),
            user: t.username.clone(),
            pass: t.password.clone(),
        }
    }
}

impl TryFrom<ParamsDto> for RpcTarget {
    type Error = HttpResponse;

    /// Trims the host and maps a cleared path to the default.  A blank host
    /// is accepted here; it only matters once a test is requested.
    fn try_from(p: ParamsDto) -> Result<Self, HttpResponse> {
        let host = checked_host(Some(p.host))?.unwrap_or_default();
        let path = checked_path(Some(p.path))?.unwrap_or_else(default_path);
        Ok(Self {
            host,
            port: p.port,
            path,
            username: p.user,
            password: p.pass,
        })
    }
}

/// Body of `POST /testTransmission`: any field may be left out.
#[derive(Debug, Default, Deserialize)]
struct OverridesDto {
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    user: Option<String>,
    pass: Option<String>,
}

impl TryFrom<OverridesDto> for TargetOverrides {
    type Error = HttpResponse;

    /// A cleared path field means "use the stored path".
    fn try_from(o: OverridesDto) -> Result<Self, HttpResponse> {
        Ok(Self {
            host: checked_host(o.host)?,
            port: o.port,
            path: checked_path(o.path)?,
            username: o.user,
            password: o.pass,
        })
    }
}

/// Trims `host` and refuses one that would corrupt the `Host` header.
fn checked_host(host: Option<String>) -> Result<Option<String>, HttpResponse> {
    match host.map(|h| h.trim().to_string()) {
        Some(h) if !is_valid_host(&h) => Err(HttpResponse::text(400, "Host invalid")),
        other => Ok(other),
    }
}

/// Maps an empty `path` to `None` and refuses one that is not a plain
/// absolute path.
fn checked_path(path: Option<String>) -> Result<Option<String>, HttpResponse> {
    match path.map(|p| p.trim().to_string()) {
        Some(p) if p.is_empty() => Ok(None),
        Some(p) if !is_valid_path(&p) => Err(HttpResponse::text(400, "Path invalid")),
        other => Ok(other),
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Handles one request end to end.
pub async fn dispatch(request: &HttpRequest, queue: &ConsoleQueue) -> HttpResponse {
    let command = match command_for(request) {
        Ok(command) => command,
        Err(response) => return response,
    };
    let is_overview = matches!(command, ConsoleCommand::Overview);

    let (queued, reply) = ConsoleRequest::new(command);
    if queue.send(queued).await.is_err() {
        return HttpResponse::text(503, "Device restarting");
    }
    match reply.await {
        Ok(ConsoleReply::Overview(overview)) if is_overview => {
            if overview.mode == DeviceMode::Connected {
                HttpResponse::html(pages::render_dashboard(&overview))
            } else {
                HttpResponse::html(pages::render_provisioning())
            }
        }
        Ok(reply) => respond(reply),
        Err(_) => {
            warn!("control loop dropped a console request");
            HttpResponse::text(503, "Device restarting")
        }
    }
}

/// Maps a request to the command it asks for, or to an immediate error reply.
pub fn command_for(request: &HttpRequest) -> Result<ConsoleCommand, HttpResponse> {
    let method = request.method.as_str();
    let command = match request.path.as_str() {
        "/" => ConsoleCommand::Overview,
        "/scan" => ConsoleCommand::Scan,
        "/status" => ConsoleCommand::Status,
        "/getParams" => ConsoleCommand::GetParams,
        "/save" => {
            require_post(method)?;
            wifi_from(&request.body)?
        }
        "/reset" => {
            require_post(method)?;
            ConsoleCommand::Reset
        }
        "/restart" => {
            require_post(method)?;
            ConsoleCommand::Restart
        }
        "/saveParams" => {
            require_post(method)?;
            let params: ParamsDto = parse_body(&request.body)?;
            ConsoleCommand::SaveParams(params.try_into()?)
        }
        "/testTransmission" => {
            require_post(method)?;
            let overrides: OverridesDto = if request.body.is_empty() {
                OverridesDto::default()
            } else {
                parse_body(&request.body)?
            };
            ConsoleCommand::TestConnectivity(overrides.try_into()?)
        }
        _ => return Err(HttpResponse::text(404, "Not found")),
    };
    Ok(command)
}

/// Turns a control-loop reply into an HTTP response.
pub fn respond(reply: ConsoleReply) -> HttpResponse {
    match reply {
        ConsoleReply::Overview(overview) => HttpResponse::html(pages::render_dashboard(&overview)),
        ConsoleReply::Networks(networks) => HttpResponse::json(&networks),
        ConsoleReply::Status(status) => HttpResponse::json(&status),
        ConsoleReply::Params(target) => HttpResponse::json(&ParamsDto::from(&target)),
        ConsoleReply::Done(message) => HttpResponse::text(200, message),
        ConsoleReply::Probe(outcome) => HttpResponse::text(200, outcome.console_message()),
        ConsoleReply::Rejected(message) => HttpResponse::text(400, message),
        ConsoleReply::Failed(message) => HttpResponse::text(500, message),
    }
}

fn require_post(method: &str) -> Result<(), HttpResponse> {
    if method == "POST" {
        Ok(())
    } else {
        Err(HttpResponse::text(405, "Method not allowed"))
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, HttpResponse> {
    serde_json::from_slice(body).map_err(|e| HttpResponse::text(400, format!("Invalid JSON: {e}")))
}

fn wifi_from(body: &[u8]) -> Result<ConsoleCommand, HttpResponse> {
    let missing = || HttpResponse::text(400, "Missing args");
    let form: WifiForm = serde_json::from_slice(body).map_err(|_| missing())?;
    match (form.ssid, form.password) {
        (Some(ssid), Some(password)) => {
            let credentials = WifiCredentials::new(ssid, password);
            if credentials.is_usable() {
                Ok(ConsoleCommand::SaveWifi(credentials))
            } else {
                Err(missing())
            }
        }
        _ => Err(missing()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
