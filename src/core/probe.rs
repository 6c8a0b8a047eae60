//! # Connection Probe
//!
//! Reachability check against the backend's connection-test endpoint.
//! `probe()` never fails: whatever goes wrong is folded into an `error`
//! status with a human-readable detail.

use std::sync::Arc;

use chrono::{DateTime, Local};
use log::{info, warn};

use crate::backend::{
    BackendError, CONNECTION_TEST_PATH, ChatBackend, ConnectionTestReport, HealthReport, RawReply,
    ReportStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Unknown,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    pub state: ProbeState,
    pub detail: Option<String>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ProbeState::Unknown,
            detail: None,
        }
    }
}

impl ConnectionStatus {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            state: ProbeState::Ok,
            detail: Some(detail.into()),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            state: ProbeState::Error,
            detail: Some(detail.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.state == ProbeState::Ok
    }
}

/// Everything the diagnostics view shows.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub status: ConnectionStatus,
    /// The server's full report, when its body could be decoded.
    pub report: Option<ConnectionTestReport>,
    pub health: Result<HealthReport, String>,
    pub checked_at: DateTime<Local>,
}

#[derive(Clone)]
pub struct ConnectionProbe {
    backend: Arc<dyn ChatBackend>,
}

impl ConnectionProbe {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    pub fn base_url(&self) -> &str {
        self.backend.base_url()
    }

    pub async fn probe(&self) -> ConnectionStatus {
        let result = self.backend.connection_test().await;
        let (status, _) = interpret(result);
        info!("Connection probe: {:?} {:?}", status.state, status.detail);
        status
    }

    /// Probe plus health check, for the diagnostics view.
    pub async fn inspect(&self) -> Diagnostics {
        let (test, health) = tokio::join!(self.backend.connection_test(), self.backend.health());
        let (status, report) = interpret(test);
        let health = match health {
            Ok(raw) => raw
                .json::<HealthReport>()
                .map_err(|e| format!("HTTP {}: {e}", raw.status)),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = &health {
            warn!("Health check failed: {}", e);
        }
        Diagnostics {
            status,
            report,
            health,
            checked_at: Local::now(),
        }
    }
}

fn interpret(
    result: Result<RawReply, BackendError>,
) -> (ConnectionStatus, Option<ConnectionTestReport>) {
    let raw = match result {
        Ok(raw) => raw,
        Err(e) => return (ConnectionStatus::error(e.to_string()), None),
    };
    match raw.json::<ConnectionTestReport>() {
        Ok(report) => {
            let status = if raw.is_success() && report.status == ReportStatus::Ok {
                ConnectionStatus::ok(
                    report
                        .message
                        .clone()
                        .unwrap_or_else(|| "Connection successful".to_string()),
                )
            } else {
                ConnectionStatus::error(
                    report
                        .message
                        .clone()
                        .unwrap_or_else(|| format!("Connection test failed (HTTP {})", raw.status)),
                )
            };
            (status, Some(report))
        }
        Err(e) => (
            ConnectionStatus::error(format!(
                "Unreadable connection test reply (HTTP {}): {e}",
                raw.status
            )),
            None,
        ),
    }
}

/// Strip the angle brackets from backend-supplied text before it is placed
/// inside a system message that is rendered as markup.
pub fn defang(text: &str) -> String {
    text.replace('<', "‹").replace('>', "›")
}

/// Multi-line notice shown when the startup probe fails.
pub fn unreachable_diagnostic(detail: &str, base_url: &str) -> String {
    format!(
        "Error: Could not connect to the LLM backend: {detail}\n\
         \n\
         Possible causes:\n\
         1. The backend server is not running.\n\
         2. The server is listening on a different port than {base}.\n\
         3. The server does not expose the expected API (/api/chat, {path}).\n\
         \n\
         Open the <a href=\"{base}{path}\">connection diagnostics</a> (Ctrl+D) for details.",
        detail = defang(detail),
        base = defang(base_url),
        path = CONNECTION_TEST_PATH,
    )
}
