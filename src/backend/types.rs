use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Status and undecoded body of an HTTP exchange.
///
/// Transport failures never produce a `RawReply`; they surface as
/// `BackendError` instead. Everything that made it back over the wire,
/// including non-2xx statuses and non-JSON bodies, ends up here.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. Callers branch on the result instead of
    /// treating a parse failure as exceptional. The chat reply has three
    /// optional fields (`response`, `model`, `error`) and is read as a
    /// `serde_json::Value` so that an unexpected shape is not a parse error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ok,
    Error,
    #[serde(other)]
    Unknown,
}

/// Outcome of one endpoint tried by the server during a connection test.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EndpointResult {
    pub status: ReportStatus,
    #[serde(default)]
    pub message: String,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub response_text: Option<String>,
}

/// Body of `GET /api/connection-test`.
///
/// Only `status` and `message` matter to the startup probe. The rest is the
/// server's full report, shown in the diagnostics view.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectionTestReport {
    pub status: ReportStatus,
    pub message: Option<String>,
    #[serde(default)]
    pub endpoints_tested: Vec<String>,
    #[serde(default)]
    pub endpoint_results: BTreeMap<String, EndpointResult>,
    pub working_endpoint: Option<String>,
    pub suggestion: Option<String>,
    pub model: Option<String>,
    pub time: Option<String>,
}

/// Body of `GET /health`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub llm_api: Option<String>,
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serializes_message_field() {
        let body = serde_json::to_string(&ChatRequest { message: "hello" }).unwrap();
        assert_eq!(body, r#"{"message":"hello"}"#);
    }

    #[test]
    fn test_raw_reply_success_range() {
        assert!(RawReply::new(200, "").is_success());
        assert!(RawReply::new(204, "").is_success());
        assert!(!RawReply::new(302, "").is_success());
        assert!(!RawReply::new(500, "").is_success());
    }

    #[test]
    fn test_raw_reply_json_reports_parse_failure() {
        let raw = RawReply::new(502, "<html>Bad Gateway</html>");
        assert!(raw.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_connection_report_parses_full_server_shape() {
        let body = r#"{
            "endpoints_tested": ["http://localhost:12434/v1/chat/completions"],
            "model": "ai/smollm2",
            "time": "2026-01-01T10:00:00",
            "status": "ok",
            "message": "Successfully connected to http://localhost:12434/v1/chat/completions",
            "working_endpoint": "http://localhost:12434/v1/chat/completions",
            "endpoint_results": {
                "http://localhost:12434/v1/chat/completions": {
                    "status": "ok",
                    "message": "Connection successful",
                    "status_code": 200
                }
            }
        }"#;
        let report: ConnectionTestReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.status, ReportStatus::Ok);
        assert_eq!(report.endpoints_tested.len(), 1);
        let result = &report.endpoint_results["http://localhost:12434/v1/chat/completions"];
        assert_eq!(result.status_code, Some(200));
        assert_eq!(report.model.as_deref(), Some("ai/smollm2"));
    }

    #[test]
    fn test_unrecognised_report_status_is_unknown() {
        let report: ConnectionTestReport =
            serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert_eq!(report.status, ReportStatus::Unknown);
        assert!(report.endpoint_results.is_empty());
    }
}
