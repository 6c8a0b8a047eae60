//! Classification of chat-endpoint replies.
//!
//! The backend's reply is decoded once and matched on, so a body that is
//! not JSON is an ordinary branch here rather than an exception path.

use log::{debug, warn};

use serde_json::Value;

use crate::backend::{BackendError, RawReply};

/// What a settled chat request means for the transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// 2xx with a `response` field.
    Reply(String),
    /// An `error` field, whatever the status code.
    ApplicationError(String),
    /// 2xx with neither field.
    EmptyResponse,
    /// Network failure, non-JSON body, or non-2xx without an `error` field.
    Transport(String),
}

impl ChatOutcome {
    pub fn is_reply(&self) -> bool {
        matches!(self, ChatOutcome::Reply(_))
    }
}

/// A non-blank string field; absent, blank and non-string values are `None`.
fn text_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn undecodable(raw: &RawReply, err: &serde_json::Error) -> String {
    if raw.is_success() {
        format!("Invalid JSON in server response: {err}")
    } else {
        format!("Server responded with HTTP {}", raw.status)
    }
}

pub fn classify_chat(result: Result<RawReply, BackendError>) -> ChatOutcome {
    let raw = match result {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Chat request did not complete: {}", e);
            return ChatOutcome::Transport(e.to_string());
        }
    };

    // Syntax errors are transport failures; well-formed JSON of an
    // unexpected shape is an empty response.
    let outcome = match raw.json::<Value>() {
        Ok(body) => {
            if let Some(error) = text_field(&body, "error") {
                ChatOutcome::ApplicationError(error)
            } else if !raw.is_success() {
                ChatOutcome::Transport(format!("Server responded with HTTP {}", raw.status))
            } else if let Some(text) = text_field(&body, "response") {
                ChatOutcome::Reply(text)
            } else {
                ChatOutcome::EmptyResponse
            }
        }
        Err(e) => ChatOutcome::Transport(undecodable(&raw, &e)),
    };
    debug!("HTTP {} classified as {:?}", raw.status, outcome);
    outcome
}

/// Result of the `!modelinfo` request: the model name, or why there is none.
pub fn classify_model_info(result: Result<RawReply, BackendError>) -> Result<String, String> {
    let raw = result.map_err(|e| e.to_string())?;
    let body = raw.json::<Value>().map_err(|e| undecodable(&raw, &e))?;
    if let Some(error) = text_field(&body, "error") {
        Err(error)
    } else if !raw.is_success() {
        Err(format!("Server responded with HTTP {}", raw.status))
    } else {
        text_field(&body, "model")
            .ok_or_else(|| "The server did not report a model name.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> Result<RawReply, BackendError> {
        Ok(RawReply::new(status, body))
    }

    #[test]
    fn test_response_field_is_reply() {
        assert_eq!(
            classify_chat(reply(200, r#"{"response":"Hi **there**"}"#)),
            ChatOutcome::Reply("Hi **there**".to_string())
        );
    }

    #[test]
    fn test_error_field_wins_regardless_of_status() {
        assert_eq!(
            classify_chat(reply(500, r#"{"error":"model overloaded"}"#)),
            ChatOutcome::ApplicationError("model overloaded".to_string())
        );
        assert_eq!(
            classify_chat(reply(200, r#"{"error":"bad","response":"ignored"}"#)),
            ChatOutcome::ApplicationError("bad".to_string())
        );
    }

    #[test]
    fn test_success_without_fields_is_empty() {
        assert_eq!(classify_chat(reply(200, "{}")), ChatOutcome::EmptyResponse);
        assert_eq!(
            classify_chat(reply(200, r#"{"response":"   "}"#)),
            ChatOutcome::EmptyResponse
        );
    }

    #[test]
    fn test_unexpected_json_shape_is_empty() {
        for body in [r#"{"response":42}"#, r#"["hi"]"#, r#""hi""#, "null"] {
            assert_eq!(
                classify_chat(reply(200, body)),
                ChatOutcome::EmptyResponse,
                "{body}"
            );
        }
        assert_eq!(
            classify_chat(reply(200, r#"{"error":7,"response":"ok"}"#)),
            ChatOutcome::Reply("ok".to_string())
        );
    }

    #[test]
    fn test_model_info_unexpected_shape() {
        assert_eq!(
            classify_model_info(reply(200, r#"{"model":["llama3"]}"#)),
            Err("The server did not report a model name.".to_string())
        );
        assert_eq!(
            classify_model_info(reply(200, "null")),
            Err("The server did not report a model name.".to_string())
        );
        let err = classify_model_info(reply(200, "not json")).unwrap_err();
        assert!(err.starts_with("Invalid JSON"), "{err}");
    }

    #[test]
    fn test_non_json_error_body_is_transport() {
        assert_eq!(
            classify_chat(reply(502, "<html>Bad Gateway</html>")),
            ChatOutcome::Transport("Server responded with HTTP 502".to_string())
        );
    }

    #[test]
    fn test_non_json_success_body_is_transport() {
        let outcome = classify_chat(reply(200, "plain text"));
        assert!(
            matches!(&outcome, ChatOutcome::Transport(d) if d.starts_with("Invalid JSON")),
            "{outcome:?}"
        );
    }

    #[test]
    fn test_non_2xx_json_without_error_is_transport() {
        assert_eq!(
            classify_chat(reply(404, r#"{"detail":"nope"}"#)),
            ChatOutcome::Transport("Server responded with HTTP 404".to_string())
        );
    }

    #[test]
    fn test_network_failure_is_transport() {
        let outcome = classify_chat(Err(BackendError::Network("connection refused".into())));
        assert_eq!(
            outcome,
            ChatOutcome::Transport("network error: connection refused".to_string())
        );
        assert!(!outcome.is_reply());
    }

    #[test]
    fn test_model_info() {
        assert_eq!(
            classify_model_info(reply(200, r#"{"model":"ai/smollm2"}"#)),
            Ok("ai/smollm2".to_string())
        );
        assert_eq!(
            classify_model_info(reply(500, r#"{"error":"no model"}"#)),
            Err("no model".to_string())
        );
        assert!(classify_model_info(reply(200, r#"{"response":"hi"}"#)).is_err());
        assert!(classify_model_info(Err(BackendError::Network("down".into()))).is_err());
    }
}
