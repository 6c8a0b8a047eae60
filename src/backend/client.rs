use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::types::{ChatRequest, RawReply};
use super::{CHAT_PATH, CONNECTION_TEST_PATH, HEALTH_PATH};

/// Transport-level failures. A reply that made it back over the wire is
/// never an error here, whatever its status code.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Client misconfigured (unparseable base URL).
    Config(String),
    /// Connection refused, DNS failure, timeout, or a body that could not be read.
    Network(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "configuration error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The three HTTP endpoints the client consumes.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Base URL the endpoints hang off, used to build diagnostic links.
    fn base_url(&self) -> &str;

    /// `POST /api/chat` with `{ "message": ... }`.
    async fn chat(&self, message: &str) -> Result<RawReply, BackendError>;

    /// `GET /api/connection-test`.
    async fn connection_test(&self) -> Result<RawReply, BackendError>;

    /// `GET /health`.
    async fn health(&self) -> Result<RawReply, BackendError>;
}

/// reqwest-backed implementation of [`ChatBackend`].
pub struct HttpBackend {
    base_url: String,
    probe_timeout: Duration,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, probe_timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            probe_timeout,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, BackendError> {
        reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| BackendError::Config(format!("invalid backend URL {}: {e}", self.base_url)))
    }

    async fn read(response: reqwest::Response) -> Result<RawReply, BackendError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        debug!("Backend replied HTTP {} ({} bytes)", status, body.len());
        Ok(RawReply { status, body })
    }

    /// GET with the probe timeout. Diagnostic requests are bounded; chat is not.
    async fn probe_get(&self, path: &str) -> Result<RawReply, BackendError> {
        let url = self.url(path)?;
        info!("Probing {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| {
                warn!("Probe request to {} failed: {}", path, e);
                BackendError::Network(e.to_string())
            })?;
        Self::read(response).await
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn chat(&self, message: &str) -> Result<RawReply, BackendError> {
        let url = self.url(CHAT_PATH)?;
        info!("Dispatching chat request ({} chars)", message.chars().count());
        let response = self
            .client
            .post(url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| {
                warn!("Chat request failed: {}", e);
                BackendError::Network(e.to_string())
            })?;
        Self::read(response).await
    }

    async fn connection_test(&self) -> Result<RawReply, BackendError> {
        self.probe_get(CONNECTION_TEST_PATH).await
    }

    async fn health(&self) -> Result<RawReply, BackendError> {
        self.probe_get(HEALTH_PATH).await
    }
}
