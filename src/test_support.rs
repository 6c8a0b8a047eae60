//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::backend::{BackendError, ChatBackend, RawReply};
use crate::core::controller::Controller;
use crate::core::preference::{PreferenceStore, Theme, ThemeSurface};
use crate::core::probe::ConnectionProbe;
use crate::core::transcript::Transcript;
use crate::render::RenderPipeline;

type Scripted = Mutex<VecDeque<Result<RawReply, BackendError>>>;

/// A backend that replays queued replies and records chat payloads.
/// An exhausted queue answers with a network error.
#[derive(Default)]
pub struct ScriptedBackend {
    chat: Scripted,
    connection_test: Scripted,
    health: Scripted,
    chat_calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, reply: Result<RawReply, BackendError>) -> Self {
        self.chat.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_connection_test(self, reply: Result<RawReply, BackendError>) -> Self {
        self.connection_test.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_health(self, reply: Result<RawReply, BackendError>) -> Self {
        self.health.lock().unwrap().push_back(reply);
        self
    }

    pub fn chat_calls(&self) -> Vec<String> {
        self.chat_calls.lock().unwrap().clone()
    }

    fn next(queue: &Scripted) -> Result<RawReply, BackendError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Network("no scripted reply".to_string())))
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn base_url(&self) -> &str {
        "http://scripted.test"
    }

    async fn chat(&self, message: &str) -> Result<RawReply, BackendError> {
        self.chat_calls.lock().unwrap().push(message.to_string());
        Self::next(&self.chat)
    }

    async fn connection_test(&self) -> Result<RawReply, BackendError> {
        Self::next(&self.connection_test)
    }

    async fn health(&self) -> Result<RawReply, BackendError> {
        Self::next(&self.health)
    }
}

/// Records the last values pushed to it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub theme: Option<Theme>,
    pub checked: Option<bool>,
}

impl ThemeSurface for RecordingSurface {
    fn set_theme_attribute(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }

    fn set_toggle_checked(&mut self, checked: bool) {
        self.checked = Some(checked);
    }
}

/// A controller over `backend` with the standard renderer and in-memory
/// preferences. The backend handle is returned for call inspection.
pub fn test_controller(
    backend: ScriptedBackend,
) -> (Controller<Transcript>, Arc<ScriptedBackend>) {
    let backend = Arc::new(backend);
    let controller = Controller::new(
        backend.clone(),
        ConnectionProbe::new(backend.clone()),
        RenderPipeline::standard(),
        Transcript::new(),
        PreferenceStore::in_memory(),
    );
    (controller, backend)
}
