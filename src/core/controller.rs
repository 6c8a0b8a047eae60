//! # Conversation Controller
//!
//! Turns submissions into chat requests, tracks the one request that may be
//! in flight, and routes every settlement into the transcript.
//!
//! ```text
//! Controller
//! ├── backend: Arc<dyn ChatBackend>   // chat endpoint
//! ├── probe: ConnectionProbe          // connection-test endpoint
//! ├── renderer: RenderPipeline        // message text → HTML
//! ├── transcript: S: TranscriptSink   // where messages go
//! ├── preferences: PreferenceStore    // theme
//! ├── ui: SessionUiState              // busy flag, indicator, focus
//! ├── startup: StartupPhase           // probe → model info → ready/degraded
//! ├── connection: ConnectionStatus    // latest probe result
//! └── diagnostics: Option<Diagnostics>
//! ```
//!
//! Collaborators are handed in by the caller. State only changes through
//! `update()`, which never performs I/O; the returned `Effect` says what to
//! start next. `send()` and `start()` drive the same transitions with
//! sequential async code, for callers that don't run an event loop.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::{ChatBackend, MODEL_INFO_SENTINEL};
use crate::core::action::{Action, Effect};
use crate::core::message::{Message, Role};
use crate::core::outcome::{ChatOutcome, classify_chat, classify_model_info};
use crate::core::preference::{PreferenceStore, Theme, ThemeSurface, ToggleEvent};
use crate::core::probe::{ConnectionProbe, ConnectionStatus, Diagnostics, defang, unreachable_diagnostic};
use crate::core::state::{RequestPhase, SessionUiState, StartupPhase};
use crate::core::transcript::TranscriptSink;
use crate::render::RenderPipeline;

pub const EMPTY_RESPONSE_DIAGNOSTIC: &str = "Error: The server returned an empty response.";

pub struct Controller<S: TranscriptSink> {
    backend: Arc<dyn ChatBackend>,
    probe: ConnectionProbe,
    renderer: RenderPipeline,
    transcript: S,
    preferences: PreferenceStore,
    ui: SessionUiState,
    startup: StartupPhase,
    connection: ConnectionStatus,
    diagnostics: Option<Diagnostics>,
}

impl<S: TranscriptSink> Controller<S> {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        probe: ConnectionProbe,
        renderer: RenderPipeline,
        transcript: S,
        preferences: PreferenceStore,
    ) -> Self {
        Self {
            backend,
            probe,
            renderer,
            transcript,
            preferences,
            ui: SessionUiState::new(),
            startup: StartupPhase::Unknown,
            connection: ConnectionStatus::default(),
            diagnostics: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn transcript(&self) -> &S {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut S {
        &mut self.transcript
    }

    pub fn ui(&self) -> &SessionUiState {
        &self.ui
    }

    pub fn startup(&self) -> &StartupPhase {
        &self.startup
    }

    pub fn connection_status(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    pub fn probe(&self) -> ConnectionProbe {
        self.probe.clone()
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme()
    }

    /// One-line summary for the status bar.
    pub fn status_line(&self) -> String {
        match &self.startup {
            StartupPhase::Unknown => "Connecting…".to_string(),
            StartupPhase::FetchingModelInfo => "Connected, fetching model info…".to_string(),
            StartupPhase::Ready { model } if self.connection.is_ok() => format!("Model: {model}"),
            StartupPhase::Ready { model } => format!("Model: {model} (connection lost)"),
            StartupPhase::Degraded { reason } => format!("Disconnected: {reason}"),
        }
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    /// Load the stored theme and push it to `surface`.
    pub fn init_theme(&mut self, surface: &mut dyn ThemeSurface) -> Theme {
        let theme = self.preferences.load();
        self.preferences.apply(theme, surface);
        theme
    }

    /// Flip between light and dark, as a click on the toggle would.
    pub fn toggle_theme(&mut self, surface: &mut dyn ThemeSurface) -> Theme {
        let event = ToggleEvent {
            checked: !self.preferences.theme().is_dark(),
        };
        self.preferences.toggle(event, surface)
    }

    // ------------------------------------------------------------------
    // Reducer
    // ------------------------------------------------------------------

    pub fn update(&mut self, action: Action) -> Effect {
        match action {
            Action::Submit(raw) => self.on_submit(&raw),
            Action::ChatSettled(result) => {
                self.on_settled(classify_chat(result));
                Effect::None
            }
            Action::ProbeFinished(status) => self.on_probe_finished(status),
            Action::ModelInfoSettled(result) => {
                self.on_model_info(classify_model_info(result));
                Effect::None
            }
            Action::DiagnosticsReady(diagnostics) => {
                debug!("Diagnostics refreshed: {:?}", diagnostics.status.state);
                self.connection = diagnostics.status.clone();
                self.diagnostics = Some(diagnostics);
                Effect::None
            }
            Action::Quit => Effect::Quit,
        }
    }

    fn on_submit(&mut self, raw: &str) -> Effect {
        let text = raw.trim();
        if text.is_empty() {
            return Effect::None;
        }
        if self.ui.input_busy() {
            warn!("Submission rejected: a request is already in flight");
            return Effect::None;
        }

        let rendered = self.renderer.render(Role::User, text);
        self.transcript.append(Message::new(Role::User, text, rendered));
        self.ui.enter_busy();
        info!("Submitting message ({} chars)", text.chars().count());
        Effect::DispatchChat(text.to_string())
    }

    fn on_settled(&mut self, outcome: ChatOutcome) {
        if self.ui.phase() != RequestPhase::Sending {
            warn!("Chat settled with no request in flight");
        }
        self.ui.release(outcome.is_reply());

        match outcome {
            ChatOutcome::Reply(text) => {
                let rendered = self.renderer.render(Role::Assistant, &text);
                self.transcript
                    .append(Message::new(Role::Assistant, text, rendered));
            }
            ChatOutcome::ApplicationError(error) => {
                info!("Backend reported an error: {}", error);
                self.notify(format!("Error: {}", defang(&error)));
            }
            ChatOutcome::EmptyResponse => {
                warn!("Backend returned an empty response");
                self.notify(EMPTY_RESPONSE_DIAGNOSTIC.to_string());
            }
            ChatOutcome::Transport(detail) => {
                self.notify(format!(
                    "Error: {}. Please make sure the backend server is running and reachable.",
                    defang(detail.trim_end_matches('.'))
                ));
            }
        }
    }

    fn on_probe_finished(&mut self, status: ConnectionStatus) -> Effect {
        self.connection = status.clone();
        if self.startup != StartupPhase::Unknown {
            return Effect::None;
        }

        if status.is_ok() {
            self.startup = StartupPhase::FetchingModelInfo;
            Effect::RequestModelInfo
        } else {
            let detail = status
                .detail
                .unwrap_or_else(|| "unknown error".to_string());
            warn!("Backend unreachable at startup: {}", detail);
            let notice = unreachable_diagnostic(&detail, self.probe.base_url());
            self.startup = StartupPhase::Degraded { reason: detail };
            self.notify(notice);
            Effect::None
        }
    }

    fn on_model_info(&mut self, result: Result<String, String>) {
        match result {
            Ok(model) => {
                info!("Backend model: {}", model);
                self.startup = StartupPhase::Ready { model };
            }
            Err(reason) => {
                warn!("Model info unavailable: {}", reason);
                self.notify(format!(
                    "Error: Could not get model information: {}",
                    defang(&reason)
                ));
                self.startup = StartupPhase::Degraded { reason };
            }
        }
    }

    /// Append a system message.
    pub fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        let rendered = self.renderer.render(Role::System, &text);
        self.transcript.append(Message::new(Role::System, text, rendered));
    }

    // ------------------------------------------------------------------
    // Sequential drivers
    // ------------------------------------------------------------------

    /// Submit and wait for settlement. Returns whether a request was sent.
    pub async fn send(&mut self, raw: &str) -> bool {
        let Effect::DispatchChat(text) = self.update(Action::Submit(raw.to_string())) else {
            return false;
        };
        let backend = self.backend();
        let result = backend.chat(&text).await;
        self.update(Action::ChatSettled(result));
        true
    }

    /// Startup sequence: probe, then model info if the probe succeeded.
    pub async fn start(&mut self) {
        let status = self.probe.probe().await;
        if self.update(Action::ProbeFinished(status)) == Effect::RequestModelInfo {
            let backend = self.backend();
            let result = backend.chat(MODEL_INFO_SENTINEL).await;
            self.update(Action::ModelInfoSettled(result));
        }
    }

    /// Re-run the probe plus health check for the diagnostics view.
    pub async fn refresh_diagnostics(&mut self) {
        let diagnostics = self.probe.inspect().await;
        self.update(Action::DiagnosticsReady(diagnostics));
    }
}
