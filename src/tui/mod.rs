//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core `Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! One thread owns the `Controller`. Background tasks (chat request, model
//! info, probes) run on tokio and post their results back as `Action`s over
//! a std `mpsc` channel, so every state change happens on the loop thread:
//!
//! ```text
//! key ──► TuiEvent ──► InputBox ──► Action::Submit ──► update() ──► Effect
//!                                                                  │
//!          tokio::spawn(chat) ◄─────────────────────────────────────┘
//!                 │
//!                 └──► tx.send(Action::ChatSettled) ──► update() ──► transcript
//! ```
//!
//! ## Redraw Strategy
//!
//! Draws every ~80ms while a request is in flight (typing indicator spinner),
//! otherwise sleeps up to 500ms and only redraws on events.

mod component;
mod components;
mod event;
pub mod markdown;
pub mod theme;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::backend::{ChatBackend, HttpBackend, MODEL_INFO_SENTINEL};
use crate::core::config::ResolvedConfig;
use crate::core::export::write_export;
use crate::core::preference::PreferenceStore;
use crate::core::probe::ConnectionProbe;
use crate::core::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::core::{Action, Controller, Effect, Transcript};
use crate::render::RenderPipeline;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::theme::ThemeState;

/// TUI-specific presentation state (not part of the conversation state)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub theme: ThemeState,
    pub show_diagnostics: bool,
    /// True from Ctrl+D until the fresh report arrives
    pub diagnostics_pending: bool,
    pub highlight_code: bool,
    pub base_url: String,
}

impl TuiState {
    pub fn new(config: &ResolvedConfig) -> Self {
        let theme = ThemeState::default();
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(config.input_max_lines, theme.palette),
            theme,
            show_diagnostics: false,
            diagnostics_pending: false,
            highlight_code: config.highlight_code,
            base_url: config.base_url.clone(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter be told apart from Enter.
        // Terminals without it ignore the escape sequence.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Wire the controller's collaborators from a resolved config.
pub fn build_controller(config: &ResolvedConfig) -> Controller<Transcript> {
    let backend: Arc<dyn ChatBackend> =
        Arc::new(HttpBackend::new(&config.base_url, config.probe_timeout));
    let probe = ConnectionProbe::new(Arc::clone(&backend));
    let renderer = RenderPipeline::from_flags(config.render_markdown, config.highlight_code);

    let storage: Box<dyn KeyValueStore> = match FileStore::default_location() {
        Ok(store) => {
            info!("Preferences stored at {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            warn!("Preferences will not persist: {}", e);
            Box::new(MemoryStore::new())
        }
    };

    Controller::new(
        backend,
        probe,
        renderer,
        Transcript::new(),
        PreferenceStore::new(storage),
    )
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut controller = build_controller(&config);
    let mut tui = TuiState::new(&config);
    controller.init_theme(&mut tui.theme);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    spawn_probe(controller.probe(), tx.clone());

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        let busy = controller.ui().input_busy();
        if busy {
            needs_redraw = true;
        }

        if controller.transcript_mut().take_scroll_request() {
            tui.message_list.pin_to_bottom();
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &controller, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if busy {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => {}
                TuiEvent::ForceQuit => {
                    should_quit = controller.update(Action::Quit) == Effect::Quit;
                }
                TuiEvent::ToggleTheme => {
                    let theme = controller.toggle_theme(&mut tui.theme);
                    tui.input_box.palette = tui.theme.palette;
                    debug!("Theme toggled to {}", theme.as_str());
                }
                TuiEvent::ToggleDiagnostics if tui.show_diagnostics => {
                    tui.show_diagnostics = false;
                }
                TuiEvent::ToggleDiagnostics => {
                    tui.show_diagnostics = true;
                    tui.diagnostics_pending = true;
                    spawn_inspect(controller.probe(), tx.clone());
                }
                TuiEvent::Escape => tui.show_diagnostics = false,
                TuiEvent::ExportTranscript => export(&mut controller),
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown
                | TuiEvent::ScrollToBottom => {
                    tui.message_list.handle_event(&event);
                }
                _ if tui.show_diagnostics => {}
                _ => {
                    if let Some(message) = route_to_input(&mut tui, &mut controller, &event) {
                        spawn_chat(controller.backend(), message, tx.clone());
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Settle background work
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if matches!(action, Action::DiagnosticsReady(_)) {
                tui.diagnostics_pending = false;
            }
            match controller.update(action) {
                Effect::RequestModelInfo => spawn_model_info(controller.backend(), tx.clone()),
                Effect::DispatchChat(message) => {
                    spawn_chat(controller.backend(), message, tx.clone())
                }
                Effect::Quit | Effect::None => {}
            }
        }
    }

    ratatui::restore();
    Ok(())
}

/// Feed an editing key to the input box. Returns the message to send when
/// the controller accepts a submission; the box is then cleared and locked
/// at once so the rest of the event batch cannot type into it.
fn route_to_input(
    tui: &mut TuiState,
    controller: &mut Controller<Transcript>,
    event: &TuiEvent,
) -> Option<String> {
    let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(event) else {
        return None;
    };
    let Effect::DispatchChat(message) = controller.update(Action::Submit(text)) else {
        return None;
    };
    tui.input_box.clear();
    tui.input_box.disabled = true;
    Some(message)
}

fn export(controller: &mut Controller<Transcript>) {
    if controller.transcript().is_empty() {
        controller.notify("Nothing to export yet.");
        return;
    }
    let dir = std::env::current_dir().unwrap_or_else(|_| ".".into());
    match write_export(&dir, controller.transcript().messages(), controller.theme()) {
        Ok(path) => {
            info!("Transcript exported to {}", path.display());
            controller.notify(format!("Transcript exported to {}", path.display()));
        }
        Err(e) => {
            warn!("Transcript export failed: {}", e);
            controller.notify(format!("Error: Could not export transcript: {e}"));
        }
    }
}

fn post(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to post action: receiver dropped");
    }
}

fn spawn_chat(backend: Arc<dyn ChatBackend>, message: String, tx: mpsc::Sender<Action>) {
    info!("Spawning chat request ({} chars)", message.chars().count());
    tokio::spawn(async move {
        let result = backend.chat(&message).await;
        post(&tx, Action::ChatSettled(result));
    });
}

fn spawn_model_info(backend: Arc<dyn ChatBackend>, tx: mpsc::Sender<Action>) {
    info!("Requesting model info");
    tokio::spawn(async move {
        let result = backend.chat(MODEL_INFO_SENTINEL).await;
        post(&tx, Action::ModelInfoSettled(result));
    });
}

fn spawn_probe(probe: ConnectionProbe, tx: mpsc::Sender<Action>) {
    info!("Probing backend at {}", probe.base_url());
    tokio::spawn(async move {
        let status = probe.probe().await;
        post(&tx, Action::ProbeFinished(status));
    });
}

fn spawn_inspect(probe: ConnectionProbe, tx: mpsc::Sender<Action>) {
    tokio::spawn(async move {
        let diagnostics = probe.inspect().await;
        post(&tx, Action::DiagnosticsReady(diagnostics));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CliOverrides, EnvOverrides, LlamaChatConfig, resolve};
    use crate::test_support::{ScriptedBackend, test_controller};

    fn tui_state() -> TuiState {
        let config = resolve(
            &LlamaChatConfig::default(),
            &EnvOverrides::default(),
            &CliOverrides::default(),
        );
        TuiState::new(&config)
    }

    #[test]
    fn test_accepted_submit_locks_input_for_rest_of_batch() {
        let (mut controller, _backend) = test_controller(ScriptedBackend::new());
        let mut tui = tui_state();

        for c in "hi".chars() {
            route_to_input(&mut tui, &mut controller, &TuiEvent::InputChar(c));
        }
        let sent = route_to_input(&mut tui, &mut controller, &TuiEvent::Submit);
        assert_eq!(sent.as_deref(), Some("hi"));
        assert!(tui.input_box.text().is_empty());
        assert!(tui.input_box.disabled);

        // Keys already queued behind the submit
        assert_eq!(
            route_to_input(&mut tui, &mut controller, &TuiEvent::InputChar('x')),
            None
        );
        assert!(tui.input_box.text().is_empty());
    }

    #[test]
    fn test_blank_submit_keeps_input_open() {
        let (mut controller, _backend) = test_controller(ScriptedBackend::new());
        let mut tui = tui_state();
        route_to_input(&mut tui, &mut controller, &TuiEvent::InputChar(' '));
        assert_eq!(route_to_input(&mut tui, &mut controller, &TuiEvent::Submit), None);
        assert!(!tui.input_box.disabled);
        assert_eq!(tui.input_box.text(), " ");
    }
}
