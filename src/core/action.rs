//! # Actions
//!
//! Everything that can happen to a conversation becomes an `Action`.
//! User presses Shift+Enter? That's `Action::Submit(text)`.
//! The chat request settles? That's `Action::ChatSettled(result)`.
//!
//! `Controller::update()` applies an action and returns an `Effect`: the
//! I/O the caller must start next. No I/O happens inside `update()`.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use crate::backend::{BackendError, RawReply};
use crate::core::probe::{ConnectionStatus, Diagnostics};

#[derive(Debug)]
pub enum Action {
    /// Raw contents of the input box.
    Submit(String),
    /// The one outstanding chat request finished.
    ChatSettled(Result<RawReply, BackendError>),
    /// A connection probe finished (startup or ad hoc).
    ProbeFinished(ConnectionStatus),
    /// The `!modelinfo` request finished.
    ModelInfoSettled(Result<RawReply, BackendError>),
    /// The diagnostics view's probe and health check finished.
    DiagnosticsReady(Diagnostics),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Send this (trimmed) text to the chat endpoint.
    DispatchChat(String),
    /// Send the model-info sentinel to the chat endpoint.
    RequestModelInfo,
    Quit,
}
