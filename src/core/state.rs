//! # Session UI State
//!
//! The few flags that govern whether the user may send right now.
//!
//! ```text
//!            enter_busy()                 release(ok)
//!   Idle ───────────────▶ Sending ───────────────────▶ SettledOk / SettledError
//!    ▲                                                        │
//!    └────────────────────── (next submit) ◀──────────────────┘
//! ```
//!
//! `input_busy` and `typing_indicator_visible` only move together, so the
//! indicator is shown exactly while a request is outstanding.

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Input,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Sending,
    SettledOk,
    SettledError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUiState {
    input_busy: bool,
    typing_indicator_visible: bool,
    focus: FocusTarget,
    phase: RequestPhase,
}

impl Default for SessionUiState {
    fn default() -> Self {
        Self {
            input_busy: false,
            typing_indicator_visible: false,
            focus: FocusTarget::Input,
            phase: RequestPhase::Idle,
        }
    }
}

impl SessionUiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_busy(&self) -> bool {
        self.input_busy
    }

    pub fn typing_indicator_visible(&self) -> bool {
        self.typing_indicator_visible
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    /// A request has been dispatched: block input and show the indicator.
    pub fn enter_busy(&mut self) {
        self.input_busy = true;
        self.typing_indicator_visible = true;
        self.focus = FocusTarget::None;
        self.phase = RequestPhase::Sending;
        debug!("UI busy");
    }

    /// The outstanding request has settled, successfully or not.
    pub fn release(&mut self, ok: bool) {
        self.input_busy = false;
        self.typing_indicator_visible = false;
        self.focus = FocusTarget::Input;
        self.phase = if ok {
            RequestPhase::SettledOk
        } else {
            RequestPhase::SettledError
        };
        debug!("UI released ({:?})", self.phase);
    }
}

/// Where the one-time startup sequence has got to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupPhase {
    Unknown,
    FetchingModelInfo,
    Ready { model: String },
    Degraded { reason: String },
}

impl StartupPhase {
    pub fn model(&self) -> Option<&str> {
        match self {
            StartupPhase::Ready { model } => Some(model),
            _ => None,
        }
    }
}
