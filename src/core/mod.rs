//! # Core Application Logic
//!
//! This module contains llamachat's conversation logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Controller (reducer) │
//!                    │  • Transcript           │
//!                    │  • Probe, Preferences   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │   Render   │      │  Backend   │
//!     │  Adapter   │      │  Pipeline  │      │  (reqwest) │
//!     │ (ratatui)  │      │ (HTML out) │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`controller`]: `Controller`, the single owner of conversation state
//! - [`action`]: `Action`/`Effect`, everything that can happen and what it triggers
//! - [`transcript`]: append-only message list
//! - [`probe`]: connection test and diagnostics
//! - [`preference`], [`storage`]: persisted theme

pub mod action;
pub mod config;
pub mod controller;
pub mod export;
pub mod message;
pub mod outcome;
pub mod preference;
pub mod probe;
pub mod state;
pub mod storage;
pub mod transcript;

pub use action::{Action, Effect};
pub use controller::Controller;
pub use message::{Message, RenderedAs, Role};
pub use transcript::{Transcript, TranscriptSink};
