//! # Backend Client
//!
//! The HTTP side of the chat contract. The controller never talks to
//! reqwest directly; it only sees the [`ChatBackend`] trait and the raw
//! replies it produces. Classifying those replies is core logic and lives
//! in `core::outcome`.

pub mod client;
pub mod types;

pub use client::{BackendError, ChatBackend, HttpBackend};
pub use types::{
    ChatRequest, ConnectionTestReport, EndpointResult, HealthReport, RawReply,
    ReportStatus,
};

/// Reserved chat payload asking the backend for the configured model name.
pub const MODEL_INFO_SENTINEL: &str = "!modelinfo";

/// Path of the chat endpoint, relative to the backend base URL.
pub const CHAT_PATH: &str = "/api/chat";
/// Path of the connection-test (diagnostics) endpoint.
pub const CONNECTION_TEST_PATH: &str = "/api/connection-test";
/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Longest message the backend accepts; longer ones come back as an `error`.
pub const MAX_MESSAGE_CHARS: usize = 4000;
