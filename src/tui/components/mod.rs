//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as props:
//! - `TitleBar`: app name, connection/model status, theme toggle
//! - `Message`: one transcript entry
//! - `DiagnosticsPanel`: Ctrl+D connection report overlay
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `InputBox`: multi-line editor with character counter
//! - `MessageList`: scrollable transcript with layout caching
//!
//! Components receive external data as props (struct fields), never by
//! reaching into the controller:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(controller.status_line(), connected, dark, palette);
//! title_bar.render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (top status bar)
//! ├── message.rs       (single message renderer)
//! ├── message_list.rs  (scrollable message container)
//! ├── diagnostics.rs   (connection diagnostics overlay)
//! └── input_box/       (text input with caret and wrapping)
//! ```

pub mod diagnostics;
pub mod input_box;
pub mod message;
pub mod message_list;
mod title_bar;

pub use diagnostics::DiagnosticsPanel;
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use title_bar::TitleBar;
