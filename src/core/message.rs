//! Transcript entries. A message is built once, with its rendering already
//! decided, and never changes afterwards.

use chrono::{DateTime, Local};

use crate::render::Rendered;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Status and diagnostic notices produced by the client itself.
    System,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedAs {
    /// `body` is escaped text; whitespace is significant.
    Plain,
    /// `body` is HTML.
    RichMarkup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
    rendered_as: RenderedAs,
    body: String,
    created_at: DateTime<Local>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, rendered: Rendered) -> Self {
        Self {
            role,
            content: content.into(),
            rendered_as: rendered.rendered_as,
            body: rendered.body,
            created_at: Local::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The text as typed by the user or returned by the backend.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn rendered_as(&self) -> RenderedAs {
        self.rendered_as
    }

    /// Display-ready HTML (escaped text when plain).
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_keeps_raw_content_and_body_apart() {
        let message = Message::new(Role::User, "a < b", Rendered::plain("a < b"));
        assert_eq!(message.role(), Role::User);
        assert_eq!(message.content(), "a < b");
        assert_eq!(message.body(), "a &lt; b");
        assert_eq!(message.rendered_as(), RenderedAs::Plain);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Assistant.label(), "assistant");
        assert_eq!(Role::System.label(), "system");
    }
}
