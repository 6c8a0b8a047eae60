//! # Transcript Store
//!
//! Ordered, append-only list of messages. Every append also asks whatever
//! is displaying the transcript to bring the newest entry into view.

use log::debug;

use crate::core::message::Message;

/// Where the controller puts finished messages.
pub trait TranscriptSink {
    fn append(&mut self, message: Message);

    /// Request that the newest entry be brought into view.
    fn scroll_to_latest(&mut self);
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    scroll_pending: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns `true` once per scroll request, then clears it.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

impl TranscriptSink for Transcript {
    fn append(&mut self, message: Message) {
        debug!(
            "Transcript append #{}: {} ({} chars)",
            self.messages.len(),
            message.role().label(),
            message.content().chars().count()
        );
        self.messages.push(message);
        self.scroll_to_latest();
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use crate::render::Rendered;

    fn plain(role: Role, text: &str) -> Message {
        Message::new(role, text, Rendered::plain(text))
    }

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(plain(Role::User, "one"));
        transcript.append(plain(Role::Assistant, "two"));
        transcript.append(plain(Role::System, "three"));

        let contents: Vec<&str> = transcript.messages().iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(transcript.last().map(|m| m.role()), Some(Role::System));
    }

    #[test]
    fn test_append_requests_scroll_once() {
        let mut transcript = Transcript::new();
        assert!(!transcript.take_scroll_request());
        transcript.append(plain(Role::User, "hi"));
        assert!(transcript.take_scroll_request());
        assert!(!transcript.take_scroll_request());
    }
}
