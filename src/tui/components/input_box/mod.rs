//! # InputBox Component
//!
//! Multi-line message editor.
//!
//! ## Responsibilities
//!
//! - Capture text input, including newlines (Enter / Ctrl+J)
//! - Handle editing (backspace, delete, caret movement, paste)
//! - Emit a submission on Shift+Enter
//! - Grow with its content up to `max_lines`, then scroll internally
//! - Show a character count that turns to a warning past the backend limit
//!
//! ## State Management
//!
//! The buffer is internal state. `disabled` and `palette` are props set by
//! the event loop each frame; while disabled every keystroke is ignored.
//! Submitting does not clear the buffer: the event loop calls `clear()`
//! once the controller has accepted the text.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::backend::MAX_MESSAGE_CHARS;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

use cursor::Caret;
use text_wrap::{
    VERTICAL_OVERHEAD, inner_width, next_char_boundary, prev_char_boundary, wrap_options,
    wrapped_lines,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Shift+Enter with the current buffer
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    caret: Caret,
    max_lines: u16,
    /// Prop: true while a request is in flight
    pub disabled: bool,
    /// Prop: active theme colours
    pub palette: Palette,
}

impl InputBox {
    pub fn new(max_lines: u16, palette: Palette) -> Self {
        Self {
            buffer: String::new(),
            caret: Caret::new(),
            max_lines: max_lines.max(1),
            disabled: false,
            palette,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.caret.reset();
    }

    pub fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn over_limit(&self) -> bool {
        self.char_count() > MAX_MESSAGE_CHARS
    }

    /// Rows needed for the current content at `outer_width`, borders included.
    pub fn calculate_height(&self, outer_width: u16) -> u16 {
        let lines = wrapped_lines(&self.buffer, inner_width(outer_width));
        lines.min(self.max_lines) + VERTICAL_OVERHEAD
    }

    fn visible_text(&self, outer_width: u16) -> String {
        if self.caret.scroll == 0 {
            return self.buffer.clone();
        }
        let width = inner_width(outer_width);
        if width == 0 {
            return String::new();
        }
        let lines = textwrap::wrap(&self.buffer, wrap_options(width));
        let start = (self.caret.scroll as usize).min(lines.len());
        let end = (start + self.max_lines as usize).min(lines.len());
        lines[start..end].join("\n")
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let total = wrapped_lines(&self.buffer, inner_width(area.width));
        if total <= self.max_lines {
            return;
        }
        let mut state = ScrollbarState::default()
            .content_length(total.saturating_sub(self.max_lines) as usize)
            .position(self.caret.scroll as usize);
        let track = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }

    fn title(&self) -> Line<'static> {
        let hint = if self.disabled {
            " Waiting for reply… "
        } else {
            " Message (Shift+Enter to send) "
        };
        let counter_style = if self.over_limit() {
            Style::default()
                .fg(self.palette.warning)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.muted)
        };
        Line::from(vec![
            Span::raw(hint),
            Span::styled(
                format!("{}/{} ", self.char_count(), MAX_MESSAGE_CHARS),
                counter_style,
            ),
        ])
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.caret.last_width = area.width;
        self.caret.follow(&self.buffer, area.width, self.max_lines);

        let mut border = Style::default().fg(self.palette.accent);
        let mut text = Style::default().fg(self.palette.text);
        if self.disabled {
            border = Style::default()
                .fg(self.palette.muted)
                .add_modifier(Modifier::DIM);
            text = text.add_modifier(Modifier::DIM);
        }

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(self.title());

        let input = Paragraph::new(self.visible_text(area.width))
            .block(block)
            .style(text);
        frame.render_widget(input, area);
        self.render_scrollbar(frame, area);

        if !self.disabled {
            frame.set_cursor_position(self.caret.screen_pos(&self.buffer, area));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        let pos = self.caret.pos;
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(pos, *c);
                self.caret.pos += c.len_utf8();
            }
            TuiEvent::Paste(text) => {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.buffer.insert_str(pos, &text);
                self.caret.pos += text.len();
            }
            TuiEvent::Backspace if pos > 0 => {
                let prev = prev_char_boundary(&self.buffer, pos);
                self.buffer.drain(prev..pos);
                self.caret.pos = prev;
            }
            TuiEvent::Delete if pos < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, pos);
                self.buffer.drain(pos..next);
            }
            TuiEvent::CursorLeft if pos > 0 => {
                self.caret.pos = prev_char_boundary(&self.buffer, pos);
            }
            TuiEvent::CursorRight if pos < self.buffer.len() => {
                self.caret.pos = next_char_boundary(&self.buffer, pos);
            }
            TuiEvent::LineStart => {
                self.caret.pos = self.buffer[..pos].rfind('\n').map_or(0, |i| i + 1);
            }
            TuiEvent::LineEnd => {
                self.caret.pos = self.buffer[pos..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| pos + i);
            }
            TuiEvent::CursorUp => {
                if !self.caret.step_line(&self.buffer, -1) {
                    return None;
                }
            }
            TuiEvent::CursorDown => {
                if !self.caret.step_line(&self.buffer, 1) {
                    return None;
                }
            }
            TuiEvent::Submit => return Some(InputEvent::Submit(self.buffer.clone())),
            _ => return None,
        }
        Some(InputEvent::ContentChanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preference::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn input() -> InputBox {
        InputBox::new(5, Palette::for_theme(Theme::Light))
    }

    fn type_text(input: &mut InputBox, text: &str) {
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = input();
        type_text(&mut input, "ab");
        assert_eq!(input.text(), "ab");
        assert_eq!(
            input.handle_event(&TuiEvent::Backspace),
            Some(InputEvent::ContentChanged)
        );
        assert_eq!(input.text(), "a");
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
    }

    #[test]
    fn submit_keeps_buffer_until_cleared() {
        let mut input = input();
        type_text(&mut input, "hello\nworld");
        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("hello\nworld".to_string()))
        );
        assert_eq!(input.text(), "hello\nworld");
        input.clear();
        assert!(input.text().is_empty());
    }

    #[test]
    fn disabled_ignores_everything() {
        let mut input = input();
        type_text(&mut input, "x");
        input.disabled = true;
        assert_eq!(input.handle_event(&TuiEvent::InputChar('y')), None);
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.text(), "x");
    }

    #[test]
    fn paste_normalises_line_endings() {
        let mut input = input();
        input.handle_event(&TuiEvent::Paste("a\r\nb\rc".to_string()));
        assert_eq!(input.text(), "a\nb\nc");
    }

    #[test]
    fn height_grows_then_caps() {
        let mut input = InputBox::new(3, Palette::for_theme(Theme::Dark));
        assert_eq!(input.calculate_height(40), 3);
        type_text(&mut input, "1\n2");
        assert_eq!(input.calculate_height(40), 4);
        type_text(&mut input, "\n3\n4\n5\n6");
        assert_eq!(input.calculate_height(40), 5);
    }

    #[test]
    fn line_start_and_end() {
        let mut input = input();
        type_text(&mut input, "ab\ncd");
        input.handle_event(&TuiEvent::LineStart);
        input.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(input.text(), "ab\n>cd");
        input.handle_event(&TuiEvent::CursorUp);
        input.handle_event(&TuiEvent::LineEnd);
        input.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(input.text(), "ab!\n>cd");
    }

    #[test]
    fn vertical_moves_through_multibyte_text() {
        let mut input = input();
        input.handle_event(&TuiEvent::Paste("é\naé".to_string()));
        input.handle_event(&TuiEvent::CursorUp);
        input.handle_event(&TuiEvent::LineEnd);
        input.handle_event(&TuiEvent::CursorDown);
        input.handle_event(&TuiEvent::InputChar('x'));
        assert_eq!(input.text(), "é\naxé");

        let mut terminal = Terminal::new(TestBackend::new(30, 5)).unwrap();
        terminal.draw(|f| input.render(f, f.area())).unwrap();
    }

    #[test]
    fn counter_warns_past_limit() {
        let mut input = input();
        input.handle_event(&TuiEvent::Paste("x".repeat(MAX_MESSAGE_CHARS)));
        assert!(!input.over_limit());
        input.handle_event(&TuiEvent::InputChar('x'));
        assert!(input.over_limit());
    }

    #[test]
    fn render_shows_hint_and_counter() {
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        let mut input = input();
        type_text(&mut input, "hey");
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Shift+Enter"));
        assert!(text.contains("3/4000"));
    }
}
