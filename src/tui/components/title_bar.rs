//! # TitleBar Component
//!
//! Top status bar: application name, connection/model status and the theme
//! toggle.
//!
//! ## Design Decisions
//!
//! ### Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(controller.status_line(), true, false, palette);
//! title_bar.render(frame, area);
//! ```
//!
//! ### Layout
//!
//! Status on the left, toggle indicator on the right. On narrow terminals the
//! status is truncated first so the toggle stays visible.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::theme::Palette;

const APP_NAME: &str = "llamachat";

pub struct TitleBar {
    /// Controller status line ("Model: …", "Disconnected: …")
    pub status: String,
    /// Whether the connection probe last succeeded
    pub connected: bool,
    /// Theme toggle's checked state (dark)
    pub dark_checked: bool,
    pub palette: Palette,
}

impl TitleBar {
    pub fn new(status: String, connected: bool, dark_checked: bool, palette: Palette) -> Self {
        Self {
            status,
            connected,
            dark_checked,
            palette,
        }
    }

    fn toggle_label(&self) -> String {
        let mark = if self.dark_checked { "x" } else { " " };
        format!("[{mark}] Dark (Ctrl+T) ")
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let toggle = self.toggle_label();
        let [left, right] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(toggle.chars().count() as u16),
        ])
        .areas(area);

        let dot = if self.connected { "●" } else { "○" };
        let dot_color = if self.connected {
            self.palette.user
        } else {
            self.palette.warning
        };
        let status = Line::from(vec![
            Span::styled(
                format!(" {APP_NAME} "),
                Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{dot} "), Style::default().fg(dot_color)),
            Span::styled(self.status.clone(), Style::default().fg(self.palette.text)),
        ]);

        frame.render_widget(Paragraph::new(status), left);
        frame.render_widget(
            Paragraph::new(toggle).style(Style::default().fg(self.palette.muted)),
            right,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preference::Theme;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(title_bar: &mut TitleBar, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 1)).unwrap();
        terminal
            .draw(|f| title_bar.render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_shows_status_and_toggle() {
        let mut title_bar = TitleBar::new(
            "Model: llama3".to_string(),
            true,
            false,
            Palette::for_theme(Theme::Light),
        );
        let text = draw(&mut title_bar, 80);
        assert!(text.contains("llamachat"));
        assert!(text.contains("Model: llama3"));
        assert!(text.contains("[ ] Dark"));
    }

    #[test]
    fn test_title_bar_checked_toggle() {
        let mut title_bar = TitleBar::new(
            "Disconnected: refused".to_string(),
            false,
            true,
            Palette::for_theme(Theme::Dark),
        );
        let text = draw(&mut title_bar, 80);
        assert!(text.contains("Disconnected: refused"));
        assert!(text.contains("[x] Dark"));
    }

    #[test]
    fn test_toggle_survives_narrow_terminal() {
        let mut title_bar = TitleBar::new(
            "Model: a-model-with-a-very-long-name-indeed".to_string(),
            true,
            false,
            Palette::for_theme(Theme::Light),
        );
        let text = draw(&mut title_bar, 30);
        assert!(text.contains("Dark (Ctrl+T)"));
    }
}
