//! # Diagnostics Overlay
//!
//! Popup opened with Ctrl+D: the server's connection-test report and health
//! check, refreshed each time the overlay opens. Esc or Ctrl+D closes it.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::backend::ReportStatus;
use crate::core::probe::{Diagnostics, ProbeState};
use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub struct DiagnosticsPanel<'a> {
    /// `None` while the check is still running
    pub diagnostics: Option<&'a Diagnostics>,
    pub base_url: &'a str,
    pub palette: Palette,
}

impl<'a> DiagnosticsPanel<'a> {
    pub fn new(diagnostics: Option<&'a Diagnostics>, base_url: &'a str, palette: Palette) -> Self {
        Self {
            diagnostics,
            base_url,
            palette,
        }
    }

    fn field(&self, label: &str, value: impl Into<String>) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{label:<18}"),
                Style::default().fg(self.palette.muted),
            ),
            Span::styled(value.into(), Style::default().fg(self.palette.text)),
        ])
    }

    fn heading(&self, text: &str) -> Line<'static> {
        Line::from(Span::styled(
            text.to_string(),
            Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![self.field("Backend", self.base_url.to_string())];
        let Some(diag) = self.diagnostics else {
            lines.push(Line::default());
            lines.push(self.field("Status", "Checking…"));
            return lines;
        };

        let (state, color) = match diag.status.state {
            ProbeState::Ok => ("connected", self.palette.user),
            ProbeState::Error => ("error", self.palette.warning),
            ProbeState::Unknown => ("unknown", self.palette.muted),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<18}", "Connection"), Style::default().fg(self.palette.muted)),
            Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]));
        if let Some(detail) = &diag.status.detail {
            lines.push(self.field("Detail", detail.clone()));
        }

        if let Some(report) = &diag.report {
            if let Some(endpoint) = &report.working_endpoint {
                lines.push(self.field("Working endpoint", endpoint.clone()));
            }
            if let Some(model) = &report.model {
                lines.push(self.field("Model", model.clone()));
            }
            if let Some(suggestion) = &report.suggestion {
                lines.push(self.field("Suggestion", suggestion.clone()));
            }
            if let Some(time) = &report.time {
                lines.push(self.field("Server time", time.clone()));
            }
            if !report.endpoint_results.is_empty() {
                lines.push(Line::default());
                lines.push(self.heading("Endpoints"));
                for (endpoint, result) in &report.endpoint_results {
                    let code = result
                        .status_code
                        .map(|c| format!(" (HTTP {c})"))
                        .unwrap_or_default();
                    let message = result.error.as_deref().unwrap_or(&result.message);
                    lines.push(self.field(
                        endpoint,
                        format!("{}{code} {message}", status_label(result.status)),
                    ));
                }
            }
        }

        lines.push(Line::default());
        lines.push(self.heading("Health"));
        match &diag.health {
            Ok(health) => {
                lines.push(self.field("Server", health.status.clone()));
                if let Some(api) = &health.llm_api {
                    lines.push(self.field("LLM API", api.clone()));
                }
                if let Some(ts) = &health.timestamp {
                    lines.push(self.field("Timestamp", ts.clone()));
                }
            }
            Err(e) => lines.push(self.field("Server", format!("unavailable: {e}"))),
        }

        lines.push(Line::default());
        lines.push(self.field(
            "Checked at",
            diag.checked_at.format("%H:%M:%S").to_string(),
        ));
        lines
    }
}

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Ok => "ok",
        ReportStatus::Error => "error",
        ReportStatus::Unknown => "?",
    }
}

/// Centered popup area, at most `width` x `height`.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    popup
}

impl<'a> Component for DiagnosticsPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let popup = popup_area(area, 72, lines.len() as u16 + 4);

        let block = Block::bordered()
            .title(" Connection diagnostics (Esc to close) ")
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.palette.accent))
            .padding(Padding::new(1, 1, 1, 0))
            .style(Style::default().bg(self.palette.background));

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}
