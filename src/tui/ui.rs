use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::core::{Controller, Transcript};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{DiagnosticsPanel, MessageList, TitleBar};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw_ui(
    frame: &mut Frame,
    controller: &Controller<Transcript>,
    tui: &mut TuiState,
    spinner_frame: usize,
) {
    use Constraint::{Length, Min};

    let palette = tui.theme.palette;
    frame.render_widget(
        Block::new().style(Style::default().bg(palette.background).fg(palette.text)),
        frame.area(),
    );

    let typing = controller.ui().typing_indicator_visible();
    tui.input_box.disabled = controller.ui().input_busy();
    tui.input_box.palette = palette;
    let input_height = tui.input_box.calculate_height(frame.area().width);

    let layout = Layout::vertical([
        Length(1),
        Min(0),
        Length(u16::from(typing)),
        Length(input_height),
    ]);
    let [title_area, main_area, typing_area, input_area] = layout.areas(frame.area());

    let mut title_bar = TitleBar::new(
        controller.status_line(),
        controller.connection_status().is_ok(),
        tui.theme.toggle_checked,
        palette,
    );
    title_bar.render(frame, title_area);

    let mut message_list = MessageList::new(
        &mut tui.message_list,
        controller.transcript().messages(),
        &palette,
        tui.highlight_code,
    );
    message_list.render(frame, main_area);

    if typing {
        draw_typing_indicator(frame, typing_area, tui, spinner_frame);
    }

    tui.input_box.render(frame, input_area);

    if tui.show_diagnostics {
        let diagnostics = if tui.diagnostics_pending {
            None
        } else {
            controller.diagnostics()
        };
        let area = frame.area();
        let mut panel = DiagnosticsPanel::new(diagnostics, &tui.base_url, palette);
        panel.render(frame, area);
    }
}

fn draw_typing_indicator(frame: &mut Frame, area: Rect, tui: &TuiState, spinner_frame: usize) {
    let palette = tui.theme.palette;
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", SPINNER[spinner_frame % SPINNER.len()]),
            Style::default().fg(palette.assistant),
        ),
        Span::styled(
            "assistant is typing…",
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
