use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::{Message as ChatMessage, RenderedAs, Role};
use crate::tui::component::Component;
use crate::tui::markdown;
use crate::tui::theme::Palette;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A stateless component that renders one transcript entry.
///
/// # Content
///
/// What gets drawn depends on how the message was rendered when it entered
/// the transcript:
/// - **Assistant, rich**: the raw markdown is drawn through [`markdown::render`]
/// - **System, rich**: tags are stripped, links become `text (url)`
/// - **Plain**: the original text, whitespace preserved
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) wraps the same `Text` the
/// render pass draws, so the parent `MessageList` can lay out its canvas
/// before anything is rendered.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
    pub palette: &'a Palette,
    /// Syntax-highlight fenced code in assistant replies
    pub highlight_code: bool,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage, palette: &'a Palette, highlight_code: bool) -> Self {
        Self {
            message,
            palette,
            highlight_code,
        }
    }

    fn role_style(&self) -> Style {
        let color = match self.message.role() {
            Role::User => self.palette.user,
            Role::Assistant => self.palette.assistant,
            Role::System => self.palette.system,
        };
        Style::default().fg(color)
    }

    fn text(&self) -> Text<'static> {
        match (self.message.role(), self.message.rendered_as()) {
            (Role::Assistant, RenderedAs::RichMarkup) => {
                markdown::render(self.message.content(), self.palette, self.highlight_code)
            }
            (_, RenderedAs::RichMarkup) => Text::raw(strip_markup(self.message.body())),
            (_, RenderedAs::Plain) => Text::raw(self.message.content().to_string()),
        }
    }

    fn paragraph(&self) -> Paragraph<'static> {
        let style = match self.message.role() {
            Role::System => self.role_style().add_modifier(Modifier::ITALIC),
            _ => Style::default().fg(self.palette.text),
        };
        Paragraph::new(self.text())
            .style(style)
            .wrap(Wrap { trim: false })
    }

    /// Rows this message occupies at `width`, borders included.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let lines = self.paragraph().line_count(content_width);
        (lines as u16).max(1) + VERTICAL_OVERHEAD
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let border_style = self.role_style().add_modifier(Modifier::DIM);
        let title = format!(
            " {} · {} ",
            self.message.role().label(),
            self.message.created_at().format("%H:%M")
        );

        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(self.role_style())
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        self.paragraph().render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

/// Terminal text for a markup notice: tags dropped, `<a href="u">t</a>`
/// shown as `t (u)`, entities decoded.
pub fn strip_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut pending_href: Option<String> = None;
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let tag = rest[open + 1..open + close].trim();
        if tag.eq_ignore_ascii_case("/a") {
            if let Some(href) = pending_href.take() {
                out.push_str(&format!(" ({href})"));
            }
        } else if let Some(attrs) = tag.strip_prefix("a ") {
            pending_href = href_of(attrs);
        }
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    decode_entities(&out)
}

fn href_of(attrs: &str) -> Option<String> {
    let value = attrs.split("href=").nth(1)?.trim_start();
    let quote = value.chars().next()?;
    if quote == '"' || quote == '\'' {
        let inner = &value[1..];
        inner.find(quote).map(|end| inner[..end].to_string())
    } else {
        value.split_whitespace().next().map(str::to_string)
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
