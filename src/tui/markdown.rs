//! Markdown → ratatui `Text` for assistant replies.
//!
//! The terminal counterpart of `render::CmarkEngine`: the same parser and
//! the same grammar set, but the output is styled `Line`s in the active
//! palette instead of HTML. Raw HTML in the source is shown as literal text
//! and unsafe link targets are hidden, matching the HTML path.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::util::LinesWithEndings;

use crate::render::highlight::{SYNTAX_SET, THEME_SET};
use crate::render::markdown::is_unsafe_url;
use crate::tui::theme::Palette;

const RULE_WIDTH: usize = 40;

/// Render markdown `content` in `palette`. With `highlight` off, code blocks
/// keep their frame but are drawn in a single colour.
pub fn render(content: &str, palette: &Palette, highlight: bool) -> Text<'static> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = TermWriter::new(*palette, highlight);
    for event in Parser::new_ext(content, options) {
        writer.handle(event);
    }
    writer.text
}

struct TermWriter {
    text: Text<'static>,
    palette: Palette,
    highlight: bool,
    /// Inline style stack; each entry is already patched onto its parent.
    styles: Vec<Style>,
    /// Spans repeated at the start of every line (blockquote and code frames).
    prefixes: Vec<Span<'static>>,
    /// List nesting: None = bullets, Some(n) = next ordinal.
    lists: Vec<Option<u64>>,
    code: Option<CodeState>,
    link_url: Option<String>,
    pending_gap: bool,
}

enum CodeState {
    Highlighted(HighlightLines<'static>),
    Plain,
}

impl TermWriter {
    fn new(palette: Palette, highlight: bool) -> Self {
        Self {
            text: Text::default(),
            palette,
            highlight,
            styles: Vec::new(),
            prefixes: Vec::new(),
            lists: Vec::new(),
            code: None,
            link_url: None,
            pending_gap: false,
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    fn frame_style(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    fn current(&self) -> Style {
        self.styles.last().copied().unwrap_or_else(|| self.base())
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.current().patch(overlay));
    }

    fn new_line(&mut self, mut line: Line<'static>) {
        for prefix in self.prefixes.iter().rev() {
            line.spans.insert(0, prefix.clone());
        }
        self.text.lines.push(line);
    }

    fn append(&mut self, span: Span<'static>) {
        match self.text.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(Line::from(span)),
        }
    }

    fn gap(&mut self) {
        if self.pending_gap {
            self.new_line(Line::default());
            self.pending_gap = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => {
                let style = Style::default()
                    .fg(self.palette.code_fg)
                    .bg(self.palette.code_bg);
                self.append(Span::styled(code.to_string(), style));
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                let style = self.current();
                for (i, part) in raw.split('\n').enumerate() {
                    if i > 0 {
                        self.new_line(Line::default());
                    }
                    if !part.is_empty() {
                        self.append(Span::styled(part.to_string(), style));
                    }
                }
            }
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(Line::default()),
            Event::Rule => {
                self.gap();
                let rule = Span::styled("─".repeat(RULE_WIDTH), self.frame_style());
                self.new_line(Line::from(rule));
                self.pending_gap = true;
            }
            Event::TaskListMarker(done) => {
                self.append(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.gap();
                self.new_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.gap();
                let style = heading_style(self.base(), level);
                let marker = format!("{} ", "#".repeat(level as usize));
                self.new_line(Line::from(Span::styled(marker, style)));
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.gap();
                self.prefixes.push(Span::styled("│ ", self.frame_style()));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => self.open_code(kind),
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.gap();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line(Line::default());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.append(Span::styled(marker, self.frame_style()));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = (!is_unsafe_url(&dest_url)).then(|| dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(self.palette.accent)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn open_code(&mut self, kind: CodeBlockKind<'_>) {
        if !self.text.lines.is_empty() {
            self.new_line(Line::default());
        }
        let lang = match &kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or(""),
            CodeBlockKind::Indented => "",
        }
        .to_string();

        let frame = self.frame_style();
        let top = if lang.is_empty() {
            Line::from(Span::styled("╭──", frame))
        } else {
            Line::from(vec![
                Span::styled("╭── ", frame),
                Span::styled(lang.clone(), frame.add_modifier(Modifier::BOLD)),
                Span::styled(" ──", frame),
            ])
        };
        self.new_line(top);
        self.prefixes.push(Span::styled("│ ", frame));

        let highlighter = if self.highlight && !lang.is_empty() {
            SYNTAX_SET
                .find_syntax_by_token(&lang)
                .zip(THEME_SET.themes.get(self.palette.syntax_theme))
                .map(|(syntax, theme)| HighlightLines::new(syntax, theme))
        } else {
            None
        };
        self.code = Some(match highlighter {
            Some(h) => CodeState::Highlighted(h),
            None => CodeState::Plain,
        });
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_gap = true,
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.prefixes.pop();
                self.styles.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.prefixes.pop();
                let bottom = Span::styled("╰──", self.frame_style());
                self.new_line(Line::from(bottom));
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.pending_gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.link_url.take() {
                    let style = Style::default().fg(self.palette.muted);
                    self.append(Span::styled(format!(" ({url})"), style));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, raw: CowStr<'_>) {
        // ratatui draws \t as zero-width
        let text = raw.replace('\t', "    ");

        match self.code.take() {
            Some(CodeState::Highlighted(mut highlighter)) => {
                for line in LinesWithEndings::from(&text) {
                    let spans: Vec<Span<'static>> = match highlighter.highlight_line(line, &SYNTAX_SET)
                    {
                        Ok(ranges) => ranges
                            .into_iter()
                            .filter_map(|(style, fragment)| {
                                let fragment = fragment.trim_end_matches('\n');
                                (!fragment.is_empty()).then(|| {
                                    let fg = ratatui::style::Color::Rgb(
                                        style.foreground.r,
                                        style.foreground.g,
                                        style.foreground.b,
                                    );
                                    Span::styled(fragment.to_string(), Style::default().fg(fg))
                                })
                            })
                            .collect(),
                        Err(_) => vec![Span::styled(
                            line.trim_end_matches('\n').to_string(),
                            Style::default().fg(self.palette.code_fg),
                        )],
                    };
                    self.new_line(Line::from(spans));
                }
                self.code = Some(CodeState::Highlighted(highlighter));
            }
            Some(CodeState::Plain) => {
                let style = Style::default().fg(self.palette.code_fg);
                for line in text.lines() {
                    self.new_line(Line::from(Span::styled(line.to_string(), style)));
                }
                self.code = Some(CodeState::Plain);
            }
            None => {
                let style = self.current();
                self.append(Span::styled(text, style));
            }
        }
    }
}

fn heading_style(base: Style, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => base.add_modifier(Modifier::BOLD),
        _ => base.add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preference::Theme;

    fn plain_lines(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_text_inherits_heading_style() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render("## Hello", &palette, true);
        let line = &text.lines[0];
        assert_eq!(line.spans[0].content, "## ");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[1].style.fg, Some(palette.text));
    }

    #[test]
    fn bold_text_is_bold() {
        let text = render("Some **bold** text", &Palette::for_theme(Theme::Light), true);
        let bold = text.lines[0].spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn code_block_is_framed() {
        let text = render("```\nline1\nline2\n```", &Palette::for_theme(Theme::Light), true);
        let lines = plain_lines(&text);
        assert!(lines[0].starts_with('╭'), "{lines:?}");
        assert_eq!(lines[1], "│ line1");
        assert_eq!(lines[2], "│ line2");
        assert!(lines.last().unwrap().starts_with('╰'));
    }

    #[test]
    fn highlighting_can_be_disabled() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render("```rust\nfn main() {}\n```", &palette, false);
        let body = &text.lines[1];
        assert!(body.spans[1..].iter().all(|s| s.style.fg == Some(palette.code_fg)));
    }

    #[test]
    fn raw_html_is_shown_literally() {
        let text = render("a <b>bold</b> claim", &Palette::for_theme(Theme::Light), true);
        assert_eq!(plain_lines(&text)[0], "a <b>bold</b> claim");
    }

    #[test]
    fn unsafe_link_target_is_hidden() {
        let palette = Palette::for_theme(Theme::Light);
        let lines = plain_lines(&render("[x](javascript:alert(1))", &palette, true));
        assert_eq!(lines[0], "x");
        let lines = plain_lines(&render("[x](https://a.io)", &palette, true));
        assert_eq!(lines[0], "x (https://a.io)");
    }

    #[test]
    fn tabs_expanded() {
        let text = render("```\n\tindented\n```", &Palette::for_theme(Theme::Light), true);
        assert!(plain_lines(&text).iter().all(|l| !l.contains('\t')));
    }
}
