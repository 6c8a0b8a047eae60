//! # Render Pipeline
//!
//! Turns message text into HTML that is safe to embed in a page.
//!
//! ```text
//! assistant ──▶ MarkdownEngine ──▶ CodeHighlighter (per fenced block) ──▶ rich markup
//!     │              │ absent / failed
//!     │              ▼
//! user ────────▶ escape_html ──▶ plain
//! system ──── contains '<' and '>' ? trusted markup : escape_html
//! ```
//!
//! Both capabilities are injected. A pipeline built without one of them
//! still renders every message, it just never produces rich markup for
//! assistant output.

pub mod highlight;
pub mod markdown;

use std::fmt;

use log::{debug, warn};

use crate::core::message::{RenderedAs, Role};

pub use highlight::{CodeHighlighter, PlainHighlighter, SyntectHighlighter};
pub use markdown::{CmarkEngine, MarkdownEngine};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Markdown(String),
    Highlight(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Markdown(msg) => write!(f, "markdown error: {msg}"),
            RenderError::Highlight(msg) => write!(f, "highlight error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Output of the pipeline: how the body was produced, and the body itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub rendered_as: RenderedAs,
    pub body: String,
}

impl Rendered {
    pub fn plain(content: &str) -> Self {
        Self {
            rendered_as: RenderedAs::Plain,
            body: escape_html(content),
        }
    }
}

pub struct RenderPipeline {
    markdown: Option<Box<dyn MarkdownEngine>>,
    highlighter: Option<Box<dyn CodeHighlighter>>,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl RenderPipeline {
    pub fn new(
        markdown: Option<Box<dyn MarkdownEngine>>,
        highlighter: Option<Box<dyn CodeHighlighter>>,
    ) -> Self {
        Self {
            markdown,
            highlighter,
        }
    }

    /// pulldown-cmark for markdown, syntect for code blocks.
    pub fn standard() -> Self {
        Self::new(
            Some(Box::new(CmarkEngine::new())),
            Some(Box::new(SyntectHighlighter::new())),
        )
    }

    /// Pipeline for the `[ui]` config switches. Without markdown nothing is
    /// rich; without highlighting code fences are left uncoloured.
    pub fn from_flags(render_markdown: bool, highlight_code: bool) -> Self {
        if !render_markdown {
            return Self::plain_only();
        }
        let highlighter: Box<dyn CodeHighlighter> = if highlight_code {
            Box::new(SyntectHighlighter::new())
        } else {
            Box::new(PlainHighlighter)
        };
        Self::new(Some(Box::new(CmarkEngine::new())), Some(highlighter))
    }

    /// No capabilities: everything renders as escaped text.
    pub fn plain_only() -> Self {
        Self::new(None, None)
    }

    pub fn supports_rich_markup(&self) -> bool {
        self.markdown.is_some() && self.highlighter.is_some()
    }

    pub fn render(&self, role: Role, content: &str) -> Rendered {
        match role {
            Role::Assistant => self.render_assistant(content),
            Role::User => Rendered::plain(content),
            Role::System => {
                if content.contains('<') && content.contains('>') {
                    Rendered {
                        rendered_as: RenderedAs::RichMarkup,
                        body: content.to_string(),
                    }
                } else {
                    Rendered::plain(content)
                }
            }
        }
    }

    fn render_assistant(&self, content: &str) -> Rendered {
        let (Some(markdown), Some(highlighter)) = (&self.markdown, &self.highlighter) else {
            debug!("Rich rendering unavailable, falling back to plain text");
            return Rendered::plain(content);
        };

        let mut highlight_block = |code: &str, lang: Option<&str>| {
            match highlighter.highlight(code, lang) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Code block left unhighlighted: {}", e);
                    plain_code_block(code)
                }
            }
        };

        match markdown.to_html(content, &mut highlight_block) {
            Ok(body) => Rendered {
                rendered_as: RenderedAs::RichMarkup,
                body,
            },
            Err(e) => {
                warn!("Markdown rendering failed, falling back to plain text: {}", e);
                Rendered::plain(content)
            }
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A code block with escaped, unhighlighted contents.
pub fn plain_code_block(code: &str) -> String {
    format!("<pre><code>{}</code></pre>\n", escape_html(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenMarkdown;

    impl MarkdownEngine for BrokenMarkdown {
        fn to_html(
            &self,
            _source: &str,
            _code_block: &mut dyn FnMut(&str, Option<&str>) -> String,
        ) -> Result<String, RenderError> {
            Err(RenderError::Markdown("parser crashed".to_string()))
        }
    }

    struct BrokenHighlighter;

    impl CodeHighlighter for BrokenHighlighter {
        fn highlight(&self, _code: &str, _lang: Option<&str>) -> Result<String, RenderError> {
            Err(RenderError::Highlight("no grammar".to_string()))
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_assistant_markdown_is_rich() {
        let rendered = RenderPipeline::standard().render(Role::Assistant, "Hi **there**");
        assert_eq!(rendered.rendered_as, RenderedAs::RichMarkup);
        assert!(rendered.body.contains("<strong>there</strong>"), "{}", rendered.body);
    }

    #[test]
    fn test_user_text_is_never_markup() {
        let rendered = RenderPipeline::standard().render(Role::User, "**bold** <script>x</script>");
        assert_eq!(rendered.rendered_as, RenderedAs::Plain);
        assert_eq!(
            rendered.body,
            "**bold** &lt;script&gt;x&lt;/script&gt;"
        );
    }

    #[test]
    fn test_system_with_link_is_markup() {
        let text = r#"See <a href="http://localhost:8888/api/connection-test">diagnostics</a>"#;
        let rendered = RenderPipeline::standard().render(Role::System, text);
        assert_eq!(rendered.rendered_as, RenderedAs::RichMarkup);
        assert_eq!(rendered.body, text);
    }

    #[test]
    fn test_system_with_one_bracket_is_plain() {
        let rendered = RenderPipeline::standard().render(Role::System, "Error: 3 < 4");
        assert_eq!(rendered.rendered_as, RenderedAs::Plain);
        assert_eq!(rendered.body, "Error: 3 &lt; 4");
    }

    #[test]
    fn test_missing_markdown_capability_falls_back_to_plain() {
        let pipeline = RenderPipeline::new(None, Some(Box::new(SyntectHighlighter::new())));
        let rendered = pipeline.render(Role::Assistant, "Hi **there** <b>");
        assert_eq!(rendered.rendered_as, RenderedAs::Plain);
        assert_eq!(rendered.body, "Hi **there** &lt;b&gt;");
    }

    #[test]
    fn test_config_flags() {
        assert!(!RenderPipeline::from_flags(false, true).supports_rich_markup());

        let pipeline = RenderPipeline::from_flags(true, false);
        let rendered = pipeline.render(Role::Assistant, "```rust\nfn main() {}\n```");
        assert_eq!(rendered.rendered_as, RenderedAs::RichMarkup);
        assert!(rendered.body.contains("<pre><code>fn main() {}"), "{}", rendered.body);
        assert!(!rendered.body.contains("<span"));
    }

    #[test]
    fn test_missing_highlighter_falls_back_to_plain() {
        let pipeline = RenderPipeline::new(Some(Box::new(CmarkEngine::new())), None);
        assert!(!pipeline.supports_rich_markup());
        let rendered = pipeline.render(Role::Assistant, "# Title");
        assert_eq!(rendered.rendered_as, RenderedAs::Plain);
        assert_eq!(rendered.body, "# Title");
    }

    #[test]
    fn test_markdown_failure_falls_back_to_plain() {
        let pipeline = RenderPipeline::new(
            Some(Box::new(BrokenMarkdown)),
            Some(Box::new(SyntectHighlighter::new())),
        );
        let rendered = pipeline.render(Role::Assistant, "<i>x</i>");
        assert_eq!(rendered.rendered_as, RenderedAs::Plain);
        assert_eq!(rendered.body, "&lt;i&gt;x&lt;/i&gt;");
    }

    #[test]
    fn test_highlight_failure_only_affects_the_block() {
        let pipeline = RenderPipeline::new(
            Some(Box::new(CmarkEngine::new())),
            Some(Box::new(BrokenHighlighter)),
        );
        let rendered = pipeline.render(Role::Assistant, "**ok**\n\n```rust\nlet a = 1 < 2;\n```\n");
        assert_eq!(rendered.rendered_as, RenderedAs::RichMarkup);
        assert!(rendered.body.contains("<strong>ok</strong>"));
        assert!(rendered.body.contains("<pre><code>let a = 1 &lt; 2;\n</code></pre>"));
    }
}
