use std::sync::LazyLock;

use log::warn;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::{RenderError, escape_html};

/// Grammar set shared by the HTML highlighter and the terminal renderer.
pub static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
/// Colour themes shared by the exported stylesheet and the terminal renderer.
pub static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

pub const LIGHT_CODE_THEME: &str = "InspiredGitHub";
pub const DARK_CODE_THEME: &str = "base16-ocean.dark";

/// Stylesheet for the classes `SyntectHighlighter` emits, with one rule set
/// per page theme scoped under `[data-theme="..."]`.
pub fn highlight_css() -> String {
    let mut css = String::new();
    for (page_theme, name) in [("light", LIGHT_CODE_THEME), ("dark", DARK_CODE_THEME)] {
        let Some(theme) = THEME_SET.themes.get(name) else {
            warn!("Syntax theme {} is not bundled", name);
            continue;
        };
        match css_for_theme_with_class_style(theme, ClassStyle::Spaced) {
            Ok(rules) => {
                let scope = format!("[data-theme=\"{page_theme}\"]");
                css.push_str(&scope_rules(&rules, &scope));
            }
            Err(e) => warn!("Could not build stylesheet for {}: {}", name, e),
        }
    }
    css
}

/// Prefix every selector of every rule in `css` with `scope`.
fn scope_rules(css: &str, scope: &str) -> String {
    let mut out = String::with_capacity(css.len() * 2);
    for line in css.lines() {
        match line.strip_suffix(" {") {
            Some(selectors) if !line.starts_with(' ') => {
                let scoped: Vec<String> = selectors
                    .split(", ")
                    .map(|selector| format!("{scope} {selector}"))
                    .collect();
                out.push_str(&scoped.join(", "));
                out.push_str(" {");
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

pub trait CodeHighlighter: Send + Sync {
    /// Produce a complete `<pre>` block for one code fence.
    fn highlight(&self, code: &str, lang: Option<&str>) -> Result<String, RenderError>;
}

/// Code fences stay framed but uncoloured. Used when highlighting is
/// switched off in config, so markdown still renders.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl CodeHighlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _lang: Option<&str>) -> Result<String, RenderError> {
        Ok(super::plain_code_block(code))
    }
}

/// Emits class-annotated spans (`<span class="source rust">`). Colours come
/// from `highlight_css`, which the exported page embeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> Result<String, RenderError> {
        let syntax = lang
            .and_then(|token| SYNTAX_SET.find_syntax_by_token(token))
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| RenderError::Highlight(e.to_string()))?;
        }
        let body = generator.finalize();

        let open = match lang {
            Some(token) => format!(
                r#"<pre class="code"><code class="language-{}">"#,
                escape_html(token)
            ),
            None => r#"<pre class="code"><code>"#.to_string(),
        };
        Ok(format!("{open}{body}</code></pre>\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_gets_classes() {
        let html = SyntectHighlighter::new()
            .highlight("fn main() {}\n", Some("rust"))
            .unwrap();
        assert!(html.starts_with(r#"<pre class="code"><code class="language-rust">"#), "{html}");
        assert!(html.contains("<span class=\""), "{html}");
        assert!(html.ends_with("</code></pre>\n"));
    }

    #[test]
    fn code_contents_are_escaped() {
        let html = SyntectHighlighter::new()
            .highlight("<script>alert(1)</script>\n", None)
            .unwrap();
        assert!(!html.contains("<script>"), "{html}");
        assert!(html.contains("&lt;script&gt;"), "{html}");
    }

    #[test]
    fn stylesheet_is_scoped_per_theme() {
        let css = highlight_css();
        assert!(css.contains(r#"[data-theme="light"] .code {"#), "{css}");
        assert!(css.contains(r#"[data-theme="dark"] .code {"#), "{css}");
        assert!(css.contains("color: #"));
        assert!(
            css.lines()
                .filter(|l| l.ends_with(" {"))
                .all(|l| l.starts_with("[data-theme=")),
            "{css}"
        );
    }

    #[test]
    fn scope_rules_prefixes_each_selector() {
        let css = ".comment, .string .punctuation {\n color: #000000;\n}\n";
        assert_eq!(
            scope_rules(css, "[x]"),
            "[x] .comment, [x] .string .punctuation {\n color: #000000;\n}\n"
        );
    }

    #[test]
    fn unknown_language_falls_back_to_plain_grammar() {
        let html = SyntectHighlighter::new()
            .highlight("whatever\n", Some("no-such-lang\"x"))
            .unwrap();
        assert!(html.contains("language-no-such-lang&quot;x"), "{html}");
        assert!(html.contains("whatever"));
    }
}
