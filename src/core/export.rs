//! Transcript export to a standalone HTML page.
//!
//! Bodies are written exactly as the render pipeline produced them, so the
//! page shows the same markup the transcript holds. The page embeds the
//! highlighter's stylesheet for both themes and is written via `.tmp` and
//! `rename()`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use crate::core::message::{Message, RenderedAs};
use crate::core::preference::Theme;
use crate::render::highlight::highlight_css;

const STYLE: &str = r#"
:root { --bg: #ffffff; --fg: #1f2328; --muted: #656d76; --user: #ddf4ff; --assistant: #f6f8fa; --system: #fff8c5; }
[data-theme="dark"] { --bg: #0d1117; --fg: #e6edf3; --muted: #8d96a0; --user: #0c2d6b; --assistant: #161b22; --system: #3b2e00; }
body { background: var(--bg); color: var(--fg); font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; }
.message { border-radius: 8px; padding: 0.5rem 1rem; margin: 0.75rem 0; }
.message.user { background: var(--user); }
.message.assistant { background: var(--assistant); }
.message.system { background: var(--system); }
.meta { color: var(--muted); font-size: 0.8rem; }
.plain { white-space: pre-wrap; }
pre { overflow-x: auto; padding: 0.5rem; border-radius: 6px; }
"#;

/// Render `messages` into a complete HTML document carrying `theme`.
pub fn transcript_html(messages: &[Message], theme: Theme) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str(&format!("<html lang=\"en\" data-theme=\"{}\">\n", theme.as_str()));
    out.push_str("<head>\n<meta charset=\"utf-8\">\n<title>llamachat transcript</title>\n");
    out.push_str(&format!(
        "<style>{STYLE}{}</style>\n</head>\n<body>\n",
        highlight_css()
    ));

    for message in messages {
        let role = message.role().label();
        out.push_str(&format!("<div class=\"message {role}\">\n"));
        out.push_str(&format!(
            "<div class=\"meta\">{role} · {}</div>\n",
            message.created_at().format("%Y-%m-%d %H:%M:%S")
        ));
        match message.rendered_as() {
            RenderedAs::RichMarkup => {
                out.push_str(&format!("<div class=\"body\">{}</div>\n", message.body()))
            }
            RenderedAs::Plain => {
                out.push_str(&format!("<div class=\"body plain\">{}</div>\n", message.body()))
            }
        }
        out.push_str("</div>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Write the export into `dir` under a timestamped name and return its path.
pub fn write_export(dir: &Path, messages: &[Message], theme: Theme) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = format!(
        "llamachat-transcript-{}.html",
        Local::now().format("%Y%m%d-%H%M%S")
    );
    let path = dir.join(name);
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, transcript_html(messages, theme))?;
    fs::rename(&tmp_path, &path)?;
    info!("Exported {} messages to {}", messages.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use crate::render::RenderPipeline;

    fn messages() -> Vec<Message> {
        let pipeline = RenderPipeline::standard();
        vec![
            Message::new(Role::User, "<b>hi</b>", pipeline.render(Role::User, "<b>hi</b>")),
            Message::new(
                Role::Assistant,
                "Hi **there**",
                pipeline.render(Role::Assistant, "Hi **there**"),
            ),
        ]
    }

    #[test]
    fn test_html_carries_theme_and_bodies() {
        let html = transcript_html(&messages(), Theme::Dark);
        assert!(html.contains(r#"data-theme="dark""#));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<b>hi</b>"));
        assert!(html.contains("<strong>there</strong>"));
        assert!(html.contains(r#"class="body plain""#));
    }

    #[test]
    fn test_html_carries_code_colours() {
        let pipeline = RenderPipeline::standard();
        let content = "```rust\nfn main() {}\n```";
        let msgs = vec![Message::new(
            Role::Assistant,
            content,
            pipeline.render(Role::Assistant, content),
        )];
        let html = transcript_html(&msgs, Theme::Light);
        assert!(html.contains(r#"<pre class="code">"#), "{html}");
        assert!(html.contains(r#"[data-theme="light"] .code {"#));
        assert!(html.contains(r#"[data-theme="dark"] .code {"#));
    }

    #[test]
    fn test_write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), &messages(), Theme::Light).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("llamachat-transcript-"));
        assert!(name.ends_with(".html"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains(r#"data-theme="light""#));
        assert!(!path.with_extension("tmp").exists());
    }
}
