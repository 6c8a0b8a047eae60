//! Markdown → HTML with pulldown-cmark.
//!
//! Model output is untrusted. Raw HTML in the source is turned into text
//! (and therefore escaped by the HTML writer), and links or images with a
//! script-capable scheme lose their destination.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use super::RenderError;

pub trait MarkdownEngine: Send + Sync {
    /// Render `source` to HTML. Every fenced or indented code block is handed
    /// to `code_block` (contents, language) and its return value is inserted
    /// verbatim in place of the block.
    fn to_html(
        &self,
        source: &str,
        code_block: &mut dyn FnMut(&str, Option<&str>) -> String,
    ) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, Copy)]
pub struct CmarkEngine {
    options: Options,
}

impl Default for CmarkEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CmarkEngine {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl MarkdownEngine for CmarkEngine {
    fn to_html(
        &self,
        source: &str,
        code_block: &mut dyn FnMut(&str, Option<&str>) -> String,
    ) -> Result<String, RenderError> {
        let mut events: Vec<Event<'_>> = Vec::new();
        // (language, accumulated contents) while inside a code block
        let mut open_block: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(source, self.options) {
            if let Some((_, contents)) = open_block.as_mut() {
                match event {
                    Event::Text(text) => contents.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((lang, contents)) = open_block.take() {
                            let html = code_block(&contents, lang.as_deref());
                            events.push(Event::Html(CowStr::from(html)));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|token| token.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    open_block = Some((lang, String::new()));
                }
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url: neutralise(dest_url),
                    title,
                    id,
                })),
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url: neutralise(dest_url),
                    title,
                    id,
                })),
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out)
    }
}

/// Whether a link destination could execute script when followed.
pub fn is_unsafe_url(url: &str) -> bool {
    let lowered: String = url
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .flat_map(char::to_lowercase)
        .collect();
    ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}

fn neutralise(dest: CowStr<'_>) -> CowStr<'_> {
    if is_unsafe_url(&dest) {
        CowStr::Borrowed("#")
    } else {
        dest
    }
}
