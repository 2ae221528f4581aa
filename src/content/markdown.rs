//! Markdown rendering with heading anchors and syntax highlighting

use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Stands in for a blank code line so fixed-height line rendering keeps its row
pub const BLANK_LINE_PLACEHOLDER: char = '\u{200B}';

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// A heading found while rendering, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Output of a single render
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

struct PendingHeading<'a> {
    level: HeadingLevel,
    id: Option<String>,
    classes: Vec<String>,
    inner: Vec<Event<'a>>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(DEFAULT_THEME, false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        let theme_set = ThemeSet::load_defaults();
        if !theme_set.themes.contains_key(theme) {
            tracing::warn!("Unknown highlight theme {:?}, using {}", theme, DEFAULT_THEME);
        }
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Rendered {
        // Front-matter is stripped before we get here, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut headings = Vec::new();
        let mut used_ids = HashSet::new();
        // Some(lang) while inside a code block
        let mut code_block_lang: Option<Option<String>> = None;
        let mut code_block_content = String::new();
        let mut pending: Option<PendingHeading> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block_lang = Some(match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    });
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(lang) = code_block_lang.take() {
                        let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block_lang.is_some() => {
                    code_block_content.push_str(&text);
                }
                Event::Start(Tag::Heading {
                    level, id, classes, ..
                }) => {
                    pending = Some(PendingHeading {
                        level,
                        id: id.map(|id| id.to_string()),
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        inner: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(heading) = pending.take() {
                        let (html, heading) = finish_heading(heading, &mut used_ids);
                        headings.push(heading);
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                other => match pending.as_mut() {
                    Some(heading) => heading.inner.push(other),
                    None => events.push(other),
                },
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Rendered {
            html: html_output,
            headings,
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.get(DEFAULT_THEME))
    }

    /// Highlight a code block, one `<span class="line">` per source line
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme() else {
            return plain_code_block(code, lang);
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(code) {
            let regions = match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(regions) => regions,
                Err(e) => {
                    tracing::warn!("Highlighting failed for {} block: {}", lang, e);
                    return plain_code_block(code, lang);
                }
            };

            let regions: Vec<(Style, &str)> = regions
                .into_iter()
                .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
                .filter(|(_, text)| !text.is_empty())
                .collect();

            let visible = regions.iter().any(|(_, text)| !text.trim().is_empty());
            let inner = if visible {
                match styled_line_to_highlighted_html(&regions, IncludeBackground::No) {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!("Highlighting failed for {} block: {}", lang, e);
                        return plain_code_block(code, lang);
                    }
                }
            } else {
                BLANK_LINE_PLACEHOLDER.to_string()
            };
            lines.push(inner);
        }

        let background = theme
            .settings
            .background
            .map(|c| format!(r#" style="background-color:#{:02x}{:02x}{:02x};""#, c.r, c.g, c.b))
            .unwrap_or_default();

        let body = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if self.line_numbers {
                    format!(r#"<span class="line" data-line-number="{}">{}</span>"#, i + 1, line)
                } else {
                    format!(r#"<span class="line">{}</span>"#, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight" data-language="{lang}"><pre data-theme="{theme}"{background}><code class="language-{lang}" data-language="{lang}">{body}</code></pre></figure>"#,
            lang = html_escape(lang),
            theme = html_escape(&self.theme_name),
            background = background,
            body = body,
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// First word of a fence info string (```` ```rust,ignore title="x" ````)
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
        .map(|lang| lang.to_string())
}

/// Emit a heading with its id and anchor link
fn finish_heading(heading: PendingHeading, used_ids: &mut HashSet<String>) -> (String, Heading) {
    let text: String = heading
        .inner
        .iter()
        .filter_map(|event| match event {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect();

    let base = heading.id.unwrap_or_else(|| {
        let slug = slug::slugify(&text);
        if slug.is_empty() {
            "section".to_string()
        } else {
            slug
        }
    });
    let id = unique_id(base, used_ids);

    let mut inner_html = String::new();
    html::push_html(&mut inner_html, heading.inner.into_iter());

    let level = heading.level as u8;
    let class_attr = if heading.classes.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, html_escape(&heading.classes.join(" ")))
    };
    let id = html_escape(&id);

    let html = format!(
        r##"<h{level} id="{id}"{class_attr}><a class="anchor" href="#{id}" aria-hidden="true"><span class="icon icon-link"></span></a>{inner_html}</h{level}>
"##
    );

    (
        html,
        Heading {
            level,
            id,
            text: text.trim().to_string(),
        },
    )
}

/// `intro`, `intro-1`, `intro-2`, ...
fn unique_id(base: String, used: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 0;
    while used.contains(&candidate) {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }
    used.insert(candidate.clone());
    candidate
}

fn plain_code_block(code: &str, lang: &str) -> String {
    let lines = code
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                format!(r#"<span class="line">{}</span>"#, BLANK_LINE_PLACEHOLDER)
            } else {
                format!(r#"<span class="line">{}</span>"#, html_escape(line))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<figure class="highlight" data-language="{lang}"><pre><code class="language-{lang}">{lines}</code></pre></figure>"#,
        lang = html_escape(lang),
        lines = lines,
    )
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
