//! Content module - compiles Markdown posts into typed records

mod collection;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use collection::PostCollection;
pub use frontmatter::FrontMatter;
pub use markdown::{Heading, MarkdownRenderer, Rendered, BLANK_LINE_PLACEHOLDER, DEFAULT_THEME};
pub use post::{count_words, slug_from_relative_path, Body, Post, ReadTime, WORDS_PER_MINUTE};

/// Minimal post for unit tests elsewhere in the crate
#[cfg(test)]
pub(crate) fn test_post(slug: &str, date: &str) -> Post {
    let date = chrono::DateTime::parse_from_rfc3339(&format!("{}Z", date)).unwrap();
    Post {
        title: format!("Post {}", slug),
        date,
        excerpt: format!("Excerpt for {}", slug),
        category: None,
        author: None,
        image: None,
        slug: slug.to_string(),
        read_time: ReadTime::from_word_count(120),
        body: Body {
            raw: "Body".to_string(),
            html: "<p>Body</p>\n".to_string(),
        },
        headings: Vec::new(),
        source: std::path::PathBuf::from(format!("content/blog/{}.md", slug)),
    }
}
