//! Post model and derived fields

use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::markdown::Heading;

/// Reading speed used for the read-time estimate
pub const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref HTML_ENTITY: Regex =
        Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap();
}

/// A compiled blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<FixedOffset>,

    /// Short summary shown in listings
    pub excerpt: String,

    pub category: Option<String>,
    pub author: Option<String>,

    /// Cover image URL or path
    pub image: Option<String>,

    /// URL identifier derived from the source path
    pub slug: String,

    pub read_time: ReadTime,

    pub body: Body,

    /// Headings in document order, for the table of contents
    pub headings: Vec<Heading>,

    /// Source file path
    pub source: PathBuf,
}

/// Markdown source and its rendered HTML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub raw: String,
    pub html: String,
}

/// Estimated reading time in whole minutes, never below one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ReadTime(usize);

impl ReadTime {
    /// Estimate from rendered HTML
    pub fn from_html(html: &str) -> Self {
        Self::from_word_count(count_words(html))
    }

    pub fn from_word_count(words: usize) -> Self {
        Self(words.div_ceil(WORDS_PER_MINUTE).max(1))
    }

    pub fn minutes(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ReadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

impl From<ReadTime> for String {
    fn from(value: ReadTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ReadTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_suffix(" min")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map(ReadTime)
            .ok_or_else(|| format!("invalid read time {:?}", value))
    }
}

/// Count words in rendered HTML.
///
/// A word is a whitespace-separated token of the tag-stripped text that
/// contains at least one alphanumeric character, so anchor icons and blank
/// line placeholders are not counted. Character references are dropped first:
/// `Tom &amp; Jerry` is two words and `AT&amp;T` is one.
pub fn count_words(html: &str) -> usize {
    let text = HTML_TAG.replace_all(html, " ");
    HTML_ENTITY
        .replace_all(&text, "")
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count()
}

/// Derive the slug from a file path relative to the posts root.
///
/// `hello.md` → `hello`, `2024/rust/intro.md` → `2024/rust/intro`,
/// `series/index.md` → `series`.
pub fn slug_from_relative_path(relative: &Path) -> String {
    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.len() > 1 && parts.last().is_some_and(|p| p == "index") {
        parts.pop();
    }

    parts.join("/")
}
