//! Content loader - compiles the posts directory into a `PostCollection`

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{slug_from_relative_path, Body, FrontMatter, MarkdownRenderer, Post, PostCollection, ReadTime};
use crate::error::ContentError;
use crate::Folio;

/// Loads content from the posts directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Self {
        let renderer = MarkdownRenderer::with_options(
            &folio.config.highlight.theme,
            folio.config.highlight.line_numbers,
        );
        Self { folio, renderer }
    }

    /// Compile every post. The first failure aborts the whole build.
    pub fn load_posts(&self) -> Result<PostCollection, ContentError> {
        let posts_dir = &self.folio.posts_dir;
        if !posts_dir.exists() {
            tracing::warn!("Posts directory {:?} does not exist", posts_dir);
            return Ok(PostCollection::default());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(posts_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ContentError::Io {
                path: e.path().unwrap_or(posts_dir).to_path_buf(),
                source: e.into(),
            })?;
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let post = compile_post(&self.renderer, posts_dir, path, &raw)?;
                tracing::debug!("Compiled {:?} as {:?} ({})", path, post.slug, post.read_time);
                posts.push(post);
            }
        }

        let collection = PostCollection::from_posts(posts)?;
        tracing::info!("Compiled {} posts", collection.len());
        Ok(collection)
    }
}

/// Compile one Markdown file into a post
pub fn compile_post(
    renderer: &MarkdownRenderer,
    posts_root: &Path,
    path: &Path,
    raw: &str,
) -> Result<Post, ContentError> {
    let (fm, body) = FrontMatter::parse(path, raw)?;
    let date = fm.parse_date(path)?;

    let relative = path.strip_prefix(posts_root).unwrap_or(path);
    let slug = slug_from_relative_path(relative);

    let rendered = renderer.render(body);
    let read_time = ReadTime::from_html(&rendered.html);

    Ok(Post {
        title: fm.title,
        date,
        excerpt: fm.excerpt,
        category: fm.category,
        author: fm.author,
        image: fm.image,
        slug,
        read_time,
        body: Body {
            raw: body.to_string(),
            html: rendered.html,
        },
        headings: rendered.headings,
        source: path.to_path_buf(),
    })
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
