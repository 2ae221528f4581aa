//! Generator module - writes the static site using the built-in Tera templates

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::PostCollection;
use crate::sitemap;
use crate::templates::TemplateRenderer;
use crate::views::{all_pages, filter_posts, ListingQuery, ListingView, PostSummary};
use crate::Folio;

/// Static site generator
pub struct Generator {
    folio: Folio,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &PostCollection) -> Result<()> {
        fs::create_dir_all(&self.folio.public_dir)?;

        self.copy_static_assets()?;
        self.generate_home(posts)?;
        self.generate_listing(posts)?;
        self.generate_post_pages(posts)?;
        self.generate_not_found()?;
        self.generate_sitemap(posts)?;
        self.generate_post_index(posts)?;

        Ok(())
    }

    fn generate_home(&self, posts: &PostCollection) -> Result<()> {
        let html = self.renderer.render_home(&self.folio.config, posts)?;
        self.write_output(Path::new("index.html"), &html)?;
        tracing::debug!("Generated home page");
        Ok(())
    }

    fn generate_listing(&self, posts: &PostCollection) -> Result<()> {
        let view = ListingView::build(&self.folio.config, posts, ListingQuery::default());
        let html = self.renderer.render_listing(&self.folio.config, &view)?;
        self.write_output(&self.blog_dir().join("index.html"), &html)?;
        tracing::info!("Generated blog listing with {} posts", view.total);
        Ok(())
    }

    fn generate_post_pages(&self, posts: &PostCollection) -> Result<()> {
        for page in all_pages(&self.folio.config, posts) {
            let html = self.renderer.render_post(&self.folio.config, &page)?;
            let output_path = self.post_dir(&page.slug).join("index.html");
            self.write_output(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }
        Ok(())
    }

    fn generate_not_found(&self) -> Result<()> {
        let html = self.renderer.render_not_found(&self.folio.config, None)?;
        self.write_output(Path::new("404.html"), &html)
    }

    fn generate_sitemap(&self, posts: &PostCollection) -> Result<()> {
        let entries = sitemap::entries(&self.folio.config, posts);
        self.write_output(Path::new("sitemap.xml"), &sitemap::to_xml(&entries))?;
        self.write_output(
            Path::new("robots.txt"),
            &sitemap::robots_txt(&self.folio.config),
        )?;
        tracing::info!("Generated sitemap.xml with {} urls", entries.len());
        Ok(())
    }

    /// Post summaries, newest first, for client-side filtering
    fn generate_post_index(&self, posts: &PostCollection) -> Result<()> {
        let summaries: Vec<PostSummary> = filter_posts(posts, &ListingQuery::default())
            .into_iter()
            .map(|post| PostSummary::from_post(&self.folio.config, post))
            .collect();

        let json = serde_json::to_string_pretty(&summaries)?;
        self.write_output(&self.blog_dir().join("posts.json"), &json)?;
        tracing::debug!("Generated posts.json");
        Ok(())
    }

    /// Copy static assets (images, css, etc.) to public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.folio.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(())
    }

    /// Blog directory relative to the public directory
    fn blog_dir(&self) -> PathBuf {
        self.folio
            .config
            .blog_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    fn post_dir(&self, slug: &str) -> PathBuf {
        let mut dir = self.blog_dir();
        dir.extend(slug.split('/'));
        dir
    }

    fn write_output(&self, relative: &Path, contents: &str) -> Result<()> {
        let output_path = self.folio.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site() -> (TempDir, Folio) {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        let folio = Folio::with_config(tmp.path(), config);

        write(
            &folio.posts_dir.join("hello.md"),
            "---\ntitle: Hello\ndate: 2024-01-15\nexcerpt: First post\ncategory: Rust\n---\n## Intro\n\nHi.\n",
        );
        write(
            &folio.posts_dir.join("2023/recap/index.md"),
            "---\ntitle: Recap\ndate: 2023-12-31\nexcerpt: Year in review\n---\nDone.\n",
        );
        write(&folio.static_dir.join("css/style.css"), "body {}\n");

        (tmp, folio)
    }

    #[test]
    fn test_generate_writes_site() {
        let (_tmp, folio) = site();
        let posts = folio.load_posts().unwrap();
        Generator::new(&folio).unwrap().generate(&posts).unwrap();

        let public = &folio.public_dir;
        assert!(public.join("index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("css/style.css").exists());
        assert!(public.join("blog/index.html").exists());
        assert!(public.join("blog/2023/recap/index.html").exists());

        let post = fs::read_to_string(public.join("blog/hello/index.html")).unwrap();
        assert!(post.contains("<h1>Hello</h1>"));
        assert!(post.contains("id=\"intro\""));

        let sitemap = fs::read_to_string(public.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/blog/2023/recap/</loc>"));
        let robots = fs::read_to_string(public.join("robots.txt")).unwrap();
        assert!(robots.contains("https://example.com/sitemap.xml"));
    }

    #[test]
    fn test_post_index_is_newest_first() {
        let (_tmp, folio) = site();
        let posts = folio.load_posts().unwrap();
        Generator::new(&folio).unwrap().generate(&posts).unwrap();

        let json = fs::read_to_string(folio.public_dir.join("blog/posts.json")).unwrap();
        let index: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        let slugs: Vec<_> = index.iter().map(|p| p["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, vec!["hello", "2023/recap"]);
        assert_eq!(index[0]["read_time"], "1 min");
    }

    #[test]
    fn test_static_listing_carries_client_side_empty_state() {
        let (_tmp, folio) = site();
        let posts = folio.load_posts().unwrap();
        Generator::new(&folio).unwrap().generate(&posts).unwrap();

        let listing = fs::read_to_string(folio.public_dir.join("blog/index.html")).unwrap();
        assert!(listing.contains("<div class=\"empty-state listing-empty\" hidden>"));
        assert!(listing.contains("<a href=\"/blog/\">Reset filters</a>"));
        assert!(listing.contains("data-title=\"hello\" data-excerpt=\"first post\""));
        assert!(!listing.contains("data-search="));
        assert!(listing.contains("URLSearchParams"));
    }

    #[test]
    fn test_post_pages_link_date_neighbours() {
        let (_tmp, folio) = site();
        let posts = folio.load_posts().unwrap();
        Generator::new(&folio).unwrap().generate(&posts).unwrap();

        let hello = fs::read_to_string(folio.public_dir.join("blog/hello/index.html")).unwrap();
        assert!(hello.contains("href=\"/blog/2023/recap/\""));
        let recap =
            fs::read_to_string(folio.public_dir.join("blog/2023/recap/index.html")).unwrap();
        assert!(recap.contains("href=\"/blog/hello/\""));
    }
}
