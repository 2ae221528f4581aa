//! Initialize a new folio site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Site
title: My Portfolio
description: Software engineer writing about systems and the web
author: John Doe
language: en

# URL
url: http://example.com
root: /
blog_path: blog

# Directory
content_dir: content
posts_dir: blog
static_dir: static
public_dir: public

# Landing page
hero: I build fast, reliable software.
skills:
  - Backend development
  - Distributed systems
tech_stack:
  - Rust
  - PostgreSQL

highlight:
  theme: base16-ocean.dark
  line_numbers: false

# Contact form delivery. CONTACT_ENDPOINT and CONTACT_TOKEN override these.
contact:
  endpoint:
  token:

# Passed through to the page head. ENABLE_PWA and SITE_VERIFICATION override these.
pwa: false
site_verification:
"#;

const STYLESHEET: &str = r#"body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 52rem; padding: 0 1rem; line-height: 1.6; }
.site-header { display: flex; justify-content: space-between; align-items: center; padding: 1rem 0; }
.site-header nav a { margin-left: 1rem; }
.post-list { list-style: none; padding: 0; }
.post-card { margin-bottom: 2rem; }
.post-meta { color: #666; font-size: 0.9rem; }
.post-meta > * + *::before { content: " · "; }
.empty-state { padding: 2rem 0; }
.highlight pre { padding: 1rem; overflow-x: auto; border-radius: 4px; }
.highlight .line { display: block; }
.anchor { margin-left: -1.2rem; padding-right: 0.4rem; visibility: hidden; }
h2:hover .anchor, h3:hover .anchor { visibility: visible; }
.toc-level-3 { margin-left: 1rem; }
.post-nav { display: flex; justify-content: space-between; margin: 3rem 0; }
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    fs::create_dir_all(target_dir.join("content/blog"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;

    fs::write(&config_path, CONFIG_TEMPLATE)?;
    fs::write(target_dir.join("static/css/style.css"), STYLESHEET)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: "{}"
excerpt: The first post on this site.
category: General
---

Welcome! This post lives in `content/blog/hello-world.md`.

## Writing posts

Create a new post with:

```bash
folio new "My New Post"
```

Every post needs a `title`, `date` and `excerpt` in its front matter.
`category`, `author` and `image` are optional.

## Building the site

```bash
folio generate
folio server
```
"#,
        now.format("%Y-%m-%dT%H:%M:%S%:z")
    );

    fs::write(target_dir.join("content/blog/hello-world.md"), sample_post)?;
    tracing::debug!("Wrote sample post and stylesheet");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Folio;

    #[test]
    fn test_init_creates_buildable_site() {
        let tmp = tempfile::TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(folio.config.title, "My Portfolio");
        assert_eq!(folio.config.skills.len(), 2);

        let posts = folio.load_posts().unwrap();
        let post = posts.get("hello-world").unwrap();
        assert_eq!(post.category.as_deref(), Some("General"));
        assert!(post.headings.iter().any(|h| h.id == "writing-posts"));
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let tmp = tempfile::TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();
        assert!(init_site(tmp.path()).is_err());
    }
}
