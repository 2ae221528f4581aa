//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::Folio;

/// Write a new post skeleton into the posts directory and return its path.
///
/// The file name is `slug` when given, otherwise the slugified title. Nested
/// slugs such as `2024/launch` create the intermediate directories.
pub fn create_post(
    folio: &Folio,
    title: &str,
    slug: Option<&str>,
    category: Option<&str>,
) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => s.trim_matches('/').to_string(),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let file_path = folio.posts_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        title: title.to_string(),
        date: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        excerpt: String::new(),
        category: category.map(str::to_string),
        author: None,
        image: None,
    };
    let yaml = serde_yaml::to_string(&front_matter)?;
    let content = format!("---\n{}---\n\n", yaml);

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
