//! folio: a portfolio site and Markdown blog generator
//!
//! Posts under `content/blog` are compiled once into an immutable
//! [`content::PostCollection`], which feeds the static generator, the sitemap
//! and the development server. The server also accepts contact form
//! submissions and forwards them to a configured webhook.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod sitemap;
pub mod templates;
pub mod views;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main folio application
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
    /// Blog posts directory inside the content directory
    pub posts_dir: PathBuf,
    /// Static assets copied verbatim
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory, reading `_config.yml` when it
    /// exists and then the environment overrides
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let posts_dir = content_dir.join(&config.posts_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            posts_dir,
            static_dir,
            public_dir,
        }
    }

    /// Compile every post
    pub fn load_posts(&self) -> Result<content::PostCollection> {
        Ok(content::loader::ContentLoader::new(self).load_posts()?)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(
        &self,
        title: &str,
        slug: Option<&str>,
        category: Option<&str>,
    ) -> Result<PathBuf> {
        commands::new::create_post(self, title, slug, category)
    }
}
