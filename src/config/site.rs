//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,
    pub blog_path: String,

    // Directory
    pub content_dir: String,
    pub posts_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Landing page
    pub hero: String,
    pub skills: Vec<String>,
    pub tech_stack: Vec<String>,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub contact: ContactConfig,

    // Pass-through build toggles
    pub pwa: bool,
    pub site_verification: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            blog_path: "blog".to_string(),

            content_dir: "content".to_string(),
            posts_dir: "blog".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            hero: String::new(),
            skills: Vec::new(),
            tech_stack: Vec::new(),

            highlight: HighlightConfig::default(),
            contact: ContactConfig::default(),

            pwa: false,
            site_verification: None,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the router cannot serve
    pub fn validate(&self) -> Result<()> {
        if self.blog_path.trim().trim_matches('/').trim().is_empty() {
            anyhow::bail!("blog_path must not be empty; the site root is the home page");
        }
        Ok(())
    }

    /// Apply environment overrides on top of the file values
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ENABLE_PWA") {
            self.pwa = matches!(value.trim(), "1" | "true" | "yes");
        }
        if let Some(token) = lookup("SITE_VERIFICATION").filter(|t| !t.trim().is_empty()) {
            self.site_verification = Some(token);
        }
        if let Some(endpoint) = lookup("CONTACT_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            self.contact.endpoint = Some(endpoint);
        }
        if let Some(token) = lookup("CONTACT_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.contact.token = Some(token);
        }
    }

    /// URL path of the blog listing, always with leading and trailing slash
    pub fn blog_url_path(&self) -> String {
        let blog = self.blog_path.trim_matches('/');
        if blog.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", blog)
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_numbers: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
        }
    }
}

/// Contact form delivery configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Webhook that receives `{name, email, message}` as JSON
    pub endpoint: Option<String>,
    /// Sent as a bearer token when present
    pub token: Option<String>,
}
