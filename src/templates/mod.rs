//! Built-in site templates using the Tera template engine
//!
//! The templates are embedded in the binary, so a site directory only needs
//! content and static assets.

use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostCollection;
use crate::helpers::{blog_url, url_for};
use crate::views::{sort_by_date_desc, ListingView, PostPage, PostSummary};

/// Posts shown on the landing page
const RECENT_POSTS: usize = 3;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("listing.html", include_str!("site/listing.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Landing page: hero, skills, tech stack, latest posts and contact form
    pub fn render_home(&self, config: &SiteConfig, posts: &PostCollection) -> Result<String> {
        let home = HomeData {
            hero: config.hero.clone(),
            skills: config.skills.clone(),
            tech_stack: config.tech_stack.clone(),
            recent_posts: sort_by_date_desc(posts)
                .into_iter()
                .take(RECENT_POSTS)
                .map(|post| PostSummary::from_post(config, post))
                .collect(),
        };

        let mut context = base_context(config);
        context.insert("home", &home);
        self.render("home.html", &context)
    }

    pub fn render_listing(&self, config: &SiteConfig, listing: &ListingView) -> Result<String> {
        let mut context = base_context(config);
        context.insert("listing", listing);
        self.render("listing.html", &context)
    }

    pub fn render_post(&self, config: &SiteConfig, page: &PostPage) -> Result<String> {
        let mut context = base_context(config);
        context.insert("page", page);
        self.render("post.html", &context)
    }

    /// 404 page; `slug` is the post that was asked for, if any
    pub fn render_not_found(&self, config: &SiteConfig, slug: Option<&str>) -> Result<String> {
        let mut context = base_context(config);
        context.insert("slug", &slug);
        self.render("not_found.html", &context)
    }
}

/// Site-wide values every page needs
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub home_url: String,
    pub blog_url: String,
    pub contact_url: String,
    pub sitemap_url: String,
    pub stylesheet_url: String,
    pub manifest_url: String,
    pub pwa: bool,
    pub site_verification: Option<String>,
    pub year: i32,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            home_url: url_for(config, "/"),
            blog_url: blog_url(config),
            contact_url: url_for(config, "/api/contact"),
            sitemap_url: url_for(config, "/sitemap.xml"),
            stylesheet_url: url_for(config, "/css/style.css"),
            manifest_url: url_for(config, "/manifest.webmanifest"),
            pwa: config.pwa,
            site_verification: config.site_verification.clone(),
            year: chrono::Utc::now().year(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct HomeData {
    hero: String,
    skills: Vec<String>,
    tech_stack: Vec<String>,
    recent_posts: Vec<PostSummary>,
}

fn base_context(config: &SiteConfig) -> Context {
    let mut context = Context::new();
    context.insert("site", &SiteData::from_config(config));
    context
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}...", truncated.trim_end())))
    }
}
