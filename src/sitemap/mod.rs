//! Sitemap and robots.txt generation

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

use crate::config::SiteConfig;
use crate::content::PostCollection;
use crate::helpers::{absolute_url, blog_url, date_xml, full_url_for, post_url};

/// How often a URL is expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeFrequency::Weekly => f.write_str("weekly"),
            ChangeFrequency::Monthly => f.write_str("monthly"),
        }
    }
}

/// One `<url>` of the sitemap
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: Option<DateTime<FixedOffset>>,
    pub change_frequency: ChangeFrequency,
    /// Between 0.0 and 1.0
    pub priority: f32,
}

const HOME_PRIORITY: f32 = 1.0;
const LISTING_PRIORITY: f32 = 0.8;
const POST_PRIORITY: f32 = 0.7;

/// Home page, listing page, then one entry per post in collection order.
///
/// The static pages take the newest post date as their last modification, so
/// the same collection always yields the same sitemap.
pub fn entries(config: &SiteConfig, posts: &PostCollection) -> Vec<SitemapEntry> {
    let newest = posts.newest_date();

    let mut entries = vec![
        SitemapEntry {
            url: full_url_for(config, "/"),
            last_modified: newest,
            change_frequency: ChangeFrequency::Monthly,
            priority: HOME_PRIORITY,
        },
        SitemapEntry {
            url: absolute_url(config, &blog_url(config)),
            last_modified: newest,
            change_frequency: ChangeFrequency::Weekly,
            priority: LISTING_PRIORITY,
        },
    ];

    entries.extend(posts.iter().map(|post| SitemapEntry {
        url: absolute_url(config, &post_url(config, &post.slug)),
        last_modified: Some(post.date),
        change_frequency: ChangeFrequency::Monthly,
        priority: POST_PRIORITY,
    }));

    entries
}

/// Serialize entries as a sitemaps.org `urlset`
pub fn to_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.url)));
        if let Some(date) = &entry.last_modified {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", date_xml(date)));
        }
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.change_frequency
        ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// robots.txt allowing everything and pointing at the sitemap
pub fn robots_txt(config: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        full_url_for(config, "/sitemap.xml")
    )
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
