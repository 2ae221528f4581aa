//! List site content

use anyhow::Result;
use std::collections::BTreeMap;

use crate::content::PostCollection;
use crate::helpers::{post_url, short_date};
use crate::sitemap;
use crate::views::sort_by_date_desc;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let posts = folio.load_posts()?;

    let lines = match content_type {
        "post" | "posts" => post_lines(folio, &posts),
        "category" | "categories" => category_lines(&posts),
        "route" | "routes" => route_lines(folio, &posts),
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category, route",
                content_type
            );
        }
    };

    for line in lines {
        println!("{}", line);
    }

    Ok(())
}

fn post_lines(folio: &Folio, posts: &PostCollection) -> Vec<String> {
    let mut lines = vec![format!("Posts ({}):", posts.len())];
    for post in sort_by_date_desc(posts) {
        lines.push(format!(
            "  {} - {} [{}] {}",
            short_date(&post.date),
            post.title,
            post.read_time,
            post_url(&folio.config, &post.slug)
        ));
    }
    lines
}

fn category_lines(posts: &PostCollection) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for post in posts {
        if let Some(category) = post.category.as_deref() {
            *counts.entry(category).or_insert(0) += 1;
        }
    }

    let mut lines = vec![format!("Categories ({}):", counts.len())];
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    for (category, count) in counts {
        lines.push(format!("  {} ({})", category, count));
    }
    lines
}

fn route_lines(folio: &Folio, posts: &PostCollection) -> Vec<String> {
    let entries = sitemap::entries(&folio.config, posts);
    let mut lines = vec![format!("Routes ({}):", entries.len())];
    lines.extend(entries.into_iter().map(|entry| format!("  {}", entry.url)));
    lines
}
