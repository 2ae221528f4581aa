//! Single-post lookup

use serde::Serialize;

use super::listing::sort_by_date_desc;
use crate::config::SiteConfig;
use crate::content::{Heading, Post, PostCollection};
use crate::helpers::{full_date, post_url, short_date};

/// Result of resolving a slug
#[derive(Debug, Clone)]
pub enum DetailOutcome {
    Found(Box<PostPage>),
    NotFound { slug: String },
}

/// Link to a neighbouring post
#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

/// Rendered body plus the metadata shown around it
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub date: String,
    pub display_date: String,
    pub read_time: String,
    pub content: String,
    pub toc: Vec<Heading>,
    /// Older neighbour in date order
    pub prev_post: Option<NavPost>,
    /// Newer neighbour in date order
    pub next_post: Option<NavPost>,
}

/// Exact, case-sensitive match on the slug
pub fn find_post<'a>(posts: &'a PostCollection, slug: &str) -> Option<&'a Post> {
    posts.get(slug)
}

pub fn resolve(config: &SiteConfig, posts: &PostCollection, slug: &str) -> DetailOutcome {
    let Some(post) = find_post(posts, slug) else {
        return DetailOutcome::NotFound {
            slug: slug.to_string(),
        };
    };

    let sorted = sort_by_date_desc(posts);
    let page = match sorted.iter().position(|p| p.slug == post.slug) {
        Some(i) => page_at(config, &sorted, i),
        None => PostPage::build(config, post, None, None),
    };
    DetailOutcome::Found(Box::new(page))
}

/// Pages for every post, newest first, sorting the collection once
pub fn all_pages(config: &SiteConfig, posts: &PostCollection) -> Vec<PostPage> {
    let sorted = sort_by_date_desc(posts);
    (0..sorted.len())
        .map(|i| page_at(config, &sorted, i))
        .collect()
}

/// `sorted` is newest first, so the older neighbour sits at `i + 1`
fn page_at(config: &SiteConfig, sorted: &[&Post], i: usize) -> PostPage {
    let older = sorted.get(i + 1).copied();
    let newer = i.checked_sub(1).and_then(|j| sorted.get(j)).copied();
    PostPage::build(config, sorted[i], older, newer)
}

impl PostPage {
    pub fn build(
        config: &SiteConfig,
        post: &Post,
        older: Option<&Post>,
        newer: Option<&Post>,
    ) -> Self {
        let nav = |p: &Post| NavPost {
            title: p.title.clone(),
            url: post_url(config, &p.slug),
        };

        Self {
            slug: post.slug.clone(),
            url: post_url(config, &post.slug),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            category: post.category.clone(),
            image: post.image.clone(),
            date: short_date(&post.date),
            display_date: full_date(&post.date),
            read_time: post.read_time.to_string(),
            content: post.body.html.clone(),
            toc: post
                .headings
                .iter()
                .filter(|h| (2..=3).contains(&h.level))
                .cloned()
                .collect(),
            prev_post: older.map(&nav),
            next_post: newer.map(&nav),
        }
    }
}
