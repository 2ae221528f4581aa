//! Read-only views over the compiled post collection.
//!
//! Everything here is a pure function of the collection and a request
//! parameter, so it is shared by the static generator and the HTTP server.

pub mod detail;
pub mod listing;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{full_date, post_url, short_date};

pub use detail::{all_pages, find_post, resolve, DetailOutcome, NavPost, PostPage};
pub use listing::{
    categories, filter_posts, sort_by_date_desc, ListingQuery, ListingView, ALL_CATEGORIES,
};

/// Listing-card data for one post
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub date: String,
    pub display_date: String,
    pub read_time: String,
}

impl PostSummary {
    pub fn from_post(config: &SiteConfig, post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            url: post_url(config, &post.slug),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category.clone(),
            author: post.author.clone(),
            image: post.image.clone(),
            date: short_date(&post.date),
            display_date: full_date(&post.date),
            read_time: post.read_time.to_string(),
        }
    }
}
