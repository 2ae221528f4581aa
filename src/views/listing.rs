//! Searchable, filterable post listing

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::PostSummary;
use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{blog_url, encode_query_value};

/// Category value that disables the category filter
pub const ALL_CATEGORIES: &str = "all";

/// Search text and category selection of one listing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    pub search: String,
    pub category: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl ListingQuery {
    pub fn new(search: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            category: category.into(),
        }
    }

    /// Back to `("", "all")`
    pub fn reset() -> Self {
        Self::default()
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Trim the search text and treat a blank category as "all"
    pub fn normalize(mut self) -> Self {
        self.search = self.search.trim().to_string();
        if self.category.trim().is_empty() {
            self.category = ALL_CATEGORIES.to_string();
        }
        self
    }

    /// Case-insensitive substring search over title and excerpt, AND the
    /// category filter. The body is not searched.
    pub fn matches(&self, post: &Post) -> bool {
        let search_ok = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            post.title.to_lowercase().contains(&needle)
                || post.excerpt.to_lowercase().contains(&needle)
        };

        let category_ok = self.category == ALL_CATEGORIES
            || post.category.as_deref() == Some(self.category.as_str());

        search_ok && category_ok
    }

    /// `?search=...&category=...`, empty for the default query
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if !self.search.is_empty() {
            params.push(format!("search={}", encode_query_value(&self.search)));
        }
        if self.category != ALL_CATEGORIES {
            params.push(format!("category={}", encode_query_value(&self.category)));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

/// Newest first; posts with equal dates keep their incoming order
pub fn sort_by_date_desc<'a, I>(posts: I) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut sorted: Vec<&Post> = posts.into_iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Posts matching `query`, newest first
pub fn filter_posts<'a, I>(posts: I, query: &ListingQuery) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    sort_by_date_desc(posts.into_iter().filter(|post| query.matches(post)))
}

/// Distinct non-empty categories
pub fn categories<'a, I>(posts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .filter_map(|post| post.category.as_deref())
        .filter(|category| !category.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Everything the listing page renders
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub posts: Vec<PostSummary>,
    pub categories: Vec<String>,
    pub query: ListingQuery,
    pub total: usize,
    pub is_empty: bool,
    /// Link that clears search and category
    pub reset_url: String,
}

impl ListingView {
    pub fn build<'a, I>(config: &SiteConfig, posts: I, query: ListingQuery) -> Self
    where
        I: IntoIterator<Item = &'a Post>,
        I::IntoIter: Clone,
    {
        let posts = posts.into_iter();
        let total = posts.clone().count();
        let categories = categories(posts.clone()).into_iter().collect();
        let matching: Vec<PostSummary> = filter_posts(posts, &query)
            .into_iter()
            .map(|post| PostSummary::from_post(config, post))
            .collect();

        Self {
            is_empty: matching.is_empty(),
            posts: matching,
            categories,
            total,
            reset_url: format!("{}{}", blog_url(config), ListingQuery::reset().to_query_string()),
            query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{test_post, PostCollection};

    fn post(slug: &str, date: &str, title: &str, excerpt: &str, category: Option<&str>) -> Post {
        let mut post = test_post(slug, date);
        post.title = title.to_string();
        post.excerpt = excerpt.to_string();
        post.category = category.map(str::to_string);
        post
    }

    fn sample() -> PostCollection {
        PostCollection::from_posts(vec![
            post("b", "2024-02-01T00:00:00", "Borrow checker tales", "Lifetimes explained", Some("Rust")),
            post("a", "2025-01-01T00:00:00", "Async in practice", "Tokio and friends", Some("Rust")),
            post("c", "2023-06-01T00:00:00", "CSS grids", "Layout without tears", Some("Web")),
            post("d", "2024-02-01T00:00:00", "Notes", "Misc thoughts on ASYNC", None),
        ])
        .unwrap()
    }

    fn slugs(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_default_query_returns_everything_newest_first() {
        let posts = sample();
        let result = filter_posts(&posts, &ListingQuery::default());
        assert_eq!(slugs(&result), vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let posts = sample();
        let sorted = sort_by_date_desc(&posts);
        for pair in sorted.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
        // b and d share a date; b was discovered first
        let b = sorted.iter().position(|p| p.slug == "b").unwrap();
        let d = sorted.iter().position(|p| p.slug == "d").unwrap();
        assert!(b < d);
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_excerpt() {
        let posts = sample();
        let result = filter_posts(&posts, &ListingQuery::new("async", ALL_CATEGORIES));
        assert_eq!(slugs(&result), vec!["a", "d"]);

        let result = filter_posts(&posts, &ListingQuery::new("LIFETIMES", ALL_CATEGORIES));
        assert_eq!(slugs(&result), vec!["b"]);

        // Body text is not searched
        let result = filter_posts(&posts, &ListingQuery::new("Body", ALL_CATEGORIES));
        assert!(result.is_empty());
    }

    #[test]
    fn test_category_filter_combines_with_search() {
        let posts = sample();
        let result = filter_posts(&posts, &ListingQuery::new("", "Rust"));
        assert_eq!(slugs(&result), vec!["a", "b"]);

        let result = filter_posts(&posts, &ListingQuery::new("async", "Rust"));
        assert_eq!(slugs(&result), vec!["a"]);

        let result = filter_posts(&posts, &ListingQuery::new("", "rust"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let posts = sample();
        let query = ListingQuery::new("t", "Rust");
        let once = filter_posts(&posts, &query);
        let twice = filter_posts(once.iter().copied(), &query);
        assert_eq!(slugs(&once), slugs(&twice));
    }

    #[test]
    fn test_categories_facet() {
        let posts = sample();
        let facet: Vec<_> = categories(&posts).into_iter().collect();
        assert_eq!(facet, vec!["Rust", "Web"]);
    }

    #[test]
    fn test_empty_result_offers_reset() {
        let posts = sample();
        let config = SiteConfig::default();
        let view = ListingView::build(&config, &posts, ListingQuery::new("nothing matches", "Web"));
        assert!(view.is_empty);
        assert_eq!(view.total, 4);
        assert_eq!(view.reset_url, "/blog/");
        assert_eq!(view.categories, vec!["Rust", "Web"]);
        assert!(ListingQuery::reset().is_default());
    }

    #[test]
    fn test_normalize_blank_values() {
        let query = ListingQuery::new("  rust  ", " ").normalize();
        assert_eq!(query, ListingQuery::new("rust", ALL_CATEGORIES));
        assert!(ListingQuery::new("", "").normalize().is_default());
    }

    #[test]
    fn test_query_string() {
        assert_eq!(ListingQuery::default().to_query_string(), "");
        assert_eq!(
            ListingQuery::new("tokio tips", "Rust").to_query_string(),
            "?search=tokio%20tips&category=Rust"
        );
    }
}
