//! The compiled, read-only post table

use chrono::{DateTime, FixedOffset};
use indexmap::map::Entry;
use indexmap::IndexMap;

use super::Post;
use crate::error::ContentError;

/// All posts of a build, keyed by slug.
///
/// Iteration follows file discovery order, which is not chronological;
/// callers that need date order sort explicitly.
#[derive(Debug, Clone, Default)]
pub struct PostCollection {
    posts: IndexMap<String, Post>,
}

impl PostCollection {
    /// Build the table, rejecting duplicate slugs
    pub fn from_posts(posts: Vec<Post>) -> Result<Self, ContentError> {
        let mut map: IndexMap<String, Post> = IndexMap::with_capacity(posts.len());

        for post in posts {
            match map.entry(post.slug.clone()) {
                Entry::Occupied(existing) => {
                    return Err(ContentError::DuplicateSlug {
                        slug: post.slug,
                        first: existing.get().source.clone(),
                        second: post.source,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(post);
                }
            }
        }

        Ok(Self { posts: map })
    }

    /// Exact, case-sensitive slug lookup
    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.get(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Date of the most recent post
    pub fn newest_date(&self) -> Option<DateTime<FixedOffset>> {
        self.posts.values().map(|p| p.date).max()
    }
}

impl<'a> IntoIterator for &'a PostCollection {
    type Item = &'a Post;
    type IntoIter = indexmap::map::Values<'a, String, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.values()
    }
}
