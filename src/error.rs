//! Error types for content compilation and contact delivery

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while compiling the content directory.
///
/// Every variant is fatal: a build that hits one of these publishes nothing.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} has no front-matter block (expected a leading `---` line and a closing `---`)")]
    MissingFrontMatter { path: PathBuf },

    #[error("invalid front-matter in {path:?}: {source}")]
    InvalidFrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid date {value:?} in {path:?}")]
    InvalidDate { path: PathBuf, value: String },

    #[error("slug {slug:?} is used by both {first:?} and {second:?}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Errors raised by the contact handler.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0}")]
    Invalid(String),

    #[error("contact delivery is not configured")]
    NotConfigured,

    #[error("failed to reach the delivery service: {0}")]
    Delivery(#[from] reqwest::Error),

    #[error("delivery service rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}
