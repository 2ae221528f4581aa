//! Helper functions shared by the views, sitemap and generator

mod date;
mod url;

pub use date::*;
pub use url::*;
