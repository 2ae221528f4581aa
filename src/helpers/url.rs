//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/site/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/blog/") // -> "https://example.com/blog/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    absolute_url(config, &url_for(config, path))
}

/// Prefix a path that already carries the root (from `url_for`, `post_url`)
/// with the site URL
pub fn absolute_url(config: &SiteConfig, rooted: &str) -> String {
    format!("{}{}", config.url.trim_end_matches('/'), rooted)
}

/// Path of the blog listing, e.g. `/blog/`
pub fn blog_url(config: &SiteConfig) -> String {
    url_for(config, &config.blog_url_path())
}

/// Path of a post detail page, e.g. `/blog/2024/intro/`
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    format!("{}{}/", blog_url(config), encode_slug(slug))
}

/// Percent-encode each segment of a slug, keeping the `/` separators
pub fn encode_slug(slug: &str) -> String {
    slug.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Encode a query-string value
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com/".to_string();
        config.root = "/site/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/site/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/site/about/");
        assert_eq!(url_for(&config, ""), "/site/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/blog/"),
            "https://example.com/site/blog/"
        );
        assert_eq!(
            absolute_url(&config, &post_url(&config, "intro")),
            "https://example.com/site/blog/intro/"
        );
    }

    #[test]
    fn test_post_url() {
        let config = SiteConfig::default();
        assert_eq!(blog_url(&config), "/blog/");
        assert_eq!(post_url(&config, "hello-world"), "/blog/hello-world/");
        assert_eq!(post_url(&config, "2024/my post"), "/blog/2024/my%20post/");
    }

    #[test]
    fn test_encode_query_value() {
        assert_eq!(encode_query_value("rust & c++"), "rust%20%26%20c%2B%2B");
    }
}
