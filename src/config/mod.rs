//! Configuration module

mod site;

pub use site::ContactConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
