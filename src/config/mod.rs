//! Configuration module

mod site;

pub use site::AnalyticsConfig;
pub use site::AuthorConfig;
pub use site::BlogConfig;
pub use site::HighlightConfig;
pub use site::Image;
pub use site::Logo;
pub use site::PageDefaults;
pub use site::PublisherConfig;
pub use site::SiteConfig;
pub use site::SocialConfig;
pub use site::TypeDefaults;
