//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::PageType;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub name: String,
    pub host: String,
    pub language: String,
    pub author: AuthorConfig,
    pub publisher: PublisherConfig,
    pub same_as: Vec<String>,

    // Blog & feed
    pub blog: BlogConfig,

    // Directory
    pub content_dir: String,
    pub output_dir: String,
    /// Glob patterns (relative to content_dir) that are neither rendered nor copied
    pub exclude: Vec<String>,

    // Writing
    pub render_drafts: bool,
    /// Prompt owner recognised in `shell` code blocks
    pub shell_user: String,
    pub highlight: HighlightConfig,

    // Enrichment
    pub analytics: Option<AnalyticsConfig>,
    pub speculation_rules: bool,
    pub origin_trial: Option<String>,
    /// Links that identify the author (get rel="me")
    pub me_links: Vec<String>,
    pub social: SocialConfig,
    pub sprites: String,

    // Per page type defaults
    pub defaults: TypeDefaults,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "My Site".to_string(),
            host: "https://example.org".to_string(),
            language: "en".to_string(),
            author: AuthorConfig::default(),
            publisher: PublisherConfig::default(),
            same_as: Vec::new(),

            blog: BlogConfig::default(),

            content_dir: "content".to_string(),
            output_dir: "dist".to_string(),
            exclude: Vec::new(),

            render_drafts: false,
            shell_user: "user".to_string(),
            highlight: HighlightConfig::default(),

            analytics: None,
            speculation_rules: true,
            origin_trial: None,
            me_links: Vec::new(),
            social: SocialConfig::default(),
            sprites: "/img/sprites.svg".to_string(),

            defaults: TypeDefaults::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Host without trailing slash
    pub fn host(&self) -> &str {
        self.host.trim_end_matches('/')
    }

    /// Absolute URL for a site pathname
    pub fn absolute(&self, pathname: &str) -> String {
        if pathname.starts_with("http://") || pathname.starts_with("https://") {
            return pathname.to_string();
        }
        format!("{}/{}", self.host(), pathname.trim_start_matches('/'))
            .trim_end_matches('/')
            .to_string()
    }

    pub fn blog_href(&self) -> String {
        self.absolute(&self.blog.pathname)
    }

    pub fn feed_href(&self) -> String {
        self.absolute(&self.blog.feed_pathname)
    }

    /// Defaults for a page type: the `page` defaults overlaid with the
    /// type-specific values that are set
    pub fn defaults_for(&self, page_type: PageType) -> PageDefaults {
        let base = &self.defaults.page;
        let specific = match page_type {
            PageType::Page => return base.clone(),
            PageType::Blog => &self.defaults.blog,
            PageType::Article => &self.defaults.article,
            PageType::Scrap => &self.defaults.scrap,
            PageType::Reference => &self.defaults.reference,
        };

        PageDefaults {
            stylesheets: pick_list(&specific.stylesheets, &base.stylesheets),
            scripts: pick_list(&specific.scripts, &base.scripts),
            logo: specific.logo.clone().or_else(|| base.logo.clone()),
            image: specific.image.clone().or_else(|| base.image.clone()),
        }
    }
}

fn pick_list(specific: &[String], base: &[String]) -> Vec<String> {
    if specific.is_empty() {
        base.to_vec()
    } else {
        specific.to_vec()
    }
}

/// Author of the site content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub href: String,
    /// Twitter handle including the leading `@`
    pub twitter: Option<String>,
    /// Shown as the feed item author, `email (name)`
    pub email: Option<String>,
}

impl AuthorConfig {
    /// RSS `<author>` value; RSS requires an email address
    pub fn rss(&self) -> Option<String> {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty())
            .map(|email| format!("{} ({})", email, self.name))
    }
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            href: "/".to_string(),
            twitter: None,
            email: None,
        }
    }
}

/// Publisher, used for structured data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub name: String,
    pub href: String,
    pub logo: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            name: "My Site".to_string(),
            href: "https://example.org".to_string(),
            logo: "/img/logo-512x512.png".to_string(),
        }
    }
}

/// Blog section and its RSS feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub name: String,
    pub description: String,
    pub pathname: String,
    pub feed_pathname: String,
    pub feed_title: Option<String>,
    pub categories: Vec<String>,
    pub copyright: Option<String>,
    /// Maximum number of feed items (all when unset)
    pub feed_limit: Option<usize>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            name: "Blog".to_string(),
            description: String::new(),
            pathname: "/blog".to_string(),
            feed_pathname: "/blog/feed.xml".to_string(),
            feed_title: None,
            categories: Vec::new(),
            copyright: None,
            feed_limit: None,
        }
    }
}

impl BlogConfig {
    pub fn feed_title(&self) -> String {
        self.feed_title
            .clone()
            .unwrap_or_else(|| format!("{} feed", self.name))
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// Languages that get highlighted; others stay untouched
    pub subset: Vec<String>,
    /// Languages rendered as plain text
    pub plain_text: Vec<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            subset: [
                "javascript",
                "typescript",
                "json",
                "css",
                "html",
                "yaml",
                "bash",
                "shell",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            plain_text: vec!["txt".to_string()],
        }
    }
}

/// Privacy-friendly analytics script and its noscript pixel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub script: String,
    pub noscript: Option<String>,
}

/// Links shown in the footer of blog pages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Repository holding the site content
    pub source: Option<String>,
    pub mastodon: Option<String>,
    pub twitter: Option<String>,
    pub stats: Option<String>,
}

/// Logo shown in the page header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    pub src: String,
    pub href: String,
    pub alt: String,
}

/// Image used for social cards and structured data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Defaults applied to pages of one type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDefaults {
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
    pub logo: Option<Logo>,
    pub image: Option<Image>,
}

/// Defaults keyed by page type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDefaults {
    pub page: PageDefaults,
    pub blog: PageDefaults,
    pub article: PageDefaults,
    pub scrap: PageDefaults,
    pub reference: PageDefaults,
}

impl Default for TypeDefaults {
    fn default() -> Self {
        let stylesheets: Vec<String> = [
            "/css/fonts.css",
            "/css/stylesheet.css",
            "/css/theme-switch.css",
            "/css/search.css",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut article_stylesheets = stylesheets.clone();
        article_stylesheets.push("/css/highlight.css".to_string());
        article_stylesheets.push("/css/terminal.css".to_string());

        let article = PageDefaults {
            stylesheets: article_stylesheets,
            logo: Some(Logo {
                src: "/img/logo.svg".to_string(),
                href: "/blog".to_string(),
                alt: "Blog".to_string(),
            }),
            ..Default::default()
        };

        Self {
            page: PageDefaults {
                stylesheets,
                scripts: vec!["/js/theme-switch.js".to_string(), "/js/search.js".to_string()],
                logo: Some(Logo {
                    src: "/img/logo.svg".to_string(),
                    href: "/".to_string(),
                    alt: "Home".to_string(),
                }),
                image: Some(Image {
                    src: "/img/logo-512x512.png".to_string(),
                    alt: String::new(),
                }),
            },
            blog: PageDefaults::default(),
            article: article.clone(),
            scrap: article,
            reference: PageDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.output_dir, "dist");
        assert_eq!(config.blog.feed_pathname, "/blog/feed.xml");
        assert!(config.analytics.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
name: WebPro
host: https://www.webpro.nl/
author:
  name: Lars
  href: https://www.webpro.nl
blog:
  name: Frontend Ramblings
  feed_limit: 10
analytics:
  script: https://stats.example.org/latest.js
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "WebPro");
        assert_eq!(config.author.name, "Lars");
        assert_eq!(config.blog.name, "Frontend Ramblings");
        assert_eq!(config.blog.feed_limit, Some(10));
        // untouched sections keep their defaults
        assert_eq!(config.blog.pathname, "/blog");
        assert_eq!(config.blog_href(), "https://www.webpro.nl/blog");
        assert!(config.analytics.unwrap().noscript.is_none());
    }

    #[test]
    fn test_absolute() {
        let config = SiteConfig::default();
        assert_eq!(config.absolute("/"), "https://example.org");
        assert_eq!(config.absolute("/about"), "https://example.org/about");
        assert_eq!(
            config.absolute("https://cdn.example.org/a.png"),
            "https://cdn.example.org/a.png"
        );
    }

    #[test]
    fn test_defaults_for_type() {
        let config = SiteConfig::default();
        let page = config.defaults_for(PageType::Page);
        let article = config.defaults_for(PageType::Article);
        let blog = config.defaults_for(PageType::Blog);

        assert!(article.stylesheets.len() > page.stylesheets.len());
        assert_eq!(article.logo.unwrap().href, "/blog");
        // scripts fall back to the page defaults
        assert_eq!(article.scripts, page.scripts);
        assert_eq!(blog.logo, page.logo);
    }
}
