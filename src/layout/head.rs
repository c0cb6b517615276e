//! `<head>` content: meta tags and links

use crate::config::SiteConfig;
use crate::content::{PageMeta, PageType};
use crate::hast::{h, Element};
use crate::helpers::date;

/// A `<meta>` tag; `name` and `property` may both be set
struct MetaTag {
    name: Option<&'static str>,
    property: Option<&'static str>,
    content: String,
}

impl MetaTag {
    fn name(name: &'static str, content: impl Into<String>) -> Self {
        Self {
            name: Some(name),
            property: None,
            content: content.into(),
        }
    }

    fn property(property: &'static str, content: impl Into<String>) -> Self {
        Self {
            name: None,
            property: Some(property),
            content: content.into(),
        }
    }

    fn both(name: &'static str, property: &'static str, content: impl Into<String>) -> Self {
        Self {
            name: Some(name),
            property: Some(property),
            content: content.into(),
        }
    }

    fn into_element(self) -> Element {
        let mut el = h("meta");
        if let Some(name) = self.name {
            el.set("name", name);
        }
        if let Some(property) = self.property {
            el.set("property", property);
        }
        el.attr("content", self.content)
    }
}

pub fn meta_tags(meta: &PageMeta, config: &SiteConfig) -> Vec<Element> {
    let mut tags = vec![MetaTag::name("author", meta.author.name.as_str())];

    if let Some(description) = &meta.description {
        tags.push(MetaTag::both(
            "description",
            "og:description",
            description.as_str(),
        ));
        tags.push(MetaTag::name("twitter:description", description.as_str()));
    }

    tags.push(MetaTag::property("og:url", meta.href.as_str()));
    tags.push(MetaTag::both("twitter:title", "og:title", meta.title.as_str()));

    if let Some(image) = &meta.image {
        tags.push(MetaTag::both(
            "twitter:image",
            "og:image",
            config.absolute(&image.src),
        ));
    }
    tags.push(MetaTag::name("twitter:card", "summary_large_image"));

    if let Some(handle) = &meta.author.twitter {
        tags.push(MetaTag::name("twitter:site", handle.as_str()));
        tags.push(MetaTag::name("twitter:creator", handle.as_str()));
    }
    tags.push(MetaTag::name("twitter:image:alt", meta.title.as_str()));

    match meta.page_type {
        PageType::Page | PageType::Reference => {
            tags.push(MetaTag::property("og:site_name", config.name.as_str()));
            tags.push(MetaTag::property("og:type", "website"));
        }
        PageType::Blog => {
            tags.push(MetaTag::property("og:site_name", config.blog.name.as_str()));
            tags.push(MetaTag::property("og:type", "website"));
        }
        PageType::Article | PageType::Scrap => {
            tags.push(MetaTag::property("og:site_name", config.blog.name.as_str()));
            tags.push(MetaTag::property("og:type", "article"));
            if let Some(published) = &meta.published {
                tags.push(MetaTag::property(
                    "article:published_time",
                    date::iso(published),
                ));
            }
            if let Some(modified) = &meta.modified {
                tags.push(MetaTag::property("article:modified_time", date::iso(modified)));
            }
        }
    }

    tags.into_iter().map(MetaTag::into_element).collect()
}

fn link(rel: &str, href: impl Into<String>) -> Element {
    h("link").attr("rel", rel).attr("href", href.into())
}

pub fn links(meta: &PageMeta, config: &SiteConfig) -> Vec<Element> {
    let mut links = vec![link("canonical", meta.href.as_str())];
    links.extend(
        meta.stylesheets
            .iter()
            .map(|href| link("stylesheet", href.as_str())),
    );
    links.push(link("icon", "/favicon.ico").attr("sizes", "any"));
    if let Some(logo) = meta.logo.as_ref().filter(|l| l.src.ends_with(".svg")) {
        links.push(link("icon", config.absolute(&logo.src)).attr("type", "image/svg+xml"));
    }
    links.push(link("apple-touch-icon", "/apple-touch-icon.png"));
    links.push(link("manifest", "/manifest.json"));
    links.push(
        link("alternate", config.feed_href())
            .attr("type", "application/rss+xml")
            .attr("title", config.blog.feed_title()),
    );
    links.push(link("prefetch", config.blog.pathname.as_str()));
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Document;
    use crate::hast::{render_fragment, Root};

    fn article(config: &SiteConfig) -> PageMeta {
        Document::parse(
            "articles/a.md".into(),
            "content/articles/a.md".into(),
            "---\ndescription: About things\npublished: 2024-01-05\nimage: /img/a.png\n---\n# Things\n",
            config,
        )
        .unwrap()
        .meta
    }

    fn html(elements: Vec<Element>) -> String {
        render_fragment(&Root::new(elements.into_iter().map(Into::into).collect()))
    }

    #[test]
    fn test_article_meta_tags() {
        let mut config = SiteConfig::default();
        config.author.twitter = Some("@someone".to_string());
        let out = html(meta_tags(&article(&config), &config));

        assert!(out.contains(r#"<meta name="description" property="og:description" content="About things">"#));
        assert!(out.contains(r#"<meta name="twitter:title" property="og:title" content="Things">"#));
        assert!(out.contains(r#"<meta name="twitter:image" property="og:image" content="https://example.org/img/a.png">"#));
        assert!(out.contains(r#"<meta name="twitter:creator" content="@someone">"#));
        assert!(out.contains(r#"<meta property="og:type" content="article">"#));
        assert!(out.contains(
            r#"<meta property="article:published_time" content="2024-01-05T00:00:00.000Z">"#
        ));
        assert!(!out.contains("article:modified_time"));
    }

    #[test]
    fn test_links() {
        let config = SiteConfig::default();
        let out = html(links(&article(&config), &config));
        assert!(out.starts_with(r#"<link rel="canonical" href="https://example.org/articles/a">"#));
        assert!(out.contains(r#"<link rel="stylesheet" href="/css/terminal.css">"#));
        assert!(out.contains(r#"<link rel="icon" href="https://example.org/img/logo.svg" type="image/svg+xml">"#));
        assert!(out.contains(r#"<link rel="alternate" href="https://example.org/blog/feed.xml" type="application/rss+xml" title="Blog feed">"#));
        assert!(out.ends_with(r#"<link rel="prefetch" href="/blog">"#));
    }
}
