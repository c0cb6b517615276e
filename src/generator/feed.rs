//! RSS 2.0 feed of the blog

use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::content::PageMeta;
use crate::hast::{self, find_element, Visit};
use crate::helpers::{date, escape_xml, strip_invalid_xml_chars};

const XML_NS_CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";
const XML_NS_ATOM: &str = "http://www.w3.org/2005/Atom";
const GENERATOR: &str = concat!("ramblings ", env!("CARGO_PKG_VERSION"));

/// A feed entry with its rendered body
pub struct FeedItem<'a> {
    pub meta: &'a PageMeta,
    pub content: String,
}

/// Rewrite root-relative `href` and `src` attributes to absolute URLs
pub fn absolutize(tree: &mut hast::Root, config: &SiteConfig) {
    let is_relative = |value: Option<String>| {
        value
            .map(|v| v.starts_with('/') && !v.starts_with("//"))
            .unwrap_or(false)
    };
    find_element(
        tree,
        |el| is_relative(el.get_str("href")) || is_relative(el.get_str("src")),
        |children, index| {
            if let Some(el) = children[index].as_element_mut() {
                for name in ["href", "src"] {
                    if let Some(value) = el.get_str(name).filter(|v| v.starts_with('/')) {
                        el.set(name, config.absolute(&value));
                    }
                }
            }
            Visit::Continue
        },
    );
}

fn tag(out: &mut String, indent: &str, name: &str, value: &str) {
    out.push_str(&format!(
        "{}<{}>{}</{}>\n",
        indent,
        name,
        escape_xml(&strip_invalid_xml_chars(value)),
        name
    ));
}

/// Keep a CDATA section intact when the content contains its terminator
fn cdata(content: &str) -> String {
    format!(
        "<![CDATA[{}]]>",
        strip_invalid_xml_chars(content).replace("]]>", "]]]]><![CDATA[>")
    )
}

fn last_build_date(items: &[FeedItem]) -> DateTime<Utc> {
    items
        .iter()
        .filter_map(|item| item.meta.modified.max(item.meta.published))
        .max()
        .unwrap_or_else(Utc::now)
}

/// Render the feed document
pub fn render(config: &SiteConfig, items: &[FeedItem]) -> String {
    let blog = &config.blog;
    let blog_href = config.blog_href();
    let feed_href = config.feed_href();
    let description = if blog.description.is_empty() {
        &blog.name
    } else {
        &blog.description
    };

    let mut feed = String::new();
    feed.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    feed.push_str(&format!(
        "<rss version=\"2.0\" xmlns:content=\"{}\" xmlns:atom=\"{}\">\n",
        XML_NS_CONTENT, XML_NS_ATOM
    ));
    feed.push_str("  <channel>\n");
    tag(&mut feed, "    ", "title", &blog.name);
    feed.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape_xml(&feed_href)
    ));
    tag(&mut feed, "    ", "description", description);
    tag(&mut feed, "    ", "link", &blog_href);
    if let Some(copyright) = &blog.copyright {
        tag(&mut feed, "    ", "copyright", copyright);
    }
    tag(&mut feed, "    ", "language", &config.language);
    tag(
        &mut feed,
        "    ",
        "lastBuildDate",
        &date::rfc2822(&last_build_date(items)),
    );
    tag(&mut feed, "    ", "generator", GENERATOR);
    for category in &blog.categories {
        tag(&mut feed, "    ", "category", category);
    }
    feed.push_str("    <image>\n");
    tag(&mut feed, "      ", "url", &config.absolute(&config.publisher.logo));
    tag(&mut feed, "      ", "title", &blog.name);
    tag(&mut feed, "      ", "link", &blog_href);
    feed.push_str("    </image>\n");

    for item in items {
        let meta = item.meta;
        feed.push_str("    <item>\n");
        tag(&mut feed, "      ", "title", &meta.title);
        tag(&mut feed, "      ", "link", &meta.href);
        tag(&mut feed, "      ", "guid", &meta.href);
        if let Some(description) = &meta.description {
            tag(&mut feed, "      ", "description", description);
        }
        if let Some(published) = &meta.published {
            tag(&mut feed, "      ", "pubDate", &date::rfc2822(published));
        }
        if let Some(author) = meta.author.rss() {
            tag(&mut feed, "      ", "author", &author);
        }
        for category in &meta.tags {
            tag(&mut feed, "      ", "category", category);
        }
        feed.push_str(&format!(
            "      <source url=\"{}\">{}</source>\n",
            escape_xml(&feed_href),
            escape_xml(&blog.name)
        ));
        feed.push_str(&format!(
            "      <content:encoded>{}</content:encoded>\n",
            cdata(&item.content)
        ));
        feed.push_str("    </item>\n");
    }

    feed.push_str("  </channel>\n");
    feed.push_str("</rss>\n");
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Document;
    use crate::hast::{h, render_fragment};

    fn meta(path: &str, content: &str, config: &SiteConfig) -> PageMeta {
        Document::parse(path.into(), path.into(), content, config)
            .unwrap()
            .meta
    }

    #[test]
    fn test_absolutize() {
        let config = SiteConfig::default();
        let mut tree = hast::Root::new(vec![h("p")
            .child(h("a").attr("href", "/articles/b").text("b"))
            .child(h("img").attr("src", "/img/x.png"))
            .child(h("a").attr("href", "https://other.org/").text("o"))
            .child(h("a").attr("href", "#top").text("t"))
            .into()]);
        absolutize(&mut tree, &config);
        assert_eq!(
            render_fragment(&tree),
            concat!(
                r#"<p><a href="https://example.org/articles/b">b</a>"#,
                r#"<img src="https://example.org/img/x.png">"#,
                r##"<a href="https://other.org/">o</a><a href="#top">t</a></p>"##
            )
        );
    }

    #[test]
    fn test_cdata_terminator() {
        assert_eq!(cdata("a]]>b\u{1}"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn test_render() {
        let mut config = SiteConfig::default();
        config.blog.name = "Ramblings & Scraps".to_string();
        config.blog.categories = vec!["frontend".to_string()];
        config.blog.copyright = Some("Copyright 2024".to_string());

        let article = meta(
            "articles/a.md",
            "---\ndescription: First <one>\npublished: 2024-01-05\ntags: rust\n---\n# A\n",
            &config,
        );
        let items = vec![FeedItem {
            meta: &article,
            content: "<p>Body</p>".to_string(),
        }];
        let xml = render(&config, &items);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<rss version=\"2.0\" xmlns:content=\"http://purl.org/rss/1.0/modules/content/\" xmlns:atom=\"http://www.w3.org/2005/Atom\">"));
        assert!(xml.contains("<title>Ramblings &amp; Scraps</title>"));
        assert!(xml.contains(r#"<atom:link href="https://example.org/blog/feed.xml" rel="self" type="application/rss+xml"/>"#));
        assert!(xml.contains("<link>https://example.org/blog</link>"));
        assert!(xml.contains("<copyright>Copyright 2024</copyright>"));
        assert!(xml.contains("<lastBuildDate>Fri, 05 Jan 2024 00:00:00 GMT</lastBuildDate>"));
        assert!(xml.contains("<category>frontend</category>"));
        assert!(xml.contains("<url>https://example.org/img/logo-512x512.png</url>"));
        assert!(xml.contains("<guid>https://example.org/articles/a</guid>"));
        assert!(xml.contains("<description>First &lt;one&gt;</description>"));
        assert!(xml.contains("<pubDate>Fri, 05 Jan 2024 00:00:00 GMT</pubDate>"));
        assert!(xml.contains("<category>rust</category>"));
        assert!(xml.contains("<content:encoded><![CDATA[<p>Body</p>]]></content:encoded>"));
        assert!(xml.ends_with("</channel>\n</rss>\n"));
        assert!(!xml.contains("<author>"));
    }

    #[test]
    fn test_item_author() {
        let mut config = SiteConfig::default();
        config.author.name = "Jane Roe".to_string();
        config.author.email = Some("jane@example.org".to_string());

        let article = meta("articles/a.md", "# A\n", &config);
        let items = vec![FeedItem {
            meta: &article,
            content: String::new(),
        }];
        let xml = render(&config, &items);
        assert!(xml.contains("<author>jane@example.org (Jane Roe)</author>"));
    }
}
