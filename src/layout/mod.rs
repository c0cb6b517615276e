//! Page layout: wraps a converted fragment in a full HTML document

mod footer;
mod head;

use serde_json::Value;

use crate::config::SiteConfig;
use crate::content::PageMeta;
use crate::hast::{self, h, Element, Node};

pub use footer::footer;
pub use head::{links, meta_tags};

fn header(meta: &PageMeta) -> Element {
    let mut header = h("header");
    if let Some(logo) = &meta.logo {
        header = header.child(
            h("div").class("logo").child(
                h("a")
                    .attr("href", logo.href.as_str())
                    .attr("title", "Go back")
                    .child(
                        h("img")
                            .attr("src", logo.src.as_str())
                            .attr("width", "32")
                            .attr("height", "32")
                            .attr("alt", logo.alt.as_str()),
                    ),
            ),
        );
    }
    header
        .child(
            h("input")
                .attr("type", "search")
                .attr("id", "search")
                .attr("placeholder", "Search...")
                .attr("autocomplete", "off"),
        )
        .child(
            h("label")
                .class("theme-switch")
                .attr("for", "theme-toggle")
                .child(
                    h("button")
                        .attr("type", "button")
                        .attr("id", "theme-toggle")
                        .attr("role", "switch")
                        .attr("aria-label", "Switch color theme")
                        .attr("aria-checked", "false"),
                ),
        )
}

/// JSON that cannot close the surrounding `<script>` element
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Full document for a page
pub fn document(
    meta: &PageMeta,
    fragment: hast::Root,
    config: &SiteConfig,
    structured_data: &Value,
) -> hast::Root {
    let mut head = h("head")
        .child(h("meta").attr("charset", "utf-8"))
        .child(
            h("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(h("title").text(meta.title.clone()))
        .children(meta_tags(meta, config))
        .children(links(meta, config));

    if let Ok(json) = serde_json::to_string(structured_data) {
        head = head.child(
            h("script")
                .attr("type", "application/ld+json")
                .child(Node::Raw(script_safe(&json))),
        );
    }

    let mut main = h("main").children(fragment.children);
    if let Some(class) = &meta.class {
        main.set("class", class.as_str());
    }

    let body = h("body")
        .child(header(meta))
        .child(main)
        .child(h("footer").children(footer(meta, config)))
        .child(h("button").class("back-to-top").text("Back to top"))
        .children(
            meta.scripts
                .iter()
                .map(|src| h("script").attr("src", src.as_str())),
        );

    hast::Root::new(vec![
        Node::Doctype,
        h("html")
            .attr("lang", config.language.as_str())
            .child(head)
            .child(body)
            .into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Document;
    use crate::hast::render;
    use serde_json::json;

    #[test]
    fn test_document() {
        let mut config = SiteConfig::default();
        config.social.source = Some("https://github.com/someone/site".to_string());
        let meta = Document::parse(
            "articles/a.md".into(),
            "content/articles/a.md".into(),
            "---\nclass: wide\n---\n# Hello\n",
            &config,
        )
        .unwrap()
        .meta;

        let fragment = hast::Root::new(vec![h("p").text("Body").into()]);
        let root = document(&meta, fragment, &config, &json!({"@type": "Article"}));
        let html = render(&root);

        assert!(html.starts_with("<!doctype html>\n<html lang=\"en\">"));
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains(r#"<script type="application/ld+json">{"@type":"Article"}</script>"#));
        assert!(html.contains(r#"<a href="/blog" title="Go back"><img src="/img/logo.svg" width="32" height="32" alt="Blog"></a>"#));
        assert!(html.contains(r#"<input type="search" id="search" placeholder="Search..." autocomplete="off">"#));
        assert!(html.contains(r#"<main class="wide">"#));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains("Share this article on Hacker News"));
        assert!(html.contains("Please let me know!"));
        assert!(html.contains(r#"<button class="back-to-top">Back to top</button>"#));
        assert!(html.contains(r#"<script src="/js/theme-switch.js"></script>"#));
    }

    #[test]
    fn test_structured_data_cannot_close_script() {
        let config = SiteConfig::default();
        let meta = Document::parse(
            "articles/a.md".into(),
            "content/articles/a.md".into(),
            "---\ntitle: Why </script> ends inline JSON\n---\n",
            &config,
        )
        .unwrap()
        .meta;

        let data = json!({ "headline": meta.title });
        let html = render(&document(&meta, hast::Root::default(), &config, &data));
        assert!(html.contains(
            r#"<script type="application/ld+json">{"headline":"Why \u003c/script> ends inline JSON"}</script>"#
        ));
        assert_eq!(html.matches("</script>").count(), 1 + meta.scripts.len());
    }

    #[test]
    fn test_page_footer_is_empty() {
        let config = SiteConfig::default();
        let meta = Document::parse("about.md".into(), "about.md".into(), "# About\n", &config)
            .unwrap()
            .meta;
        assert!(footer(&meta, &config).is_empty());
    }
}
