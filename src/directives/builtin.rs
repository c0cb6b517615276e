use crate::content::SiteIndex;
use crate::error::{BuildError, Result};
use crate::hast::{h, Element};
use crate::helpers::date;
use crate::mdast::{Directive, Node};

/// First link wrapping an image: (link url, image url, image alt)
fn find_linked_image(nodes: &[Node]) -> Option<(&str, &str, &str)> {
    for node in nodes {
        if let Node::Link { url, children, .. } = node {
            let image = children.iter().find_map(|child| match child {
                Node::Image { url, alt, .. } => Some((url.as_str(), alt.as_str())),
                _ => None,
            });
            if let Some((src, alt)) = image {
                return Some((url.as_str(), src, alt));
            }
        }
        if let Some(found) = node.children().and_then(|c| find_linked_image(c)) {
            return Some(found);
        }
    }
    None
}

/// `FIGURE`: a linked image becomes a figure with a linked caption
pub fn figure(directive: &Directive) -> Result<Element> {
    let (href, src, alt) = find_linked_image(&directive.children)
        .or_else(|| find_linked_image(&directive.label))
        .ok_or_else(|| BuildError::directive(&directive.name, "expected a link around an image"))?;

    Ok(h("figure")
        .child(h("img").attr("src", src).attr("alt", alt))
        .child(h("figcaption").child(h("a").attr("href", href).text(alt))))
}

/// `BLOG_INDEX`: articles and scraps, newest first
pub fn blog_index(site: &SiteIndex) -> Element {
    let items = site.blog_entries().into_iter().map(|entry| {
        let published = entry.published.as_ref().map(date::short).unwrap_or_default();
        h("li")
            .child(
                h("a")
                    .attr("href", &entry.pathname)
                    .attr("title", &entry.title)
                    .text(entry.title.clone()),
            )
            .child(h("span").text(published))
    });
    h("ul").class("index").children(items)
}

/// `REFERENCES_INDEX`: references by title
pub fn references_index(site: &SiteIndex) -> Element {
    let items = site.references().into_iter().map(|entry| {
        h("li").child(
            h("a")
                .attr("href", &entry.pathname)
                .attr("title", &entry.title)
                .text(entry.title.clone()),
        )
    });
    h("ul").children(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::Document;
    use crate::hast::{render_fragment, Root};
    use crate::mdast::parse;

    fn index() -> SiteIndex {
        let config = SiteConfig::default();
        let docs: Vec<_> = [
            ("articles/one.md", "---\ntitle: One\npublished: 2021-05-01\n---\n"),
            ("scraps/two.md", "---\ntitle: Two\npublished: 2022-06-02\n---\n"),
            ("articles/wip.md", "---\ntitle: WIP\ndraft: true\n---\n"),
            ("references/b.md", "# Beta\n"),
            ("references/a.md", "# Alpha\n"),
        ]
        .iter()
        .map(|(path, content)| {
            Document::parse(path.into(), path.into(), content, &config).unwrap()
        })
        .collect();
        SiteIndex::from_documents(&docs)
    }

    fn html(el: Element) -> String {
        render_fragment(&Root::new(vec![el.into()]))
    }

    #[test]
    fn test_figure() {
        let root = parse(
            ":::FIGURE\n[![A cat][cat-img]][cat-link]\n:::\n\n[cat-img]: /img/cat.png\n[cat-link]: https://example.org/cat\n",
        );
        let Node::Directive(directive) = &root.children[0] else {
            panic!("expected directive, got {:?}", root.children[0]);
        };
        assert_eq!(
            html(figure(directive).unwrap()),
            r#"<figure><img src="/img/cat.png" alt="A cat"><figcaption><a href="https://example.org/cat">A cat</a></figcaption></figure>"#
        );
    }

    #[test]
    fn test_figure_without_link() {
        let root = parse(":::FIGURE\nJust text\n:::\n");
        let Node::Directive(directive) = &root.children[0] else {
            panic!("expected directive");
        };
        assert!(figure(directive).is_err());
    }

    #[test]
    fn test_blog_index() {
        assert_eq!(
            html(blog_index(&index())),
            concat!(
                r#"<ul class="index">"#,
                r#"<li><a href="/scraps/two" title="Two">Two</a><span>2022-06-02</span></li>"#,
                r#"<li><a href="/articles/one" title="One">One</a><span>2021-05-01</span></li>"#,
                "</ul>"
            )
        );
    }

    #[test]
    fn test_references_index() {
        assert_eq!(
            html(references_index(&index())),
            concat!(
                "<ul>",
                r#"<li><a href="/references/a" title="Alpha">Alpha</a></li>"#,
                r#"<li><a href="/references/b" title="Beta">Beta</a></li>"#,
                "</ul>"
            )
        );
    }
}
