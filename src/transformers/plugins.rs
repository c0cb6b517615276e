use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use std::collections::HashSet;
use tracing::debug;

use super::{TransformContext, Transformer};
use crate::config::{AnalyticsConfig, HighlightConfig};
use crate::content::{PageMeta, PageType};
use crate::error::{BuildError, Result};
use crate::hast::{self, append, find_element, h, insert_before_stylesheets, Node, Visit};
use crate::helpers::date;
use crate::highlight;

lazy_static! {
    static ref SPRITE_SRC: Regex = Regex::new(r"\.svg#").unwrap();
}

const BOOT_SCRIPT: &str = "(() => {
    const theme = localStorage.getItem('theme');
    if (theme) document.documentElement.classList.add(theme);
  })();";

/// Prerender same-origin links without a query or hash, prefetch the rest
pub struct SpeculationRules {
    pub origin_trial: Option<String>,
}

impl Transformer for SpeculationRules {
    fn name(&self) -> &'static str {
        "speculation_rules"
    }

    fn transform(&self, tree: &mut hast::Root, _ctx: &TransformContext) -> Result<()> {
        let same_origin = json!({ "href_matches": "/*\\?*#*" });
        let rules = json!({
            "prerender": [{
                "source": "document",
                "where": same_origin.clone(),
                "eagerness": "moderate",
            }],
            "prefetch": [{
                "source": "document",
                "where": { "not": same_origin },
                "eagerness": "moderate",
            }],
        });
        let rules = serde_json::to_string(&rules).map_err(|e| BuildError::Transform {
            name: self.name(),
            message: e.to_string(),
        })?;

        append(
            tree,
            "body",
            vec![h("script")
                .attr("type", "speculationrules")
                .child(Node::Raw(rules))
                .into()],
        );

        if let Some(token) = &self.origin_trial {
            insert_before_stylesheets(
                tree,
                h("meta")
                    .attr("http-equiv", "origin-trial")
                    .attr("content", token.as_str())
                    .into(),
            );
        }
        Ok(())
    }
}

/// Applies the stored color theme before the stylesheets load
pub struct BootScript;

impl Transformer for BootScript {
    fn name(&self) -> &'static str {
        "boot_script"
    }

    fn transform(&self, tree: &mut hast::Root, _ctx: &TransformContext) -> Result<()> {
        insert_before_stylesheets(tree, h("script").child(Node::Raw(BOOT_SCRIPT.into())).into());
        Ok(())
    }
}

/// Byline under the title of articles and scraps
pub struct ArticleHeading;

impl ArticleHeading {
    fn byline(meta: &PageMeta) -> hast::Element {
        let author = &meta.author;
        let mut div = h("div")
            .class("meta")
            .text("Published by ")
            .child(
                h("a")
                    .attr("href", author.href.as_str())
                    .attr("rel", "author")
                    .text(author.name.clone()),
            );

        if let Some(published) = &meta.published {
            div = div.text(" on ").child(time(published));
        }
        if let Some(modified) = &meta.modified {
            div = div
                .text(" (last update: ")
                .child(time(modified))
                .text(")");
        }
        div
    }
}

fn time(value: &chrono::DateTime<chrono::Utc>) -> hast::Element {
    h("time")
        .attr("datetime", date::short(value))
        .text(date::long(value))
}

impl Transformer for ArticleHeading {
    fn name(&self) -> &'static str {
        "article_heading"
    }

    fn applies(&self, meta: &PageMeta) -> bool {
        matches!(meta.page_type, PageType::Article | PageType::Scrap)
    }

    fn transform(&self, tree: &mut hast::Root, ctx: &TransformContext) -> Result<()> {
        let byline = Self::byline(ctx.meta);
        let mut byline = Some(byline);
        find_element(
            tree,
            |el| el.tag == "h1",
            |children, index| {
                let Some(byline) = byline.take() else {
                    return Visit::Stop;
                };
                let rest = children.split_off(index + 1);
                let heading = children.swap_remove(index);
                children.clear();
                children.push(h("header").child(heading).child(byline).into());
                children.extend(rest);
                Visit::Stop
            },
        );
        Ok(())
    }
}

/// Images pointing into an SVG sprite sheet become inline `<use>` references
pub struct Sprites;

impl Transformer for Sprites {
    fn name(&self) -> &'static str {
        "sprites"
    }

    fn transform(&self, tree: &mut hast::Root, _ctx: &TransformContext) -> Result<()> {
        find_element(
            tree,
            |el| {
                el.tag == "img"
                    && el
                        .get_str("src")
                        .map(|src| SPRITE_SRC.is_match(&src))
                        .unwrap_or(false)
            },
            |children, index| {
                let src = children[index]
                    .as_element()
                    .and_then(|el| el.get_str("src"))
                    .unwrap_or_default();
                children[index] = h("svg").child(h("use").attr("href", src)).into();
                Visit::Skip
            },
        );
        Ok(())
    }
}

/// Syntax highlighting of `code.language-*` blocks
pub struct Highlight {
    subset: HashSet<String>,
    plain_text: HashSet<String>,
}

impl Highlight {
    pub fn new(config: &HighlightConfig) -> Self {
        Self {
            subset: config.subset.iter().cloned().collect(),
            plain_text: config.plain_text.iter().cloned().collect(),
        }
    }

    fn language(el: &hast::Element) -> Option<String> {
        el.classes()
            .into_iter()
            .find_map(|class| class.strip_prefix("language-").map(str::to_string))
    }

    fn wants(&self, lang: &str) -> bool {
        self.subset.contains(lang) && !self.plain_text.contains(lang) && highlight::supports(lang)
    }
}

impl Transformer for Highlight {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn transform(&self, tree: &mut hast::Root, _ctx: &TransformContext) -> Result<()> {
        let mut failure = None;
        find_element(
            tree,
            |el| {
                el.tag == "code"
                    && el
                        .children
                        .iter()
                        .all(|child| matches!(child, Node::Text(_)))
                    && Self::language(el).is_some_and(|lang| self.wants(&lang))
            },
            |children, index| {
                let Some(el) = children[index].as_element_mut() else {
                    return Visit::Skip;
                };
                let Some(lang) = Self::language(el) else {
                    return Visit::Skip;
                };
                match highlight::highlight(&el.text_content(), &lang) {
                    Ok(Some(html)) => {
                        el.children = vec![Node::Raw(html)];
                        el.add_class("hljs");
                    }
                    Ok(None) => debug!("No syntax for language '{}'", lang),
                    Err(e) => {
                        failure = Some(e);
                        return Visit::Stop;
                    }
                }
                Visit::Skip
            },
        );

        match failure {
            Some(e) => Err(BuildError::Transform {
                name: self.name(),
                message: e.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Analytics script plus a tracking pixel for visitors without JavaScript
pub struct Analytics {
    script: String,
    noscript: Option<String>,
}

impl Analytics {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            script: config.script.clone(),
            noscript: config.noscript.clone(),
        }
    }
}

impl Transformer for Analytics {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn transform(&self, tree: &mut hast::Root, _ctx: &TransformContext) -> Result<()> {
        let mut nodes: Vec<Node> = vec![h("script")
            .attr("async", true)
            .attr("defer", true)
            .attr("src", self.script.as_str())
            .into()];
        if let Some(pixel) = &self.noscript {
            nodes.push(
                h("noscript")
                    .child(
                        h("img")
                            .attr("src", pixel.as_str())
                            .attr("alt", "")
                            .attr("referrerpolicy", "no-referrer-when-downgrade"),
                    )
                    .into(),
            );
        }
        append(tree, "body", nodes);
        Ok(())
    }
}

/// Marks links to the author's own profiles with `rel="me"`
pub struct RelMe {
    links: HashSet<String>,
}

impl RelMe {
    pub fn new(links: &[String]) -> Self {
        Self {
            links: links.iter().cloned().collect(),
        }
    }
}

impl Transformer for RelMe {
    fn name(&self) -> &'static str {
        "rel_me"
    }

    fn transform(&self, tree: &mut hast::Root, _ctx: &TransformContext) -> Result<()> {
        find_element(
            tree,
            |el| {
                el.tag == "a"
                    && el
                        .get_str("href")
                        .map(|href| self.links.contains(&href))
                        .unwrap_or(false)
            },
            |children, index| {
                if let Some(el) = children[index].as_element_mut() {
                    el.set("rel", "me");
                }
                Visit::Continue
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::Document;
    use crate::hast::render_fragment;

    fn meta(path: &str, content: &str, config: &SiteConfig) -> PageMeta {
        Document::parse(path.into(), path.into(), content, config)
            .unwrap()
            .meta
    }

    fn page() -> hast::Root {
        hast::Root::new(vec![h("html")
            .child(
                h("head")
                    .child(h("title").text("T"))
                    .child(h("link").attr("rel", "stylesheet").attr("href", "/a.css")),
            )
            .child(
                h("body").child(
                    h("main")
                        .child(h("p").text("intro"))
                        .child(h("h1").text("Title"))
                        .child(h("p").text("Body")),
                ),
            )
            .into()])
    }

    fn run(transformer: &dyn Transformer, tree: &mut hast::Root, meta: &PageMeta) {
        let config = SiteConfig::default();
        let ctx = TransformContext {
            meta,
            config: &config,
        };
        transformer.transform(tree, &ctx).unwrap();
    }

    #[test]
    fn test_boot_script_before_stylesheets() {
        let config = SiteConfig::default();
        let mut tree = page();
        run(&BootScript, &mut tree, &meta("a.md", "# A\n", &config));
        let head = tree.find("head").unwrap();
        assert!(head.children[1].is_element("script"));
        assert!(render_fragment(&tree).contains("localStorage.getItem('theme')"));
    }

    #[test]
    fn test_speculation_rules() {
        let config = SiteConfig::default();
        let mut tree = page();
        let rules = SpeculationRules {
            origin_trial: Some("token".to_string()),
        };
        run(&rules, &mut tree, &meta("a.md", "# A\n", &config));

        let html = render_fragment(&tree);
        assert!(html.contains(r#"<script type="speculationrules">{"prerender":[{"source":"document","where":{"href_matches":"/*\\?*#*"},"eagerness":"moderate"}]"#));
        assert!(html.contains(r#""prefetch":[{"source":"document","where":{"not":{"href_matches":"/*\\?*#*"}}"#));
        assert!(html.contains(r#"<meta http-equiv="origin-trial" content="token"><link rel="stylesheet""#));
    }

    #[test]
    fn test_article_heading() {
        let config = SiteConfig::default();
        let article = meta(
            "articles/a.md",
            "---\npublished: 2024-01-05\nmodified: 2024-02-10\n---\n# Title\n",
            &config,
        );
        assert!(ArticleHeading.applies(&article));
        assert!(!ArticleHeading.applies(&meta("about.md", "# About\n", &config)));

        let mut tree = page();
        run(&ArticleHeading, &mut tree, &article);
        let main = tree.find("main").unwrap();
        assert_eq!(main.children.len(), 2);
        assert_eq!(
            render_fragment(&hast::Root::new(vec![main.children[0].clone()])),
            concat!(
                r#"<header><h1>Title</h1><div class="meta">Published by <a href="/" rel="author">John Doe</a>"#,
                r#" on <time datetime="2024-01-05">January 5, 2024</time>"#,
                r#" (last update: <time datetime="2024-02-10">February 10, 2024</time>)</div></header>"#
            )
        );
    }

    #[test]
    fn test_sprites() {
        let config = SiteConfig::default();
        let mut tree = hast::Root::new(vec![h("p")
            .child(h("img").attr("src", "/img/sprites.svg#rss"))
            .child(h("img").attr("src", "/img/photo.png"))
            .into()]);
        run(&Sprites, &mut tree, &meta("a.md", "# A\n", &config));
        assert_eq!(
            render_fragment(&tree),
            r#"<p><svg><use href="/img/sprites.svg#rss"></use></svg><img src="/img/photo.png"></p>"#
        );
    }

    #[test]
    fn test_highlight() {
        let config = SiteConfig::default();
        let mut tree = hast::Root::new(vec![
            h("pre")
                .child(h("code").class("language-json").text("{\"a\": 1}\n"))
                .into(),
            h("pre")
                .child(h("code").class("language-txt").text("plain\n"))
                .into(),
            h("pre")
                .child(h("code").class("language-rust").text("fn main() {}\n"))
                .into(),
        ]);
        run(
            &Highlight::new(&config.highlight),
            &mut tree,
            &meta("a.md", "# A\n", &config),
        );

        let codes = tree.find_all("code");
        assert!(codes[0].has_class("hljs"));
        assert!(matches!(codes[0].children[0], Node::Raw(_)));
        assert!(!codes[1].has_class("hljs"));
        // not in the subset
        assert!(!codes[2].has_class("hljs"));
        assert_eq!(codes[2].text_content(), "fn main() {}\n");
    }

    #[test]
    fn test_analytics() {
        let config = SiteConfig::default();
        let mut tree = page();
        let analytics = Analytics::new(&AnalyticsConfig {
            script: "https://stats.example.org/latest.js".to_string(),
            noscript: Some("https://stats.example.org/noscript.gif".to_string()),
        });
        run(&analytics, &mut tree, &meta("a.md", "# A\n", &config));
        assert!(render_fragment(&tree).ends_with(concat!(
            r#"<script async defer src="https://stats.example.org/latest.js"></script>"#,
            r#"<noscript><img src="https://stats.example.org/noscript.gif" alt="" referrerpolicy="no-referrer-when-downgrade"></noscript>"#,
            "</body></html>"
        )));
    }

    #[test]
    fn test_rel_me() {
        let config = SiteConfig::default();
        let mut tree = hast::Root::new(vec![h("p")
            .child(h("a").attr("href", "https://mastodon.social/@me"))
            .child(h("a").attr("href", "https://example.org"))
            .into()]);
        let rel_me = RelMe::new(&["https://mastodon.social/@me".to_string()]);
        run(&rel_me, &mut tree, &meta("a.md", "# A\n", &config));
        assert_eq!(
            render_fragment(&tree),
            r#"<p><a href="https://mastodon.social/@me" rel="me"></a><a href="https://example.org"></a></p>"#
        );
    }
}
