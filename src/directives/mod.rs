//! Directive dispatch
//!
//! Directives are looked up by name in a [`Directives`] registry. A known
//! directive is replaced by the HTML element its function returns; an
//! unknown one stays in the tree and becomes an element named after it.

mod builtin;

use std::collections::HashMap;

use crate::content::{PageMeta, SiteIndex};
use crate::error::Result;
use crate::hast;
use crate::mdast::{self, Directive, Node};

pub use builtin::{blog_index, figure, references_index};

/// What a directive function can see besides the directive itself
pub struct DirectiveContext<'a> {
    pub page: &'a PageMeta,
    pub site: &'a SiteIndex,
}

pub type DirectiveFn =
    Box<dyn Fn(&Directive, &DirectiveContext) -> Result<hast::Element> + Send + Sync>;

/// Registry of directive functions keyed by name
#[derive(Default)]
pub struct Directives(HashMap<String, DirectiveFn>);

impl Directives {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Registry with `FIGURE`, `BLOG_INDEX` and `REFERENCES_INDEX`
    pub fn builtin() -> Self {
        let mut directives = Self::new();
        directives.register("FIGURE", |d, _| figure(d));
        directives.register("BLOG_INDEX", |_, ctx| Ok(blog_index(ctx.site)));
        directives.register("REFERENCES_INDEX", |_, ctx| Ok(references_index(ctx.site)));
        directives
    }

    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&Directive, &DirectiveContext) -> Result<hast::Element> + Send + Sync + 'static,
    {
        self.0.insert(name.to_string(), Box::new(func));
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveFn> {
        self.0.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Replace every known directive in the tree with its HTML
pub fn transform_directives(root: &mut mdast::Root, directives: &Directives, ctx: &DirectiveContext) {
    transform_nodes(&mut root.children, directives, ctx);
}

fn transform_nodes(nodes: &mut [Node], directives: &Directives, ctx: &DirectiveContext) {
    for node in nodes.iter_mut() {
        if let Node::Directive(directive) = node {
            if let Some(func) = directives.get(&directive.name) {
                match func(directive, ctx) {
                    Ok(element) => {
                        tracing::debug!("Directive {} on {}", directive.name, ctx.page.pathname);
                        *node = Node::Hast(hast::Node::Element(element));
                        continue;
                    }
                    Err(e) => tracing::warn!("{} (in {})", e, ctx.page.pathname),
                }
            }
        }

        match node {
            Node::Directive(directive) => {
                transform_nodes(&mut directive.label, directives, ctx);
                transform_nodes(&mut directive.children, directives, ctx);
            }
            other => {
                if let Some(children) = other.children_mut() {
                    transform_nodes(children, directives, ctx);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::Document;
    use crate::error::BuildError;
    use crate::hast::h;

    fn document(markdown: &str) -> Document {
        Document::parse(
            "articles/test.md".into(),
            "content/articles/test.md".into(),
            markdown,
            &SiteConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_known_directive_is_replaced() {
        let mut directives = Directives::new();
        directives.register("HELLO", |d, _| {
            Ok(h("p").class("hello").text(format!("hello {}", d.name)))
        });

        let mut doc = document("::HELLO\n\n::other\n");
        let site = SiteIndex::default();
        let ctx = DirectiveContext {
            page: &doc.meta,
            site: &site,
        };
        transform_directives(&mut doc.tree, &directives, &ctx);

        match &doc.tree.children[0] {
            Node::Hast(hast::Node::Element(el)) => {
                assert!(el.has_class("hello"));
                assert_eq!(el.text_content(), "hello HELLO");
            }
            other => panic!("expected hast, got {:?}", other),
        }
        assert!(matches!(doc.tree.children[1], Node::Directive(_)));
    }

    #[test]
    fn test_failing_directive_is_kept() {
        let mut directives = Directives::new();
        directives.register("BROKEN", |d, _| Err(BuildError::directive(&d.name, "nope")));

        let mut doc = document(":::BROKEN\ntext\n:::\n");
        let site = SiteIndex::default();
        let ctx = DirectiveContext {
            page: &doc.meta,
            site: &site,
        };
        transform_directives(&mut doc.tree, &directives, &ctx);
        assert!(matches!(doc.tree.children[0], Node::Directive(_)));
    }

    #[test]
    fn test_nested_directives() {
        let mut doc = document(":::outer\n::BLOG_INDEX\n:::\n");
        let site = SiteIndex::default();
        let ctx = DirectiveContext {
            page: &doc.meta,
            site: &site,
        };
        transform_directives(&mut doc.tree, &Directives::builtin(), &ctx);

        let Node::Directive(outer) = &doc.tree.children[0] else {
            panic!("expected directive");
        };
        assert!(matches!(&outer.children[0], Node::Hast(hast::Node::Element(el)) if el.tag == "ul"));
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            Directives::builtin().names(),
            vec!["BLOG_INDEX", "FIGURE", "REFERENCES_INDEX"]
        );
    }
}
