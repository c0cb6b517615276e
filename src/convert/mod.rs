//! Markdown tree → HTML tree

mod code;

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::hast::{self, h, Element};
use crate::mdast::{self, Align, Node};

pub use code::{code_block, default_code_block};

/// Options of a conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Use the terminal/plain-text code handlers
    pub custom_code: bool,
    /// Prompt owner recognised in shell sessions
    pub shell_user: String,
}

impl ConvertOptions {
    /// Page conversion
    pub fn page(shell_user: &str) -> Self {
        Self {
            custom_code: true,
            shell_user: shell_user.to_string(),
        }
    }

    /// Plain conversion, used for feed bodies
    pub fn minimal() -> Self {
        Self {
            custom_code: false,
            shell_user: String::new(),
        }
    }
}

/// Convert a document to an HTML fragment
pub fn to_hast(root: &mdast::Root, options: &ConvertOptions) -> hast::Root {
    let mut converter = Converter::new(options);
    let mut children = converter.nodes(&root.children);
    if let Some(footnotes) = converter.footnotes_section() {
        children.push(footnotes.into());
    }
    hast::Root::new(children)
}

struct Converter<'a> {
    options: &'a ConvertOptions,
    slugs: HashMap<String, usize>,
    /// Heading ids handed out so far, explicit ones included
    taken: HashSet<String>,
    /// Footnote definitions by label
    definitions: HashMap<String, Vec<hast::Node>>,
    /// Footnote labels in order of first reference, with their number
    references: IndexMap<String, usize>,
}

impl<'a> Converter<'a> {
    fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            slugs: HashMap::new(),
            taken: HashSet::new(),
            definitions: HashMap::new(),
            references: IndexMap::new(),
        }
    }

    fn nodes(&mut self, nodes: &[Node]) -> Vec<hast::Node> {
        nodes.iter().filter_map(|node| self.node(node)).collect()
    }

    fn element(&mut self, tag: &str, children: &[Node]) -> Element {
        let children = self.nodes(children);
        h(tag).children(children)
    }

    fn node(&mut self, node: &Node) -> Option<hast::Node> {
        let el = match node {
            Node::Paragraph(children) => self.element("p", children),
            Node::Heading {
                depth,
                id,
                classes,
                children,
            } => {
                let mut el = self.element(&format!("h{}", depth), children);
                let id = match id {
                    Some(id) => {
                        self.taken.insert(id.clone());
                        Some(id.clone())
                    }
                    None => self.slug(&mdast::nodes_to_string(children)),
                };
                if let Some(id) = id {
                    el.set("id", id);
                }
                for class in classes {
                    el.add_class(class);
                }
                el
            }
            Node::ThematicBreak => h("hr"),
            Node::Blockquote(children) => self.element("blockquote", children),
            Node::List {
                ordered,
                start,
                children,
            } => {
                let mut el = self.element(if *ordered { "ol" } else { "ul" }, children);
                if let Some(start) = start.filter(|s| *ordered && *s != 1) {
                    el.set("start", start.to_string());
                }
                if children
                    .iter()
                    .any(|c| matches!(c, Node::ListItem { checked: Some(_), .. }))
                {
                    el.add_class("contains-task-list");
                }
                el
            }
            Node::ListItem { checked, children } => {
                let mut el = self.element("li", children);
                if let Some(checked) = checked {
                    el.add_class("task-list-item");
                    let checkbox = h("input")
                        .attr("type", "checkbox")
                        .attr("disabled", true)
                        .attr("checked", *checked);
                    insert_checkbox(&mut el, checkbox);
                }
                el
            }
            Node::Code(code) => {
                if self.options.custom_code {
                    code_block(code, &self.options.shell_user)
                } else {
                    default_code_block(code)
                }
            }
            Node::Html(html) => return Some(hast::Node::Raw(html.clone())),
            Node::Text(text) => return Some(hast::Node::Text(text.clone())),
            Node::Emphasis(children) => self.element("em", children),
            Node::Strong(children) => self.element("strong", children),
            Node::Delete(children) => self.element("del", children),
            Node::InlineCode(value) => h("code").text(value.clone()),
            Node::Break => return Some(hast::Node::Element(h("br"))),
            Node::Link {
                url,
                title,
                children,
            } => {
                let mut el = self.element("a", children).attr("href", url.as_str());
                if !title.is_empty() {
                    el.set("title", title.as_str());
                }
                el
            }
            Node::Image { url, title, alt } => {
                let mut el = h("img").attr("src", url.as_str()).attr("alt", alt.as_str());
                if !title.is_empty() {
                    el.set("title", title.as_str());
                }
                el
            }
            Node::FootnoteReference(label) => self.footnote_reference(label),
            Node::FootnoteDefinition { label, children } => {
                let content = self.nodes(children);
                self.definitions.insert(label.clone(), content);
                return None;
            }
            Node::Table { align, children } => self.table(align, children),
            Node::TableRow { children, .. } => self.element("tr", children),
            Node::TableCell(children) => self.element("td", children),
            Node::DefinitionList(children) => self.element("dl", children),
            Node::DefinitionTerm(children) => self.element("dt", children),
            Node::DefinitionDescription(children) => self.element("dd", children),
            Node::Directive(directive) => {
                let mut el = h(&directive.name);
                for (key, value) in &directive.attributes {
                    el.set(key, value.as_str());
                }
                let mut children = self.nodes(&directive.label);
                children.extend(self.nodes(&directive.children));
                el.children(children)
            }
            Node::Hast(node) => return Some(node.clone()),
        };
        Some(el.into())
    }

    /// Unique slug for a heading, `-1`, `-2`… appended to repeats.
    /// Ids already in the document are never reused.
    fn slug(&mut self, text: &str) -> Option<String> {
        let base = slug::slugify(text);
        if base.is_empty() {
            return None;
        }
        let count = self.slugs.entry(base.clone()).or_insert(0);
        loop {
            let candidate = if *count == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, count)
            };
            *count += 1;
            if self.taken.insert(candidate.clone()) {
                return Some(candidate);
            }
        }
    }

    fn table(&mut self, align: &[Align], rows: &[Node]) -> Element {
        let mut head = Vec::new();
        let mut body = Vec::new();

        for row in rows {
            let Node::TableRow { header, children } = row else {
                continue;
            };
            let tag = if *header { "th" } else { "td" };
            let cells = children.iter().enumerate().map(|(i, cell)| {
                let content = match cell {
                    Node::TableCell(content) => self.nodes(content),
                    other => self.node(other).into_iter().collect(),
                };
                let mut el = h(tag).children(content);
                if let Some(align) = align.get(i).and_then(|a| a.as_str()) {
                    el.set("align", align);
                }
                hast::Node::from(el)
            });
            let tr = h("tr").children(cells.collect::<Vec<_>>());
            if *header {
                head.push(tr);
            } else {
                body.push(tr);
            }
        }

        let mut table = h("table");
        if !head.is_empty() {
            table = table.child(h("thead").children(head));
        }
        if !body.is_empty() {
            table = table.child(h("tbody").children(body));
        }
        table
    }

    fn footnote_reference(&mut self, label: &str) -> Element {
        let next = self.references.len() + 1;
        let number = *self.references.entry(label.to_string()).or_insert(next);
        let id = footnote_id(label);
        h("sup").child(
            h("a")
                .attr("href", format!("#fn-{}", id))
                .attr("id", format!("fnref-{}", id))
                .attr("data-footnote-ref", true)
                .text(number.to_string()),
        )
    }

    /// Footnotes in order of first reference; unreferenced definitions are dropped
    fn footnotes_section(&mut self) -> Option<Element> {
        if self.references.is_empty() {
            return None;
        }
        let items: Vec<Element> = self
            .references
            .keys()
            .map(|label| {
                let id = footnote_id(label);
                let backref = h("a")
                    .attr("href", format!("#fnref-{}", id))
                    .attr("data-footnote-backref", true)
                    .attr("aria-label", "Back to reference")
                    .text("↩");
                let mut content = self.definitions.remove(label).unwrap_or_default();
                match content.last_mut().and_then(hast::Node::as_element_mut) {
                    Some(last) if last.tag == "p" => {
                        last.children.push(" ".into());
                        last.children.push(backref.into());
                    }
                    _ => content.push(backref.into()),
                }
                h("li").attr("id", format!("fn-{}", id)).children(content)
            })
            .collect();

        Some(
            h("section")
                .class("footnotes")
                .attr("data-footnotes", true)
                .child(h("ol").children(items)),
        )
    }
}

fn footnote_id(label: &str) -> String {
    let id = slug::slugify(label);
    if id.is_empty() {
        label.to_string()
    } else {
        id
    }
}

/// Put a task list checkbox at the start of the item's first paragraph
/// (loose lists) or of the item itself (tight lists)
fn insert_checkbox(li: &mut Element, checkbox: Element) {
    let target = match li.children.first_mut() {
        Some(hast::Node::Element(p)) if p.tag == "p" => &mut p.children,
        _ => &mut li.children,
    };
    target.insert(0, " ".into());
    target.insert(0, checkbox.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::render_fragment;
    use crate::mdast::parse;

    fn convert(markdown: &str) -> String {
        render_fragment(&to_hast(&parse(markdown), &ConvertOptions::page("user")))
    }

    #[test]
    fn test_heading_ids() {
        assert_eq!(
            convert("# Hello World\n\n## Hello World\n\n## Custom {#mine}\n"),
            concat!(
                r#"<h1 id="hello-world">Hello World</h1>"#,
                r#"<h2 id="hello-world-1">Hello World</h2>"#,
                r#"<h2 id="mine">Custom</h2>"#
            )
        );
    }

    #[test]
    fn test_heading_ids_avoid_explicit_ids() {
        assert_eq!(
            convert("## Setup {#setup}\n\n## Setup\n\n## Setup 1\n"),
            concat!(
                r#"<h2 id="setup">Setup</h2>"#,
                r#"<h2 id="setup-1">Setup</h2>"#,
                r#"<h2 id="setup-1-1">Setup 1</h2>"#
            )
        );
    }

    #[test]
    fn test_inline_elements() {
        assert_eq!(
            convert("A *b* **c** `d` [e](/f \"g\") ![h](/i.png)\n"),
            r#"<p>A <em>b</em> <strong>c</strong> <code>d</code> <a href="/f" title="g">e</a> <img src="/i.png" alt="h"></p>"#
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            convert("| a | b |\n|:-:|---|\n| 1 | 2 |\n"),
            concat!(
                "<table><thead><tr>",
                r#"<th align="center">a</th><th>b</th>"#,
                "</tr></thead><tbody><tr>",
                r#"<td align="center">1</td><td>2</td>"#,
                "</tr></tbody></table>"
            )
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            convert("- [x] done\n"),
            r#"<ul class="contains-task-list"><li class="task-list-item"><input type="checkbox" disabled checked> done</li></ul>"#
        );
    }

    #[test]
    fn test_footnotes() {
        let html = convert("Text[^a].\n\n[^a]: The note.\n");
        assert!(html.starts_with(
            r##"<p>Text<sup><a href="#fn-a" id="fnref-a" data-footnote-ref>1</a></sup>.</p>"##
        ));
        assert!(html.contains(
            r##"<section class="footnotes" data-footnotes><ol><li id="fn-a"><p>The note. <a href="#fnref-a""##
        ));
    }

    #[test]
    fn test_unknown_directive() {
        assert_eq!(
            convert(":::aside{.note data-kind=tip}\nHello\n:::\n"),
            r#"<aside data-kind="tip" class="note"><p>Hello</p></aside>"#
        );
    }

    #[test]
    fn test_minimal_code() {
        let root = parse("```shell\nls\n```\n");
        assert_eq!(
            render_fragment(&to_hast(&root, &ConvertOptions::minimal())),
            "<pre><code class=\"language-shell\">ls\n</code></pre>"
        );
    }

    #[test]
    fn test_raw_html() {
        assert_eq!(convert("<div>x</div>\n"), "<div>x</div>\n");
    }
}
