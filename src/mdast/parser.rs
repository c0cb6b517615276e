//! Markdown → mdast, on top of pulldown-cmark

use lazy_static::lazy_static;
use pulldown_cmark::{
    Alignment, BrokenLink, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag,
};
use regex::Regex;
use std::collections::HashMap;

use super::directive_syntax::{self, FenceTracker, Segment};
use super::{Align, Code, Directive, DirectiveKind, Node, Root};

lazy_static! {
    static ref DEFINITION: Regex = Regex::new(
        r#"^ {0,3}\[([^\]]+)\]:[ \t]*<?([^\s>]+)>?(?:[ \t]+(?:"([^"]*)"|'([^']*)'|\(([^)]*)\)))?[ \t]*$"#
    )
    .unwrap();
}

/// Link reference definitions of a whole document, keyed by normalised label
#[derive(Debug, Clone, Default)]
pub(crate) struct Definitions(HashMap<String, (String, String)>);

impl Definitions {
    fn collect(markdown: &str) -> Self {
        let mut definitions = HashMap::new();
        let mut fences = FenceTracker::default();
        for line in markdown.lines() {
            if fences.is_code(line) {
                continue;
            }
            if let Some(caps) = DEFINITION.captures(line) {
                let title = caps
                    .get(3)
                    .or_else(|| caps.get(4))
                    .or_else(|| caps.get(5))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                definitions
                    .entry(normalize_label(&caps[1]))
                    .or_insert_with(|| (caps[2].to_string(), title));
            }
        }
        Self(definitions)
    }

    fn get(&self, label: &str) -> Option<&(String, String)> {
        self.0.get(&normalize_label(label))
    }
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_GFM
}

/// Parse a Markdown document (without front-matter) into a tree
pub fn parse(markdown: &str) -> Root {
    let definitions = Definitions::collect(markdown);
    let segments = directive_syntax::split_blocks(markdown);
    let mut children = build_segments(segments, &definitions);
    directive_syntax::lift_inline_directives(&mut children, &definitions);
    Root { children }
}

/// Parse inline Markdown (a label) into phrasing nodes
pub fn parse_inline(markdown: &str) -> Vec<Node> {
    parse_inline_with(markdown, &Definitions::default())
}

pub(crate) fn parse_inline_with(markdown: &str, definitions: &Definitions) -> Vec<Node> {
    let mut nodes = parse_fragment(markdown, definitions);
    match nodes.as_mut_slice() {
        [Node::Paragraph(children)] => std::mem::take(children),
        _ => nodes,
    }
}

fn build_segments(segments: Vec<Segment>, definitions: &Definitions) -> Vec<Node> {
    let mut nodes = Vec::new();
    for segment in segments {
        match segment {
            Segment::Markdown(text) => nodes.extend(parse_fragment(&text, definitions)),
            Segment::Leaf(raw) => {
                let mut directive = Directive::new(DirectiveKind::Leaf, &raw.name);
                directive.attributes = raw.attributes;
                if let Some(label) = raw.label {
                    directive.children = parse_inline_with(&label, definitions);
                }
                nodes.push(Node::Directive(directive));
            }
            Segment::Container(raw, content) => {
                let mut directive = Directive::new(DirectiveKind::Container, &raw.name);
                directive.attributes = raw.attributes;
                if let Some(label) = raw.label {
                    directive.label = parse_inline_with(&label, definitions);
                }
                directive.children = build_segments(content, definitions);
                nodes.push(Node::Directive(directive));
            }
        }
    }
    nodes
}

/// Per open tag state while folding events
enum Frame {
    Paragraph,
    Heading {
        depth: u8,
        id: Option<String>,
        classes: Vec<String>,
    },
    Blockquote,
    Code(Code),
    Html(String),
    List {
        ordered: bool,
        start: Option<u64>,
    },
    Item {
        checked: Option<bool>,
    },
    FootnoteDefinition(String),
    Table(Vec<Align>),
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Delete,
    Link {
        url: String,
        title: String,
    },
    Image {
        url: String,
        title: String,
    },
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    /// Tags without a tree counterpart; children are spliced into the parent
    Transparent,
}

struct Open {
    frame: Frame,
    children: Vec<Node>,
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn align(alignment: &Alignment) -> Align {
    match alignment {
        Alignment::None => Align::None,
        Alignment::Left => Align::Left,
        Alignment::Center => Align::Center,
        Alignment::Right => Align::Right,
    }
}

fn open_frame(tag: Tag<'_>) -> Frame {
    match tag {
        Tag::Paragraph => Frame::Paragraph,
        Tag::Heading {
            level, id, classes, ..
        } => Frame::Heading {
            depth: heading_depth(level),
            id: id.map(|id| id.to_string()),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        },
        Tag::BlockQuote(_) => Frame::Blockquote,
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
            Frame::Code(Code::from_info(&info, String::new()))
        }
        Tag::CodeBlock(CodeBlockKind::Indented) => Frame::Code(Code::from_info("", String::new())),
        Tag::HtmlBlock => Frame::Html(String::new()),
        Tag::List(start) => Frame::List {
            ordered: start.is_some(),
            start,
        },
        Tag::Item => Frame::Item { checked: None },
        Tag::FootnoteDefinition(label) => Frame::FootnoteDefinition(label.to_string()),
        Tag::Table(alignments) => Frame::Table(alignments.iter().map(align).collect()),
        Tag::TableHead => Frame::TableHead,
        Tag::TableRow => Frame::TableRow,
        Tag::TableCell => Frame::TableCell,
        Tag::Emphasis => Frame::Emphasis,
        Tag::Strong => Frame::Strong,
        Tag::Strikethrough => Frame::Delete,
        Tag::Link {
            dest_url, title, ..
        } => Frame::Link {
            url: dest_url.to_string(),
            title: title.to_string(),
        },
        Tag::Image {
            dest_url, title, ..
        } => Frame::Image {
            url: dest_url.to_string(),
            title: title.to_string(),
        },
        Tag::DefinitionList => Frame::DefinitionList,
        Tag::DefinitionListTitle => Frame::DefinitionTerm,
        Tag::DefinitionListDefinition => Frame::DefinitionDescription,
        _ => Frame::Transparent,
    }
}

fn close_frame(open: Open) -> Vec<Node> {
    let Open { frame, children } = open;
    let node = match frame {
        Frame::Paragraph => Node::Paragraph(children),
        Frame::Heading { depth, id, classes } => Node::Heading {
            depth,
            id,
            classes,
            children,
        },
        Frame::Blockquote => Node::Blockquote(children),
        Frame::Code(mut code) => {
            if code.value.ends_with('\n') {
                code.value.pop();
            }
            Node::Code(code)
        }
        Frame::Html(html) => Node::Html(html),
        Frame::List { ordered, start } => Node::List {
            ordered,
            start,
            children,
        },
        Frame::Item { checked } => Node::ListItem { checked, children },
        Frame::FootnoteDefinition(label) => Node::FootnoteDefinition { label, children },
        Frame::Table(align) => Node::Table { align, children },
        Frame::TableHead => Node::TableRow {
            header: true,
            children,
        },
        Frame::TableRow => Node::TableRow {
            header: false,
            children,
        },
        Frame::TableCell => Node::TableCell(children),
        Frame::Emphasis => Node::Emphasis(children),
        Frame::Strong => Node::Strong(children),
        Frame::Delete => Node::Delete(children),
        Frame::Link { url, title } => Node::Link {
            url,
            title,
            children,
        },
        Frame::Image { url, title } => Node::Image {
            url,
            title,
            alt: super::nodes_to_string(&children),
        },
        Frame::DefinitionList => Node::DefinitionList(children),
        Frame::DefinitionTerm => Node::DefinitionTerm(children),
        Frame::DefinitionDescription => Node::DefinitionDescription(children),
        Frame::Transparent => return children,
    };
    vec![node]
}

/// Push a text node, merging it into a preceding text node
fn push_text(children: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = children.last_mut() {
        last.push_str(text);
    } else {
        children.push(Node::Text(text.to_string()));
    }
}

/// Parse plain Markdown (no directive blocks) into nodes
fn parse_fragment(markdown: &str, definitions: &Definitions) -> Vec<Node> {
    let mut callback = |link: BrokenLink<'_>| {
        definitions
            .get(&link.reference)
            .map(|(url, title)| (CowStr::from(url.clone()), CowStr::from(title.clone())))
    };
    let parser =
        Parser::new_with_broken_link_callback(markdown, options(), Some(&mut callback));

    let mut stack: Vec<Open> = vec![Open {
        frame: Frame::Transparent,
        children: Vec::new(),
    }];

    for event in parser {
        match event {
            Event::Start(tag) => stack.push(Open {
                frame: open_frame(tag),
                children: Vec::new(),
            }),
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(open) = stack.pop() {
                        let nodes = close_frame(open);
                        if let Some(parent) = stack.last_mut() {
                            for node in nodes {
                                match node {
                                    Node::Text(text) => push_text(&mut parent.children, &text),
                                    node => parent.children.push(node),
                                }
                            }
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    match &mut top.frame {
                        Frame::Code(code) => code.value.push_str(&text),
                        Frame::Html(html) => html.push_str(&text),
                        _ => push_text(&mut top.children, &text),
                    }
                }
            }
            Event::Code(code) => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::InlineCode(code.to_string()));
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some(top) = stack.last_mut() {
                    match &mut top.frame {
                        Frame::Html(block) => block.push_str(&html),
                        _ => top.children.push(Node::Html(html.to_string())),
                    }
                }
            }
            Event::FootnoteReference(label) => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::FootnoteReference(label.to_string()));
                }
            }
            Event::SoftBreak => {
                if let Some(top) = stack.last_mut() {
                    push_text(&mut top.children, "\n");
                }
            }
            Event::HardBreak => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::Break);
                }
            }
            Event::Rule => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::ThematicBreak);
                }
            }
            Event::TaskListMarker(checked) => {
                if let Some(Open {
                    frame: Frame::Item { checked: slot },
                    ..
                }) = stack
                    .iter_mut()
                    .rev()
                    .find(|open| matches!(open.frame, Frame::Item { .. }))
                {
                    *slot = Some(checked);
                }
            }
            _ => {}
        }
    }

    // Unbalanced input cannot happen with pulldown-cmark, but fold whatever is left
    while stack.len() > 1 {
        if let Some(open) = stack.pop() {
            let nodes = close_frame(open);
            if let Some(parent) = stack.last_mut() {
                parent.children.extend(nodes);
            }
        }
    }

    stack.pop().map(|root| root.children).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks() {
        let root = parse("# Title {#custom .big}\n\nSome *em* and **strong** ~~gone~~.\n\n---\n\n> quote\n");
        match &root.children[0] {
            Node::Heading {
                depth, id, classes, ..
            } => {
                assert_eq!(*depth, 1);
                assert_eq!(id.as_deref(), Some("custom"));
                assert_eq!(classes, &vec!["big".to_string()]);
            }
            other => panic!("expected heading, got {:?}", other),
        }
        match &root.children[1] {
            Node::Paragraph(children) => {
                assert!(matches!(children[1], Node::Emphasis(_)));
                assert!(matches!(children[3], Node::Strong(_)));
                assert!(matches!(children[5], Node::Delete(_)));
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
        assert_eq!(root.children[2], Node::ThematicBreak);
        assert!(matches!(root.children[3], Node::Blockquote(_)));
    }

    #[test]
    fn test_code_block() {
        let root = parse("```js title=app.js\nconst a = 1;\n```\n");
        assert_eq!(
            root.children[0],
            Node::Code(Code {
                lang: Some("js".into()),
                meta: Some("title=app.js".into()),
                value: "const a = 1;".into(),
            })
        );
    }

    #[test]
    fn test_task_list_and_table() {
        let root = parse("- [x] done\n- [ ] todo\n\n| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        match &root.children[0] {
            Node::List { children, ordered, .. } => {
                assert!(!ordered);
                assert!(matches!(children[0], Node::ListItem { checked: Some(true), .. }));
                assert!(matches!(children[1], Node::ListItem { checked: Some(false), .. }));
            }
            other => panic!("expected list, got {:?}", other),
        }
        match &root.children[1] {
            Node::Table { align, children } => {
                assert_eq!(align, &vec![Align::Left, Align::Right]);
                assert!(matches!(children[0], Node::TableRow { header: true, .. }));
                assert!(matches!(children[1], Node::TableRow { header: false, .. }));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_across_directive() {
        let root = parse(":::note\nSee [the docs][docs].\n:::\n\n[docs]: https://example.org/docs \"Docs\"\n");
        let Node::Directive(directive) = &root.children[0] else {
            panic!("expected directive, got {:?}", root.children[0]);
        };
        let Node::Paragraph(children) = &directive.children[0] else {
            panic!("expected paragraph");
        };
        assert!(children.iter().any(|n| matches!(
            n,
            Node::Link { url, title, .. } if url == "https://example.org/docs" && title == "Docs"
        )));
    }

    #[test]
    fn test_footnotes_and_html() {
        let root = parse("Text[^1] <kbd>K</kbd>\n\n[^1]: Note\n\n<div>\nblock\n</div>\n");
        let Node::Paragraph(children) = &root.children[0] else {
            panic!("expected paragraph");
        };
        assert!(children.contains(&Node::FootnoteReference("1".into())));
        assert!(children.contains(&Node::Html("<kbd>".into())));
        assert!(matches!(root.children[1], Node::FootnoteDefinition { .. }));
        assert_eq!(root.children[2], Node::Html("<div>\nblock\n</div>\n".into()));
    }
}
