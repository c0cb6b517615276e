//! Markdown syntax tree
//!
//! pulldown-cmark's event stream is folded into an owned tree so that
//! passes can inspect and rewrite documents before they become HTML.
//! Directives (`:name`, `::name`, `:::name`) are part of the tree.

mod directive_syntax;
mod parser;

use indexmap::IndexMap;

use crate::hast;

pub use directive_syntax::parse_attributes;
pub use parser::{parse, parse_inline};

/// Column alignment of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Center => Some("center"),
            Align::Right => Some("right"),
        }
    }
}

/// A fenced or indented code block
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub lang: Option<String>,
    pub meta: Option<String>,
    pub value: String,
}

impl Code {
    /// Split a fence info string: the first word is the language
    pub fn from_info(info: &str, value: String) -> Self {
        let info = info.trim();
        let (lang, meta) = match info.split_once(char::is_whitespace) {
            Some((lang, meta)) => (lang, meta.trim()),
            None => (info, ""),
        };
        Self {
            lang: (!lang.is_empty()).then(|| lang.to_string()),
            meta: (!meta.is_empty()).then(|| meta.to_string()),
            value,
        }
    }

    /// `key=value` pairs of the meta string, separated by `;`
    pub fn meta_fields(&self) -> IndexMap<String, String> {
        let mut fields = IndexMap::new();
        if let Some(meta) = &self.meta {
            for part in meta.split(';') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                fields.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `:name[label]{attrs}` inside text
    Text,
    /// `::name[label]{attrs}` on its own line
    Leaf,
    /// `:::name[label]{attrs}` … `:::`
    Container,
}

/// A directive, the shortcode syntax of the content
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub name: String,
    pub attributes: IndexMap<String, String>,
    /// Label of a container directive (text and leaf labels are the children)
    pub label: Vec<Node>,
    pub children: Vec<Node>,
}

impl Directive {
    pub fn new(kind: DirectiveKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            attributes: IndexMap::new(),
            label: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A node of the Markdown tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Paragraph(Vec<Node>),
    Heading {
        depth: u8,
        id: Option<String>,
        classes: Vec<String>,
        children: Vec<Node>,
    },
    ThematicBreak,
    Blockquote(Vec<Node>),
    List {
        ordered: bool,
        start: Option<u64>,
        children: Vec<Node>,
    },
    ListItem {
        checked: Option<bool>,
        children: Vec<Node>,
    },
    Code(Code),
    Html(String),
    Text(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Delete(Vec<Node>),
    InlineCode(String),
    Break,
    Link {
        url: String,
        title: String,
        children: Vec<Node>,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    FootnoteReference(String),
    FootnoteDefinition {
        label: String,
        children: Vec<Node>,
    },
    Table {
        align: Vec<Align>,
        children: Vec<Node>,
    },
    TableRow {
        header: bool,
        children: Vec<Node>,
    },
    TableCell(Vec<Node>),
    DefinitionList(Vec<Node>),
    DefinitionTerm(Vec<Node>),
    DefinitionDescription(Vec<Node>),
    Directive(Directive),
    /// Output of directive dispatch, already HTML
    Hast(hast::Node),
}

impl Node {
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Paragraph(c)
            | Node::Blockquote(c)
            | Node::Emphasis(c)
            | Node::Strong(c)
            | Node::Delete(c)
            | Node::TableCell(c)
            | Node::DefinitionList(c)
            | Node::DefinitionTerm(c)
            | Node::DefinitionDescription(c) => Some(c),
            Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. }
            | Node::Table { children, .. }
            | Node::TableRow { children, .. } => Some(children),
            Node::Directive(d) => Some(&d.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph(c)
            | Node::Blockquote(c)
            | Node::Emphasis(c)
            | Node::Strong(c)
            | Node::Delete(c)
            | Node::TableCell(c)
            | Node::DefinitionList(c)
            | Node::DefinitionTerm(c)
            | Node::DefinitionDescription(c) => Some(c),
            Node::Heading { children, .. }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. }
            | Node::Table { children, .. }
            | Node::TableRow { children, .. } => Some(children),
            Node::Directive(d) => Some(&mut d.children),
            _ => None,
        }
    }
}

/// The document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Root {
    pub children: Vec<Node>,
}

/// Text content of a node
pub fn to_string(node: &Node) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

/// Text content of a list of nodes
pub fn nodes_to_string(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        push_text(node, &mut out);
    }
    out
}

fn push_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) | Node::InlineCode(t) => out.push_str(t),
        Node::Code(code) => out.push_str(&code.value),
        Node::Image { alt, .. } => out.push_str(alt),
        Node::Break => out.push('\n'),
        Node::Hast(node) => {
            if let hast::Node::Element(el) = node {
                out.push_str(&el.text_content());
            }
        }
        Node::Directive(d) => {
            for child in d.label.iter().chain(&d.children) {
                push_text(child, out);
            }
        }
        other => {
            if let Some(children) = other.children() {
                for child in children {
                    push_text(child, out);
                }
            }
        }
    }
}

fn find_title(nodes: &[Node]) -> Option<&Node> {
    for node in nodes {
        if matches!(node, Node::Heading { depth: 1, .. }) {
            return Some(node);
        }
        if let Some(found) = node.children().and_then(|c| find_title(c)) {
            return Some(found);
        }
    }
    None
}

/// Text of the first depth-1 heading (empty if there is none)
pub fn document_title(root: &Root) -> String {
    find_title(&root.children)
        .map(to_string)
        .unwrap_or_default()
}

/// Remove the first depth-1 heading; returns whether one was found
pub fn remove_document_title(root: &mut Root) -> bool {
    fn remove(nodes: &mut Vec<Node>) -> bool {
        if let Some(index) = nodes
            .iter()
            .position(|n| matches!(n, Node::Heading { depth: 1, .. }))
        {
            nodes.remove(index);
            return true;
        }
        nodes
            .iter_mut()
            .filter_map(Node::children_mut)
            .any(remove)
    }
    remove(&mut root.children)
}
