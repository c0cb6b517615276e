//! HTML syntax tree
//!
//! The document model every enrichment pass works on. Markdown is converted
//! into this tree, wrapped in the page layout, rewritten by the transformer
//! pipeline and finally serialised by [`render`].

mod render;
mod visit;

use indexmap::IndexMap;

pub use render::{render, render_fragment};
pub use visit::{
    append, find_element, insert_before, insert_before_stylesheets, prepend, Visit,
};

/// Attribute value of an element
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    /// Space separated token list (`class`, `rel`)
    List(Vec<String>),
}

impl PropValue {
    /// String form as it appears in the serialised attribute
    pub fn as_string(&self) -> String {
        match self {
            PropValue::Str(s) => s.clone(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::List(items) => items.join(" "),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        match self {
            PropValue::Str(s) => s.split_whitespace().any(|t| t == token),
            PropValue::List(items) => items.iter().any(|t| t == token),
            PropValue::Bool(_) => false,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        PropValue::Str(value.clone())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(value: Vec<String>) -> Self {
        PropValue::List(value)
    }
}

pub type Properties = IndexMap<String, PropValue>;

/// Attributes whose values are token lists
fn is_token_list(name: &str) -> bool {
    matches!(name, "class" | "rel")
}

/// An HTML element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub properties: Properties,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute (builder style)
    pub fn attr(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Add a class (builder style)
    pub fn class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Append a child (builder style)
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append children (builder style)
    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Append a text child (builder style)
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn set(&mut self, name: &str, value: impl Into<PropValue>) {
        let value = match value.into() {
            PropValue::Str(s) if is_token_list(name) => {
                PropValue::List(s.split_whitespace().map(str::to_string).collect())
            }
            other => other,
        };
        self.properties.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.properties.get(name)
    }

    /// Attribute value as a string, if present
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.properties.get(name).map(PropValue::as_string)
    }

    pub fn add_class(&mut self, class: &str) {
        match self.properties.get_mut("class") {
            Some(PropValue::List(items)) => {
                if !items.iter().any(|c| c == class) {
                    items.push(class.to_string());
                }
            }
            _ => {
                self.properties
                    .insert("class".to_string(), PropValue::List(vec![class.to_string()]));
            }
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.properties
            .get("class")
            .map(|v| v.contains(class))
            .unwrap_or(false)
    }

    /// Classes of this element
    pub fn classes(&self) -> Vec<String> {
        match self.properties.get("class") {
            Some(PropValue::List(items)) => items.clone(),
            Some(PropValue::Str(s)) => s.split_whitespace().map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            _ => {}
        }
    }
}

/// Shorthand for [`Element::new`]
pub fn h(tag: &str) -> Element {
    Element::new(tag)
}

/// A node of the HTML tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    /// Pre-rendered HTML, emitted verbatim
    Raw(String),
    Doctype,
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, tag: &str) -> bool {
        matches!(self, Node::Element(el) if el.tag == tag)
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

/// Root of an HTML tree (a fragment or a full document)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Root {
    pub children: Vec<Node>,
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// First element with the given tag, in document order
    pub fn find(&self, tag: &str) -> Option<&Element> {
        fn walk<'a>(nodes: &'a [Node], tag: &str) -> Option<&'a Element> {
            for node in nodes {
                if let Node::Element(el) = node {
                    if el.tag == tag {
                        return Some(el);
                    }
                    if let Some(found) = walk(&el.children, tag) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&self.children, tag)
    }

    /// All elements with the given tag, in document order
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        fn walk<'a>(nodes: &'a [Node], tag: &str, out: &mut Vec<&'a Element>) {
            for node in nodes {
                if let Node::Element(el) = node {
                    if el.tag == tag {
                        out.push(el);
                    }
                    walk(&el.children, tag, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, tag, &mut out);
        out
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}
