//! Directive syntax
//!
//! Leaf (`::name`) and container (`:::name` … `:::`) directives are found
//! line by line before the Markdown is handed to pulldown-cmark. Text
//! directives (`:name[label]{attrs}`) and the legacy `[[NAME]]` paragraph
//! form are lifted out of the parsed tree afterwards.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;

use super::parser::{parse_inline_with, Definitions};
use super::{Directive, DirectiveKind, Node};

lazy_static! {
    static ref CONTAINER_OPEN: Regex =
        Regex::new(r"^ {0,3}(:{3,})([A-Za-z][A-Za-z0-9_-]*)(.*)$").unwrap();
    static ref CONTAINER_CLOSE: Regex = Regex::new(r"^ {0,3}(:{3,})[ \t]*$").unwrap();
    static ref LEAF: Regex = Regex::new(r"^ {0,3}::([A-Za-z][A-Za-z0-9_-]*)(.*)$").unwrap();
    static ref NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*").unwrap();
    static ref LEGACY: Regex = Regex::new(r"^\[\[([A-Za-z][A-Za-z0-9_-]*)\]\]$").unwrap();
}

/// Directive as written, before its label is parsed
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawDirective {
    pub name: String,
    pub label: Option<String>,
    pub attributes: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Markdown(String),
    Leaf(RawDirective),
    Container(RawDirective, Vec<Segment>),
}

/// Tracks fenced code blocks while scanning lines
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Whether the line belongs to a fenced code block (fences included)
    pub fn is_code(&mut self, line: &str) -> bool {
        let line = line.trim_end_matches(['\n', '\r']);
        let indent = line.len() - line.trim_start_matches(' ').len();
        let trimmed = &line[indent..];
        let fence = if indent <= 3 { fence_run(trimmed) } else { None };

        match self.open {
            Some((ch, len)) => {
                if let Some((c, n)) = fence {
                    if c == ch && n >= len && trimmed[n..].trim().is_empty() {
                        self.open = None;
                    }
                }
                true
            }
            None => match fence {
                Some(('`', n)) if trimmed[n..].contains('`') => false,
                Some(open) => {
                    self.open = Some(open);
                    true
                }
                None => false,
            },
        }
    }
}

fn fence_run(s: &str) -> Option<(char, usize)> {
    let c = s.chars().next()?;
    if c != '`' && c != '~' {
        return None;
    }
    let n = s.chars().take_while(|&x| x == c).count();
    (n >= 3).then_some((c, n))
}

/// Split a document into Markdown runs and leaf/container directives
pub(crate) fn split_blocks(src: &str) -> Vec<Segment> {
    let lines: Vec<&str> = src.split_inclusive('\n').collect();
    let mut pos = 0;
    split_lines(&lines, &mut pos, None)
}

fn split_lines(lines: &[&str], pos: &mut usize, close_len: Option<usize>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut markdown = String::new();
    let mut fences = FenceTracker::default();

    fn flush(markdown: &mut String, segments: &mut Vec<Segment>) {
        let text = std::mem::take(markdown);
        if !text.trim().is_empty() {
            segments.push(Segment::Markdown(text));
        }
    }

    while *pos < lines.len() {
        let line = lines[*pos];
        *pos += 1;

        if fences.is_code(line) {
            markdown.push_str(line);
            continue;
        }
        let content = line.trim_end_matches(['\n', '\r']);

        if let Some(len) = close_len {
            if let Some(caps) = CONTAINER_CLOSE.captures(content) {
                if caps[1].len() >= len {
                    flush(&mut markdown, &mut segments);
                    return segments;
                }
            }
        }

        if let Some(caps) = CONTAINER_OPEN.captures(content) {
            if let Some((label, attributes)) = parse_tail(&caps[3]) {
                flush(&mut markdown, &mut segments);
                let raw = RawDirective {
                    name: caps[2].to_string(),
                    label,
                    attributes,
                };
                let children = split_lines(lines, pos, Some(caps[1].len()));
                segments.push(Segment::Container(raw, children));
                continue;
            }
        }

        if let Some(caps) = LEAF.captures(content) {
            if let Some((label, attributes)) = parse_tail(&caps[2]) {
                flush(&mut markdown, &mut segments);
                segments.push(Segment::Leaf(RawDirective {
                    name: caps[1].to_string(),
                    label,
                    attributes,
                }));
                continue;
            }
        }

        markdown.push_str(line);
    }

    flush(&mut markdown, &mut segments);
    segments
}

/// `[label]{attrs}` after a directive name; nothing else may follow
fn parse_tail(rest: &str) -> Option<(Option<String>, IndexMap<String, String>)> {
    let (label, rest) = take_label(rest)?;
    let (attributes, rest) = take_attributes(rest)?;
    rest.trim().is_empty().then_some((label, attributes))
}

fn take_label(s: &str) -> Option<(Option<String>, &str)> {
    if !s.starts_with('[') {
        return Some((None, s));
    }
    let mut depth = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some((Some(s[1..i].to_string()), &s[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

fn take_attributes(s: &str) -> Option<(IndexMap<String, String>, &str)> {
    if !s.starts_with('{') {
        return Some((IndexMap::new(), s));
    }
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '}') => return Some((parse_attributes(&s[1..i]), &s[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Parse directive attributes: `#id`, `.class`, `key=value`, `key="value"`, `key`
pub fn parse_attributes(input: &str) -> IndexMap<String, String> {
    let mut attributes = IndexMap::new();
    let mut classes: Vec<String> = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&c) = chars.peek() else {
            break;
        };
        match c {
            '#' => {
                chars.next();
                let id = take_while(&mut chars, |c| !c.is_whitespace() && c != '.' && c != '#');
                if !id.is_empty() {
                    attributes.insert("id".to_string(), id);
                }
            }
            '.' => {
                chars.next();
                let class = take_while(&mut chars, |c| !c.is_whitespace() && c != '.' && c != '#');
                if !class.is_empty() {
                    classes.push(class);
                }
            }
            _ => {
                let key = take_while(&mut chars, |c| !c.is_whitespace() && c != '=');
                if key.is_empty() {
                    chars.next();
                    continue;
                }
                let value = if chars.peek() == Some(&'=') {
                    chars.next();
                    take_value(&mut chars)
                } else {
                    String::new()
                };
                attributes.insert(key, value);
            }
        }
    }

    if !classes.is_empty() {
        let mut all: Vec<String> = attributes
            .get("class")
            .map(|existing| existing.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        all.extend(classes);
        attributes.insert("class".to_string(), all.join(" "));
    }

    attributes
}

fn take_while(chars: &mut Peekable<Chars<'_>>, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !keep(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn take_value(chars: &mut Peekable<Chars<'_>>) -> String {
    match chars.peek().copied() {
        Some(q @ ('"' | '\'')) => {
            chars.next();
            let value = take_while(chars, |c| c != q);
            chars.next();
            value
        }
        _ => take_while(chars, |c| !c.is_whitespace()),
    }
}

/// Replace legacy `[[NAME]]` paragraphs and text directives in a tree
pub(crate) fn lift_inline_directives(nodes: &mut Vec<Node>, definitions: &Definitions) {
    for node in nodes.iter_mut() {
        if let Some(name) = legacy_name(node) {
            *node = Node::Directive(Directive::new(DirectiveKind::Leaf, &name));
            continue;
        }
        match node {
            Node::Code(_) | Node::InlineCode(_) | Node::Html(_) | Node::Hast(_) => {}
            Node::Directive(directive) => {
                lift_inline_directives(&mut directive.label, definitions);
                lift_inline_directives(&mut directive.children, definitions);
            }
            other => {
                if let Some(children) = other.children_mut() {
                    lift_inline_directives(children, definitions);
                }
            }
        }
    }

    if !nodes.iter().any(|n| matches!(n, Node::Text(t) if t.contains(':'))) {
        return;
    }

    let mut out = Vec::with_capacity(nodes.len());
    for node in std::mem::take(nodes) {
        match node {
            Node::Text(text) => {
                let at_start = match out.last() {
                    None | Some(Node::Break) => true,
                    Some(Node::Text(prev)) => prev.ends_with(char::is_whitespace),
                    Some(_) => false,
                };
                out.extend(split_text(&text, at_start, definitions));
            }
            node => out.push(node),
        }
    }
    *nodes = out;
}

fn legacy_name(node: &Node) -> Option<String> {
    match node {
        Node::Paragraph(children) => match children.as_slice() {
            [Node::Text(text)] => LEGACY
                .captures(text.trim())
                .map(|caps| caps[1].to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Split a text run around the text directives it contains
fn split_text(text: &str, at_start: bool, definitions: &Definitions) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut last = 0;
    let mut search = 0;

    while let Some(offset) = text[search..].find(':') {
        let pos = search + offset;
        search = pos + 1;

        let boundary = if pos == 0 {
            at_start
        } else {
            text[..pos]
                .chars()
                .next_back()
                .map_or(false, char::is_whitespace)
        };
        if !boundary {
            continue;
        }

        let Some((directive, len)) = parse_text_directive(&text[pos + 1..], definitions) else {
            continue;
        };
        if pos > last {
            nodes.push(Node::Text(text[last..pos].to_string()));
        }
        nodes.push(Node::Directive(directive));
        last = pos + 1 + len;
        search = last;
    }

    if last < text.len() {
        nodes.push(Node::Text(text[last..].to_string()));
    }
    nodes
}

/// Parse `name[label]{attrs}`; returns the directive and the bytes consumed
fn parse_text_directive(s: &str, definitions: &Definitions) -> Option<(Directive, usize)> {
    let name = NAME.find(s)?.as_str();
    let rest = &s[name.len()..];
    let (label, rest) = take_label(rest)?;
    let (attributes, rest) = take_attributes(rest)?;

    let mut directive = Directive::new(DirectiveKind::Text, name);
    directive.attributes = attributes;
    if let Some(label) = label {
        directive.children = parse_inline_with(&label, definitions);
    }
    Some((directive, s.len() - rest.len()))
}
