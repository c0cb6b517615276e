//! HTML serialisation
//!
//! Block level content is indented one level per nesting depth. Elements
//! holding phrasing content (any element not known to be block level, so
//! `svg`, `button` and custom tags too), and whitespace sensitive elements
//! such as `pre`, are written exactly as they are.

use super::{Element, Node, PropValue, Root};
use crate::helpers::escape_html;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements laid out one per line; anything else is phrasing content
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "base", "blockquote", "body", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "li", "link", "main", "menu",
    "meta", "nav", "noscript", "ol", "p", "pre", "script", "search", "section", "style",
    "summary", "table", "tbody", "td", "template", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Containers whose element children always go on their own line
const DOCUMENT_ELEMENTS: &[&str] = &["html", "head", "body"];

/// Elements whose content is kept byte for byte
const PRESERVE_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

/// Elements whose text content is not escaped
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const INDENT: &str = "  ";

/// Serialise a whole document, with block formatting
pub fn render(root: &Root) -> String {
    let mut out = String::new();
    let mut first = true;
    for node in &root.children {
        if is_blank(node) {
            continue;
        }
        if !first {
            out.push('\n');
        }
        first = false;
        write_node(node, &mut out, 0, true);
    }
    out.push('\n');
    out
}

/// Serialise a fragment without any formatting
pub fn render_fragment(root: &Root) -> String {
    let mut out = String::new();
    for node in &root.children {
        write_node(node, &mut out, 0, false);
    }
    out
}

fn is_blank(node: &Node) -> bool {
    matches!(node, Node::Text(t) if t.trim().is_empty())
}

/// Whether the children of `el` can be laid out one per line
fn formats_children(el: &Element) -> bool {
    if PRESERVE_ELEMENTS.contains(&el.tag.as_str()) {
        return false;
    }
    el.children.iter().all(|child| match child {
        Node::Text(t) => t.trim().is_empty(),
        Node::Element(child) => {
            DOCUMENT_ELEMENTS.contains(&el.tag.as_str())
                || BLOCK_ELEMENTS.contains(&child.tag.as_str())
        }
        Node::Comment(_) | Node::Raw(_) | Node::Doctype => true,
    }) && el.children.iter().any(|child| !is_blank(child))
}

fn write_node(node: &Node, out: &mut String, depth: usize, format: bool) {
    match node {
        Node::Element(el) => write_element(el, out, depth, format),
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Raw(html) => {
            if format {
                out.push_str(html.trim_end());
            } else {
                out.push_str(html);
            }
        }
        Node::Doctype => out.push_str("<!doctype html>"),
    }
}

fn write_element(el: &Element, out: &mut String, depth: usize, format: bool) {
    out.push('<');
    out.push_str(&el.tag);
    write_properties(el, out);
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    if RAW_TEXT_ELEMENTS.contains(&el.tag.as_str()) {
        for child in &el.children {
            match child {
                Node::Text(t) | Node::Raw(t) => out.push_str(t),
                other => write_node(other, out, depth, false),
            }
        }
    } else if format && formats_children(el) {
        for child in el.children.iter().filter(|c| !is_blank(c)) {
            out.push('\n');
            push_indent(out, depth + 1);
            write_node(child, out, depth + 1, true);
        }
        out.push('\n');
        push_indent(out, depth);
    } else {
        for child in &el.children {
            write_node(child, out, depth, false);
        }
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn write_properties(el: &Element, out: &mut String) {
    for (name, value) in &el.properties {
        match value {
            PropValue::Bool(false) => {}
            PropValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropValue::List(items) if items.is_empty() => {}
            value => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(&value.as_string()));
                out.push('"');
            }
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    escape_html(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::h;

    #[test]
    fn test_render_fragment() {
        let root = Root::new(vec![h("p")
            .text("a < b & ")
            .child(h("a").attr("href", "/x?a=1&b=\"2\"").text("link"))
            .child(h("br"))
            .into()]);
        assert_eq!(
            render_fragment(&root),
            r#"<p>a &lt; b &amp; <a href="/x?a=1&amp;b=&quot;2&quot;">link</a><br></p>"#
        );
    }

    #[test]
    fn test_boolean_and_list_properties() {
        let root = Root::new(vec![h("input")
            .attr("type", "checkbox")
            .attr("checked", true)
            .attr("disabled", false)
            .class("a")
            .class("b")
            .into()]);
        assert_eq!(
            render_fragment(&root),
            r#"<input type="checkbox" checked class="a b">"#
        );
    }

    #[test]
    fn test_render_formats_blocks() {
        let root = Root::new(vec![
            Node::Doctype,
            h("html")
                .child(h("head").child(h("title").text("Hi")))
                .child(
                    h("body")
                        .child(h("p").text("one ").child(h("em").text("two")))
                        .child(h("pre").child(h("code").text("a\n  b"))),
                )
                .into(),
        ]);

        let expected = [
            "<!doctype html>",
            "<html>",
            "  <head>",
            "    <title>Hi</title>",
            "  </head>",
            "  <body>",
            "    <p>one <em>two</em></p>",
            "    <pre><code>a\n  b</code></pre>",
            "  </body>",
            "</html>",
            "",
        ]
        .join("\n");
        assert_eq!(render(&root), expected);
    }

    #[test]
    fn test_inline_elements_are_not_formatted() {
        let root = Root::new(vec![h("body")
            .child(
                h("p").child(
                    h("svg").child(h("use").attr("href", "/img/sprites.svg#github")),
                ),
            )
            .child(h("note").child(h("label").child(h("input").attr("type", "checkbox"))))
            .child(h("button").text("Top"))
            .into()]);

        let expected = [
            "<body>",
            r##"  <p><svg><use href="/img/sprites.svg#github"></use></svg></p>"##,
            r#"  <note><label><input type="checkbox"></label></note>"#,
            "  <button>Top</button>",
            "</body>",
            "",
        ]
        .join("\n");
        assert_eq!(render(&root), expected);
    }

    #[test]
    fn test_script_is_not_escaped() {
        let root = Root::new(vec![h("script").text("if (a < b && c) {}").into()]);
        assert_eq!(render_fragment(&root), "<script>if (a < b && c) {}</script>");
    }
}
