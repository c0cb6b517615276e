//! Tree visiting and insertion helpers

use super::{Element, Node, Root};

/// What to do after visiting a matched element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep going, including into the element's children
    Continue,
    /// Keep going, but do not descend into the element
    Skip,
    /// Stop visiting
    Stop,
}

/// Visit elements matching `matcher` in document order.
///
/// The callback gets the parent's children and the index of the matched
/// element, so it can replace, remove or insert siblings.
pub fn find_element<M, F>(root: &mut Root, matcher: M, mut callback: F)
where
    M: Fn(&Element) -> bool,
    F: FnMut(&mut Vec<Node>, usize) -> Visit,
{
    walk(&mut root.children, &matcher, &mut callback);
}

/// Returns true when visiting was stopped
fn walk<M, F>(children: &mut Vec<Node>, matcher: &M, callback: &mut F) -> bool
where
    M: Fn(&Element) -> bool,
    F: FnMut(&mut Vec<Node>, usize) -> Visit,
{
    let mut i = 0;
    while i < children.len() {
        let matched = matches!(&children[i], Node::Element(el) if matcher(el));
        let mut descend = true;

        if matched {
            match callback(children, i) {
                Visit::Stop => return true,
                Visit::Skip => descend = false,
                Visit::Continue => {}
            }
        }

        if descend && i < children.len() {
            if let Node::Element(el) = &mut children[i] {
                if walk(&mut el.children, matcher, callback) {
                    return true;
                }
            }
        }

        i += 1;
    }
    false
}

/// Append nodes to the first element with the given tag
pub fn append(root: &mut Root, tag: &str, nodes: Vec<Node>) {
    let mut nodes = Some(nodes);
    find_element(
        root,
        |el| el.tag == tag,
        |children, index| {
            if let (Some(el), Some(nodes)) = (children[index].as_element_mut(), nodes.take()) {
                el.children.extend(nodes);
            }
            Visit::Stop
        },
    );
}

/// Prepend nodes to the first element with the given tag
pub fn prepend(root: &mut Root, tag: &str, nodes: Vec<Node>) {
    let mut nodes = Some(nodes);
    find_element(
        root,
        |el| el.tag == tag,
        |children, index| {
            if let (Some(el), Some(nodes)) = (children[index].as_element_mut(), nodes.take()) {
                let rest = std::mem::replace(&mut el.children, nodes);
                el.children.extend(rest);
            }
            Visit::Stop
        },
    );
}

/// Insert a node right before the first element matching `matcher`
pub fn insert_before<M>(root: &mut Root, matcher: M, node: Node) -> bool
where
    M: Fn(&Element) -> bool,
{
    let mut node = Some(node);
    find_element(root, matcher, |children, index| {
        if let Some(node) = node.take() {
            children.insert(index, node);
        }
        Visit::Stop
    });
    node.is_none()
}

/// Insert a node right before the first stylesheet link
pub fn insert_before_stylesheets(root: &mut Root, node: Node) -> bool {
    insert_before(
        root,
        |el| {
            el.tag == "link"
                && el
                    .get("rel")
                    .map(|rel| rel.contains("stylesheet"))
                    .unwrap_or(false)
        },
        node,
    )
}
