// src/extractors/document.rs

//! Typed view over a parsed HTML tree.
//!
//! Nodes are addressed by [`NodeHandle`], an index into the arena owned by the
//! parsed tree. Handles are `Copy` and only meaningful for the [`Document`]
//! that produced them; a foreign handle resolves to nothing rather than panicking.

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(NodeId);

pub struct Document {
    html: Html,
}

// Elements html5ever synthesises around any input, even an empty one.
const IMPLIED_ELEMENTS: [&str; 3] = ["html", "head", "body"];

impl Document {
    pub fn parse(source: &str) -> Self {
        Self { html: Html::parse_document(source) }
    }

    /// Markup errors html5ever recovered from while parsing.
    pub fn parse_error_count(&self) -> usize {
        self.html.errors.len()
    }

    /// True if the tree holds any text or any element beyond the implied skeleton.
    pub fn has_content(&self) -> bool {
        self.html.root_element().descendants().any(|node| match node.value() {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(el) => !IMPLIED_ELEMENTS.contains(&el.name()),
            _ => false,
        })
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeHandle> {
        self.html.select(selector).map(|el| NodeHandle(el.id())).collect()
    }

    /// Elements below `scope` matching `selector`, in document order.
    pub fn select_within(&self, scope: NodeHandle, selector: &Selector) -> Vec<NodeHandle> {
        self.element(scope)
            .map(|el| el.select(selector).map(|found| NodeHandle(found.id())).collect())
            .unwrap_or_default()
    }

    pub fn next_sibling(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node)?.next_sibling().map(|n| NodeHandle(n.id()))
    }

    /// Siblings after `node`, nearest first. Text and comment nodes included.
    pub fn following_siblings(&self, node: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        std::iter::successors(self.next_sibling(node), move |n| self.next_sibling(*n))
    }

    /// True if `node` is an element matching `selector`.
    pub fn matches(&self, node: NodeHandle, selector: &Selector) -> bool {
        self.element(node).is_some_and(|el| selector.matches(&el))
    }

    pub fn is_tag(&self, node: NodeHandle, tag: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.value().name().eq_ignore_ascii_case(tag))
    }

    /// First direct child text of `node` that is non-blank, trimmed.
    /// Text inside nested elements is not considered.
    pub fn direct_text(&self, node: NodeHandle) -> Option<String> {
        self.node(node)?.children().find_map(|child| match child.value() {
            Node::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        })
    }

    /// Extractable text of `node`: every descendant text fragment trimmed,
    /// blanks dropped, joined with single spaces. A text node yields its own
    /// trimmed text; comments and other nodes yield "".
    pub fn text_content(&self, node: NodeHandle) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        match n.value() {
            Node::Text(text) => text.trim().to_string(),
            Node::Element(_) => ElementRef::wrap(n)
                .map(|el| {
                    el.text()
                        .map(str::trim)
                        .filter(|fragment| !fragment.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn node(&self, handle: NodeHandle) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(handle.0)
    }

    fn element(&self, handle: NodeHandle) -> Option<ElementRef<'_>> {
        self.node(handle).and_then(ElementRef::wrap)
    }
}
