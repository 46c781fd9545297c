//! Content tree produced by parsing a description document.
//!
//! The shape follows API Elements: a `parseResult` root holding an `api`
//! category, resources, transitions, HTTP transactions and annotations.

use std::collections::BTreeMap;

/// Element kind of a [`ContentNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    ParseResult,
    Category,
    Resource,
    Transition,
    HttpTransaction,
    HttpRequest,
    HttpResponse,
    Annotation,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::ParseResult => "parseResult",
            ElementKind::Category => "category",
            ElementKind::Resource => "resource",
            ElementKind::Transition => "transition",
            ElementKind::HttpTransaction => "httpTransaction",
            ElementKind::HttpRequest => "httpRequest",
            ElementKind::HttpResponse => "httpResponse",
            ElementKind::Annotation => "annotation",
            ElementKind::Other(name) => name,
        }
    }
}

impl From<&str> for ElementKind {
    fn from(name: &str) -> Self {
        match name {
            "parseResult" => ElementKind::ParseResult,
            "category" => ElementKind::Category,
            "resource" => ElementKind::Resource,
            "transition" => ElementKind::Transition,
            "httpTransaction" => ElementKind::HttpTransaction,
            "httpRequest" => ElementKind::HttpRequest,
            "httpResponse" => ElementKind::HttpResponse,
            "annotation" => ElementKind::Annotation,
            other => ElementKind::Other(other.to_string()),
        }
    }
}

/// Value of a named attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A literal string, comparable as-is.
    Text(String),
    /// Any other element (references, templated values, arrays...).
    Element(ContentNode),
}

/// A tagged node of the content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub kind: ElementKind,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, AttrValue>,
    pub text: Option<String>,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.to_string(), AttrValue::Text(value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        self.children = children;
        self
    }

    /// Literal string value of an attribute, `None` if absent or not a literal.
    pub fn attr_text(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name)? {
            AttrValue::Text(value) => Some(value),
            AttrValue::Element(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A node found by [`find_all`], with its index path below the search root.
#[derive(Debug, Clone)]
pub struct Found<'a> {
    pub position: Vec<usize>,
    pub node: &'a ContentNode,
}

/// Depth-first, pre-order search of `root`'s descendants.
///
/// Every node is descended into whether or not it matched, so a match
/// nested inside another match is reported as well. `root` itself is
/// never tested.
pub fn find_all<'a>(
    root: &'a ContentNode,
    mut predicate: impl FnMut(&ContentNode) -> bool,
) -> Vec<Found<'a>> {
    let mut found = Vec::new();
    let mut stack: Vec<(Vec<usize>, &'a ContentNode)> = root
        .children
        .iter()
        .enumerate()
        .rev()
        .map(|(i, child)| (vec![i], child))
        .collect();

    while let Some((position, node)) = stack.pop() {
        for (i, child) in node.children.iter().enumerate().rev() {
            let mut child_position = position.clone();
            child_position.push(i);
            stack.push((child_position, child));
        }
        if predicate(node) {
            found.push(Found { position, node });
        }
    }

    found
}

/// All descendants of `root` of the given kind, in document order.
pub fn find_kind<'a>(root: &'a ContentNode, kind: &ElementKind) -> Vec<Found<'a>> {
    find_all(root, |node| &node.kind == kind)
}

/// First descendant of `root` of the given kind, in document order.
pub fn find_first<'a>(root: &'a ContentNode, kind: &ElementKind) -> Option<&'a ContentNode> {
    find_kind(root, kind).into_iter().next().map(|f| f.node)
}
