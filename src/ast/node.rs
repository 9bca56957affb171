use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;

use super::{Span, Spanned};

/// A node of the generic DSL tree.
///
/// Nodes are immutable once built. Structural equality ignores spans, so two
/// trees parsed from different places compare equal when their shape and
/// values do.
///
/// # Examples
///
/// ```rust
/// use sutra_construct::ast::Node;
/// let sum = Node::named_list("+", [Node::value("1"), Node::value("2")]);
/// assert!(sum.is_list());
/// assert_eq!(sum.name(), Some("+"));
/// assert_eq!(sum.to_string(), "+[1, 2]");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Primitive(Primitive),
    List(List),
    Object(Object),
}

/// A primitive leaf. The raw text is kept as written; typed views are in
/// [`crate::ast::value`].
#[derive(Debug, Clone)]
pub struct Primitive {
    value: String,
    span: Span,
}

/// An ordered sequence of nodes with an optional name tag.
#[derive(Debug, Clone)]
pub struct List {
    name: Option<String>,
    items: Vec<Node>,
    span: Span,
}

/// A keyed collection of nodes with an optional name tag.
#[derive(Debug, Clone)]
pub struct Object {
    name: Option<String>,
    properties: IndexMap<String, Node>,
    span: Span,
}

// ============================================================================
// NODE
// ============================================================================

impl Node {
    pub fn value(value: impl Into<String>) -> Node {
        Node::Primitive(Primitive::new(value))
    }

    pub fn list(items: impl IntoIterator<Item = Node>) -> Node {
        Node::List(List::new(None, items))
    }

    pub fn named_list(name: impl Into<String>, items: impl IntoIterator<Item = Node>) -> Node {
        Node::List(List::new(Some(name.into()), items))
    }

    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, Node)>) -> Node {
        Node::Object(Object::new(None, properties))
    }

    pub fn named_object<K: Into<String>>(
        name: impl Into<String>,
        properties: impl IntoIterator<Item = (K, Node)>,
    ) -> Node {
        Node::Object(Object::new(Some(name.into()), properties))
    }

    /// Returns the same node positioned at `span`.
    pub fn with_span(self, span: Span) -> Node {
        match self {
            Node::Primitive(p) => Node::Primitive(Primitive { span, ..p }),
            Node::List(l) => Node::List(List { span, ..l }),
            Node::Object(o) => Node::Object(Object { span, ..o }),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Node::Primitive(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Node::Object(_))
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Node::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Name tag of a list or object. Primitives are never named.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Primitive(_) => None,
            Node::List(l) => l.name(),
            Node::Object(o) => o.name(),
        }
    }

    /// Returns the shape of the node as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Primitive(_) => "primitive",
            Node::List(_) => "list",
            Node::Object(_) => "object",
        }
    }
}

impl Spanned for Node {
    fn span(&self) -> Span {
        match self {
            Node::Primitive(p) => p.span,
            Node::List(l) => l.span,
            Node::Object(o) => o.span,
        }
    }
}

impl Node {
    pub fn span(&self) -> Span {
        Spanned::span(self)
    }
}

impl From<Primitive> for Node {
    fn from(p: Primitive) -> Self {
        Node::Primitive(p)
    }
}

impl From<List> for Node {
    fn from(l: List) -> Self {
        Node::List(l)
    }
}

impl From<Object> for Node {
    fn from(o: Object) -> Self {
        Node::Object(o)
    }
}

// ============================================================================
// PRIMITIVE
// ============================================================================

impl Primitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            span: Span::default(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Spanned for Primitive {
    fn span(&self) -> Span {
        self.span
    }
}

// ============================================================================
// LIST
// ============================================================================

impl List {
    pub fn new(name: Option<String>, items: impl IntoIterator<Item = Node>) -> Self {
        Self {
            name,
            items: items.into_iter().collect(),
            span: Span::default(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.items == other.items
    }
}

impl Spanned for List {
    fn span(&self) -> Span {
        self.span
    }
}

/// Positional access. Only used once a condition has guaranteed the index
/// exists; out-of-range access is a programming error and panics.
impl Index<usize> for List {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ============================================================================
// OBJECT
// ============================================================================

impl Object {
    pub fn new<K: Into<String>>(
        name: Option<String>,
        properties: impl IntoIterator<Item = (K, Node)>,
    ) -> Self {
        Self {
            name,
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
            span: Span::default(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn property(&self, key: &str) -> Option<&Node> {
        self.properties.get(key)
    }

    /// Returns the property, panicking when it is absent.
    ///
    /// Use only after a condition has verified the property is present.
    pub fn expect_property(&self, key: &str) -> &Node {
        match self.properties.get(key) {
            Some(node) => node,
            None => panic!("property '{key}' is absent; it should have been checked beforehand"),
        }
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        // Key order is irrelevant for equality.
        self.name == other.name
            && self.properties.len() == other.properties.len()
            && self
                .properties
                .iter()
                .all(|(k, v)| other.properties.get(k) == Some(v))
    }
}

impl Spanned for Object {
    fn span(&self) -> Span {
        self.span
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Primitive(p) => write!(f, "{p}"),
            Node::List(l) => write!(f, "{l}"),
            Node::Object(o) => write!(f, "{o}"),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            f.write_str(name)?;
        }
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            f.write_str(name)?;
        }
        write!(f, "{{")?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_spans() {
        let a = Node::value("1").with_span(Span::new(0, 1));
        let b = Node::value("1").with_span(Span::new(10, 11));
        assert_eq!(a, b);
    }

    #[test]
    fn object_equality_ignores_key_order() {
        let a = Node::object([("x", Node::value("1")), ("y", Node::value("2"))]);
        let b = Node::object([("y", Node::value("2")), ("x", Node::value("1"))]);
        assert_eq!(a, b);
        let named = Node::named_object("pos", [("x", Node::value("1")), ("y", Node::value("2"))]);
        assert_ne!(a, named);
    }

    #[test]
    fn display_forms() {
        let node = Node::named_object(
            "person",
            [
                ("name", Node::value("Jane")),
                ("notes", Node::list([Node::value("a"), Node::value("b")])),
            ],
        );
        assert_eq!(node.to_string(), "person{name: Jane, notes: [a, b]}");
    }

    #[test]
    fn list_access() {
        let list = List::new(None, [Node::value("a"), Node::value("b")]);
        assert_eq!(list.len(), 2);
        assert!(!list.has_name());
        assert_eq!(list[1], Node::value("b"));
        assert!(list.get(2).is_none());
    }

    #[test]
    #[should_panic(expected = "property 'missing' is absent")]
    fn expect_property_panics_when_absent() {
        let obj = Object::new(None, [("present", Node::value("1"))]);
        obj.expect_property("missing");
    }
}
