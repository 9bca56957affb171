//! Shape filters used by conditions.
//!
//! A [`TypeFlags`] value is a small bitmask over the node families. It is
//! fixed and not user-extensible.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::Node;

bitflags! {
    /// Set of node shapes accepted at a position or key.
    ///
    /// # Example
    ///
    /// ```
    /// use sutra_construct::ast::{Node, TypeFlags};
    ///
    /// let flags = TypeFlags::PRIMITIVE | TypeFlags::UNNAMED_LIST;
    /// assert!(flags.matches(&Node::value("1")));
    /// assert!(flags.matches(&Node::list([])));
    /// assert!(!flags.matches(&Node::named_list("+", [])));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TypeFlags: u8 {
        const PRIMITIVE = 1 << 0;
        const UNNAMED_LIST = 1 << 1;
        const NAMED_LIST = 1 << 2;
        const LIST = Self::UNNAMED_LIST.bits() | Self::NAMED_LIST.bits();
        const UNNAMED_OBJECT = 1 << 3;
        const NAMED_OBJECT = 1 << 4;
        const OBJECT = Self::UNNAMED_OBJECT.bits() | Self::NAMED_OBJECT.bits();
        const ANY = Self::PRIMITIVE.bits() | Self::LIST.bits() | Self::OBJECT.bits();
    }
}

impl TypeFlags {
    /// The single most specific flag describing `node`.
    pub fn of(node: &Node) -> TypeFlags {
        match node {
            Node::Primitive(_) => TypeFlags::PRIMITIVE,
            Node::List(l) if l.has_name() => TypeFlags::NAMED_LIST,
            Node::List(_) => TypeFlags::UNNAMED_LIST,
            Node::Object(o) if o.has_name() => TypeFlags::NAMED_OBJECT,
            Node::Object(_) => TypeFlags::UNNAMED_OBJECT,
        }
    }

    /// Drops bits outside the known families. An empty result is an
    /// always-false filter and is rejected by condition builders.
    pub fn normalize(bits: u8) -> TypeFlags {
        TypeFlags::from_bits_truncate(bits)
    }

    pub fn matches(self, node: &Node) -> bool {
        self.intersects(TypeFlags::of(node))
    }

    pub fn is_any(self) -> bool {
        self.contains(TypeFlags::ANY)
    }
}

impl Default for TypeFlags {
    fn default() -> Self {
        TypeFlags::ANY
    }
}

/// Free-standing match test.
pub fn matches(flags: TypeFlags, node: &Node) -> bool {
    flags.matches(node)
}

impl fmt::Display for TypeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("anything");
        }
        let mut words = Vec::new();
        if self.contains(TypeFlags::PRIMITIVE) {
            words.push("primitive");
        }
        if self.contains(TypeFlags::LIST) {
            words.push("list");
        } else if self.contains(TypeFlags::UNNAMED_LIST) {
            words.push("unnamed list");
        } else if self.contains(TypeFlags::NAMED_LIST) {
            words.push("named list");
        }
        if self.contains(TypeFlags::OBJECT) {
            words.push("object");
        } else if self.contains(TypeFlags::UNNAMED_OBJECT) {
            words.push("unnamed object");
        } else if self.contains(TypeFlags::NAMED_OBJECT) {
            words.push("named object");
        }
        if words.is_empty() {
            return f.write_str("nothing");
        }
        f.write_str(&words.join(" or "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_is_most_specific() {
        assert_eq!(TypeFlags::of(&Node::value("x")), TypeFlags::PRIMITIVE);
        assert_eq!(TypeFlags::of(&Node::list([])), TypeFlags::UNNAMED_LIST);
        assert_eq!(TypeFlags::of(&Node::named_list("a", [])), TypeFlags::NAMED_LIST);
        assert_eq!(
            TypeFlags::of(&Node::object::<&str>([])),
            TypeFlags::UNNAMED_OBJECT
        );
    }

    #[test]
    fn any_matches_everything() {
        for node in [
            Node::value("x"),
            Node::list([]),
            Node::named_list("n", []),
            Node::named_object::<&str>("o", []),
        ] {
            assert!(TypeFlags::ANY.matches(&node));
            assert!(matches(TypeFlags::ANY, &node));
        }
    }

    #[test]
    fn list_covers_named_and_unnamed() {
        assert!(TypeFlags::LIST.matches(&Node::list([])));
        assert!(TypeFlags::LIST.matches(&Node::named_list("n", [])));
        assert!(!TypeFlags::LIST.matches(&Node::value("n")));
    }

    #[test]
    fn normalize_truncates_unknown_bits() {
        assert!(TypeFlags::normalize(0b1100_0000).is_empty());
        assert_eq!(TypeFlags::normalize(0b1000_0001), TypeFlags::PRIMITIVE);
    }

    #[test]
    fn display_words() {
        assert_eq!(TypeFlags::ANY.to_string(), "anything");
        assert_eq!(
            (TypeFlags::PRIMITIVE | TypeFlags::LIST).to_string(),
            "primitive or list"
        );
        assert_eq!(TypeFlags::UNNAMED_LIST.to_string(), "unnamed list");
        assert_eq!(TypeFlags::empty().to_string(), "nothing");
    }
}
