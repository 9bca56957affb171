//! Ready-made constructors over nodes.
//!
//! ```rust
//! use sutra_construct::ast::Node;
//! use sutra_construct::construct::{constructors, Constructor};
//! use sutra_construct::diagnostics::ReportCollector;
//!
//! let sink = ReportCollector::new();
//! assert_eq!(constructors::int().construct(&Node::value("123"), sink.reporter()), Some(123));
//! assert_eq!(constructors::int().construct(&Node::value("abcd"), sink.reporter()), None);
//! assert_eq!(sink.messages(), ["Expected int"]);
//! ```

use super::adapters::{generify_value, try_construct_with_message};
use super::{from_fn, Constructor};
use crate::ast::{Node, Primitive};
use crate::diagnostics::Reporter;

/// Returns the node itself.
pub fn identity() -> impl Constructor<Node, Node> {
    from_fn(|node: &Node, _: Reporter<'_>| Some(node.clone()))
}

/// Raw text of a primitive.
pub fn value() -> impl Constructor<Node, String> {
    generify_value(from_fn(|p: &Primitive, _: Reporter<'_>| {
        Some(p.value().to_string())
    }))
}

pub fn bool() -> impl Constructor<Node, bool> {
    generify_value(try_construct_with_message(Primitive::as_bool, "Expected bool", true))
}

pub fn int() -> impl Constructor<Node, i32> {
    generify_value(try_construct_with_message(Primitive::as_int, "Expected int", true))
}

pub fn long() -> impl Constructor<Node, i64> {
    generify_value(try_construct_with_message(Primitive::as_long, "Expected long", true))
}

pub fn float() -> impl Constructor<Node, f32> {
    generify_value(try_construct_with_message(Primitive::as_float, "Expected number", true))
}

pub fn double() -> impl Constructor<Node, f64> {
    generify_value(try_construct_with_message(Primitive::as_double, "Expected number", true))
}
