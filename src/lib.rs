//! # Sutra Construct
//!
//! Condition-checked construction of typed values from generic trees.
//!
//! Input arrives as a [`Node`](ast::Node): a primitive, a list or an object,
//! each optionally named. Application code describes the shapes it accepts
//! and how to turn them into values:
//!
//! - [`construct::condition`]: size, arity and per-child type checks with
//!   soft warning thresholds
//! - [`construct::ConditionedConstructor`]: ordered arms dispatched by
//!   condition, with explicit ambiguity reporting
//! - [`construct::ConstructRule`]: name-keyed dispatch with base delegation
//! - [`eval`]: a small expression evaluator built from the pieces above
//!
//! Data problems never abort: a constructor returns `None` and explains why
//! through a [`Reporter`](diagnostics::Reporter). Schema mistakes surface as
//! [`SchemaError`](errors::SchemaError) when the schema is built.
//!
//! ```rust
//! use sutra_construct::ast::{List, Node};
//! use sutra_construct::construct::{generify_list, list_condition, Constructor};
//! use sutra_construct::diagnostics::ReportCollector;
//!
//! let pair = generify_list(
//!     list_condition(|c| c.size(2), |list: &List, _| {
//!         Some((list[0].to_string(), list[1].to_string()))
//!     })
//!     .unwrap(),
//! );
//!
//! let sink = ReportCollector::new();
//! let node = Node::list([Node::value("a"), Node::value("b")]);
//! assert_eq!(pair.construct(&node, sink.reporter()), Some(("a".into(), "b".into())));
//! assert_eq!(pair.construct(&Node::list([]), sink.reporter()), None);
//! assert_eq!(sink.messages(), ["Wrong size: expected exactly 2, provided 0"]);
//! ```

pub use crate::ast::{Node, Span, Spanned, TypeFlags};
pub use crate::construct::{ConditionedConstructor, ConstructRule, Constructor};
pub use crate::diagnostics::{Report, ReportCollector, ReportKind, Reporter};
pub use crate::errors::{CoerceError, ConstructError, SchemaError};

pub mod ast;
pub mod construct;
pub mod diagnostics;
pub mod errors;
pub mod eval;
