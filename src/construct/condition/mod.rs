//! Shape predicates over lists and objects.
//!
//! A condition combines a hard size range, an optional soft (warning-only)
//! size range and per-position or per-key [`TypeFlags`] constraints. Testing
//! with a silent [`Reporter`] is a cheap probe that may stop at the first
//! failure; testing with an active reporter reports every problem found.
//!
//! Conditions are assembled by builders that validate the schema once, at
//! build time:
//!
//! ```rust
//! use sutra_construct::ast::{Node, TypeFlags};
//! use sutra_construct::construct::condition::{Condition, ListCondition};
//!
//! let pair = ListCondition::builder()
//!     .size(2)
//!     .all_elements(TypeFlags::PRIMITIVE)
//!     .build()
//!     .unwrap();
//! let node = Node::list([Node::value("1"), Node::value("2")]);
//! assert!(pair.matches(node.as_list().unwrap()));
//! ```
//!
//! [`TypeFlags`]: crate::ast::TypeFlags

use std::fmt;

use crate::ast::{List, Object, Spanned};
use crate::diagnostics::Reporter;
use crate::errors::SchemaError;

mod list;
mod object;
mod size;

pub use list::{ListCondition, ListConditionBuilder};
pub use object::{ObjectCondition, ObjectConditionBuilder, PropertiesWarnText};
pub use size::{SizeCheck, SizeRange, WarnText};

/// A predicate over one node shape.
///
/// `Display` is the human-readable description used when a conditioned
/// constructor lists the alternatives it tried.
pub trait Condition<S>: fmt::Display + Send + Sync {
    /// Tests `input`, reporting every violation to `reports`.
    ///
    /// Returns `true` when the input satisfies the hard constraints. Soft
    /// violations emit warnings but still return `true`.
    fn test(&self, input: &S, reports: Reporter<'_>) -> bool;

    /// Silent probe.
    fn matches(&self, input: &S) -> bool {
        self.test(input, Reporter::silent())
    }
}

/// Fluent assembly of a condition, validated on `finish`.
pub trait ConditionBuilder: Default {
    type Condition;

    fn finish(self) -> Result<Self::Condition, SchemaError>;
}

/// A node shape that conditioned constructors can dispatch over.
pub trait Shape: Spanned + Sized + Send + Sync + 'static {
    type Condition: Condition<Self> + 'static;
    type Builder: ConditionBuilder<Condition = Self::Condition>;

    /// Human-readable shape name.
    const NAME: &'static str;

    fn size(&self) -> usize;
}

impl Shape for List {
    type Condition = ListCondition;
    type Builder = ListConditionBuilder;

    const NAME: &'static str = "list";

    fn size(&self) -> usize {
        self.len()
    }
}

impl Shape for Object {
    type Condition = ObjectCondition;
    type Builder = ObjectConditionBuilder;

    const NAME: &'static str = "object";

    fn size(&self) -> usize {
        self.len()
    }
}

/// Shared fluent size methods of the condition builders.
///
/// Expects a `sizes: SizeCheck` field on the builder.
macro_rules! size_methods {
    () => {
        /// Lower bound of the hard size range.
        pub fn min_size(mut self, min: usize) -> Self {
            self.sizes.hard.min = Some(min);
            self
        }

        /// Upper bound of the hard size range.
        pub fn max_size(mut self, max: usize) -> Self {
            self.sizes.hard.max = Some(max);
            self
        }

        /// Requires exactly `size` elements.
        pub fn size(mut self, size: usize) -> Self {
            self.sizes.hard = $crate::construct::condition::SizeRange::exactly(size);
            self
        }

        pub fn size_range(mut self, min: usize, max: usize) -> Self {
            self.sizes.hard = $crate::construct::condition::SizeRange::between(min, max);
            self
        }

        /// Warns when the size is below `min`.
        pub fn warn_min(mut self, min: usize) -> Self {
            self.sizes.warn.min = Some(min);
            self
        }

        /// Warns when the size is above `max`.
        pub fn warn_max(mut self, max: usize) -> Self {
            self.sizes.warn.max = Some(max);
            self
        }

        /// Warns when the size is anything but `size`.
        pub fn warn_size(mut self, size: usize) -> Self {
            self.sizes.warn = $crate::construct::condition::SizeRange::exactly(size);
            self
        }

        /// Warns with custom text when the size exceeds `max`.
        pub fn warn_if_bigger<F>(self, max: usize, text: F) -> Self
        where
            F: Fn(usize) -> String + Send + Sync + 'static,
        {
            self.warn_max(max).warn_text(text)
        }

        /// Warns with custom text when the size is below `min`.
        pub fn warn_if_smaller<F>(self, min: usize, text: F) -> Self
        where
            F: Fn(usize) -> String + Send + Sync + 'static,
        {
            self.warn_min(min).warn_text(text)
        }

        /// Replaces the generated size warning. The closure receives the
        /// actual size.
        pub fn warn_text<F>(mut self, text: F) -> Self
        where
            F: Fn(usize) -> String + Send + Sync + 'static,
        {
            self.sizes.warn_text = Some(std::sync::Arc::new(text));
            self
        }
    };
}

pub(crate) use size_methods;
