//! AST module for the construct layer
//!
//! This module provides the generic, already-parsed tree that the construct
//! layer validates and transforms. The parser front end produces it; this
//! crate only ever reads it.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};

pub mod json;
mod node;
pub mod type_flags;
pub mod value;

pub use node::{List, Node, Object, Primitive};
pub use type_flags::TypeFlags;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a span in the source code.
///
/// Spans are opaque to the construct layer: they are copied into diagnostics
/// verbatim and never used for matching.
///
/// # Examples
///
/// ```rust
/// use sutra_construct::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.start, 0);
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span, never less than zero.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// ```rust
    /// use sutra_construct::ast::Span;
    /// assert_eq!(Span::new(2, 4).join(Span::new(7, 9)), Span::new(2, 9));
    /// ```
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        // Zero-width spans still get a one-column label.
        (span.start, span.len().max(1)).into()
    }
}

/// Anything that carries a source position.
pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}
