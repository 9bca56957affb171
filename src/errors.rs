//! Error types for the construct layer.
//!
//! Two classes of failure exist and they never mix:
//!
//! - **Schema faults** ([`SchemaError`]) are programmer errors found while a
//!   rule graph is being built. Builders record the first one and `build()`
//!   returns it; they are never routed through a diagnostic sink.
//! - **Data failures** are expected outcomes of validating untrusted input.
//!   They surface as `None` plus [`Report`](crate::diagnostics::Report)s.
//!
//! [`CoerceError`] and [`ConstructError`] are the typed errors of the node
//! coercions and of `construct_expect`.

use std::num::{ParseFloatError, ParseIntError};

use miette::Diagnostic;
use thiserror::Error;

/// Schema-authoring fault detected at build time.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SchemaError {
    #[error("construct rule for primitive value '{0}' already defined")]
    #[diagnostic(code(construct::schema::duplicate_primitive))]
    DuplicatePrimitive(String),

    #[error("construct rule for list '{0}' already defined")]
    #[diagnostic(code(construct::schema::duplicate_list))]
    DuplicateList(String),

    #[error("construct rule for object '{0}' already defined")]
    #[diagnostic(code(construct::schema::duplicate_object))]
    DuplicateObject(String),

    #[error("generic construct rule for {0} already defined")]
    #[diagnostic(code(construct::schema::duplicate_generic))]
    DuplicateGeneric(&'static str),

    #[error("error message already defined")]
    #[diagnostic(code(construct::schema::duplicate_error_message))]
    DuplicateErrorMessage,

    #[error("index {0} is already registered for type checking")]
    #[diagnostic(code(construct::schema::duplicate_index))]
    DuplicateIndex(usize),

    #[error("property '{0}' is already registered for checking")]
    #[diagnostic(code(construct::schema::duplicate_property))]
    DuplicateProperty(String),

    #[error("minimum size {min} is greater than maximum size {max}")]
    #[diagnostic(code(construct::schema::inverted_range))]
    InvertedRange { min: usize, max: usize },

    #[error("warning minimum size {min} is greater than warning maximum size {max}")]
    #[diagnostic(code(construct::schema::inverted_warn_range))]
    InvertedWarnRange { min: usize, max: usize },

    #[error("type checking element at index {index} is out of range (maximum size {max})")]
    #[diagnostic(code(construct::schema::index_out_of_range))]
    IndexOutOfRange { index: usize, max: usize },

    #[error("expecting {count} properties but maximum size is {max}")]
    #[diagnostic(code(construct::schema::too_many_properties))]
    TooManyProperties { count: usize, max: usize },

    #[error("impossible type check")]
    #[diagnostic(
        code(construct::schema::impossible_type),
        help("the type flags normalize to nothing, so no node could ever match")
    )]
    ImpossibleType,
}

/// Failure to read a primitive (or JSON value) as a typed value.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum CoerceError {
    #[error("'{value}' is not a boolean")]
    #[diagnostic(code(construct::coerce::bool), help("expected `true` or `false`"))]
    InvalidBool { value: String },

    #[error("'{value}' is not an integer")]
    #[diagnostic(code(construct::coerce::int))]
    InvalidInt {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("'{value}' is not a number")]
    #[diagnostic(code(construct::coerce::float))]
    InvalidFloat {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("JSON {kind} cannot be represented as a node")]
    #[diagnostic(code(construct::coerce::json))]
    UnsupportedJson { kind: &'static str },
}

/// Returned by `construct_expect` when construction produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConstructError {
    #[error("construct failed: no `{target}` was produced")]
    #[diagnostic(code(construct::failed))]
    Failed { target: &'static str },
}
