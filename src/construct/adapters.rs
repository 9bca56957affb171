//! Constructor adapters: fault containment, shape prechecks and list mapping.

use std::error::Error;

use tracing::debug;

use super::{from_fn, Constructor};
use crate::ast::{List, Node, Object, Primitive, Spanned};
use crate::diagnostics::{Report, Reporter};

const TRY_CONSTRUCT_MESSAGE: &str = "Cannot construct object due to an unexpected exception";

// ============================================================================
// FAULT CONTAINMENT
// ============================================================================

/// Wraps a fallible transform. An `Err` becomes a reported failure carrying
/// the error as its cause; it never reaches the caller.
///
/// ```rust
/// use sutra_construct::ast::Node;
/// use sutra_construct::construct::{try_construct, Constructor};
/// use sutra_construct::diagnostics::ReportCollector;
///
/// let parse = try_construct(|node: &Node| node.to_string().parse::<u8>());
/// let sink = ReportCollector::new();
/// assert_eq!(parse.construct(&Node::value("7"), sink.reporter()), Some(7));
/// assert_eq!(parse.construct(&Node::value("700"), sink.reporter()), None);
/// assert_eq!(sink.errors().len(), 1);
/// ```
pub fn try_construct<I, T, E, F>(f: F) -> impl Constructor<I, T>
where
    I: Spanned + ?Sized,
    E: Error + Send + Sync + 'static,
    F: Fn(&I) -> Result<T, E> + Send + Sync,
{
    try_construct_with_message(f, TRY_CONSTRUCT_MESSAGE, true)
}

/// Like [`try_construct`] with a custom message. The error is attached as
/// the report's cause only when `attach_cause` is set.
pub fn try_construct_with_message<I, T, E, F>(
    f: F,
    message: impl Into<String>,
    attach_cause: bool,
) -> impl Constructor<I, T>
where
    I: Spanned + ?Sized,
    E: Error + Send + Sync + 'static,
    F: Fn(&I) -> Result<T, E> + Send + Sync,
{
    let message = message.into();
    try_construct_with(f, move |input: &I, error: E, reports: Reporter<'_>| {
        let report = Report::error(input.span(), message.clone());
        reports.report(if attach_cause {
            report.with_cause(error)
        } else {
            report
        });
    })
}

/// Like [`try_construct`], handing each error to `handler` for reporting.
/// The handler only runs when the reporter is active.
pub fn try_construct_with<I, T, E, F, H>(f: F, handler: H) -> impl Constructor<I, T>
where
    I: ?Sized,
    E: Error + Send + Sync + 'static,
    F: Fn(&I) -> Result<T, E> + Send + Sync,
    H: Fn(&I, E, Reporter<'_>) + Send + Sync,
{
    from_fn(move |input: &I, reports: Reporter<'_>| match f(input) {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(%error, "transform failed");
            if !reports.is_silent() {
                handler(input, error, reports);
            }
            None
        }
    })
}

// ============================================================================
// SHAPE PRECHECKS
// ============================================================================

/// Accepts any node, requiring a list.
pub fn generify_list<T, C>(constructor: C) -> impl Constructor<Node, T>
where
    C: Constructor<List, T>,
{
    from_fn(move |node: &Node, reports: Reporter<'_>| match node {
        Node::List(list) => constructor.construct(list, reports),
        _ => {
            reports.error(node.span(), "Expected list");
            None
        }
    })
}

/// Accepts any node, requiring an object.
pub fn generify_object<T, C>(constructor: C) -> impl Constructor<Node, T>
where
    C: Constructor<Object, T>,
{
    from_fn(move |node: &Node, reports: Reporter<'_>| match node {
        Node::Object(obj) => constructor.construct(obj, reports),
        _ => {
            reports.error(node.span(), "Expected object");
            None
        }
    })
}

/// Accepts any node, requiring a primitive.
pub fn generify_value<T, C>(constructor: C) -> impl Constructor<Node, T>
where
    C: Constructor<Primitive, T>,
{
    from_fn(move |node: &Node, reports: Reporter<'_>| match node {
        Node::Primitive(value) => constructor.construct(value, reports),
        _ => {
            reports.error(node.span(), "Expected value");
            None
        }
    })
}

// ============================================================================
// LISTS
// ============================================================================

/// Maps every element of a list. The first element failure fails the whole
/// list; later elements are not visited.
pub fn list_of<T, C>(element: C, require_unnamed: bool) -> impl Constructor<List, Vec<T>>
where
    C: Constructor<Node, T>,
{
    from_fn(move |list: &List, reports: Reporter<'_>| {
        if require_unnamed && list.has_name() {
            reports.error(list.span(), "List should be unnamed");
            return None;
        }
        list.iter()
            .map(|item| element.construct(item, reports))
            .collect::<Option<Vec<T>>>()
    })
}

/// Accepts either an unnamed list of elements or a single element, always
/// producing a sequence. A named list counts as a single element.
pub fn list_or_element_of<T, C>(element: C) -> impl Constructor<Node, Vec<T>>
where
    C: Constructor<Node, T>,
{
    from_fn(move |node: &Node, reports: Reporter<'_>| match node {
        Node::List(list) if !list.has_name() => list
            .iter()
            .map(|item| element.construct(item, reports))
            .collect::<Option<Vec<T>>>(),
        _ => element.construct(node, reports).map(|value| vec![value]),
    })
}
