//! Ordered (condition, constructor) arms with explicit ambiguity semantics.
//!
//! A [`ConditionedConstructor`] probes its arms' conditions silently and runs
//! the constructor of the selected arm:
//!
//! - no arms: always fails, reporting a configuration defect;
//! - one arm: the condition is tested with the caller's reporter, so its own
//!   diagnostics explain a mismatch;
//! - [`SelectionMode::FirstMatch`]: the first matching arm wins;
//! - [`SelectionMode::OnlyMatch`] (default): exactly one arm may match. Two or
//!   more matches are reported as ambiguous and no constructor runs.
//!
//! When nothing matches, one diagnostic lists every condition that was tried.
//!
//! ```rust
//! use sutra_construct::ast::{List, Node};
//! use sutra_construct::construct::{list_conditions, Constructor};
//! use sutra_construct::diagnostics::Reporter;
//!
//! let arity = list_conditions(|b| {
//!     b.add(|c| c.size(1), |_: &List, _: Reporter<'_>| Some("one"))
//!         .add(|c| c.min_size(2), |_: &List, _: Reporter<'_>| Some("many"))
//! })
//! .unwrap();
//! let Node::List(list) = Node::list([Node::value("a")]) else { unreachable!() };
//! assert_eq!(arity.construct(&list, Reporter::silent()), Some("one"));
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::condition::{
    Condition, ConditionBuilder, ListConditionBuilder, ObjectConditionBuilder, Shape,
};
use super::{Constructor, SharedConstructor};
use crate::ast::{List, Node, Object};
use crate::diagnostics::Reporter;
use crate::errors::SchemaError;

/// How a conditioned constructor picks among matching arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// The first matching arm in declaration order wins.
    FirstMatch,
    /// Exactly one arm may match; more is an ambiguity failure.
    #[default]
    OnlyMatch,
}

struct Arm<S: Shape, T> {
    condition: S::Condition,
    constructor: SharedConstructor<S, T>,
}

/// Dispatches a list or object to one of several constructors by condition.
pub struct ConditionedConstructor<S: Shape, T> {
    arms: Box<[Arm<S, T>]>,
    mode: SelectionMode,
}

impl<S: Shape, T> ConditionedConstructor<S, T> {
    pub fn builder() -> ConditionedBuilder<S, T> {
        ConditionedBuilder::new()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Index of the arm to run, or `None` after reporting why there is none.
    fn select(&self, input: &S, reports: Reporter<'_>) -> Option<usize> {
        let selected = match self.mode {
            SelectionMode::FirstMatch => self
                .arms
                .iter()
                .position(|arm| arm.condition.matches(input)),
            SelectionMode::OnlyMatch => {
                let mut matched = Vec::new();
                for (index, arm) in self.arms.iter().enumerate() {
                    if !arm.condition.matches(input) {
                        continue;
                    }
                    if reports.is_silent() && !matched.is_empty() {
                        return None;
                    }
                    matched.push(index);
                }
                if matched.len() > 1 {
                    debug!(
                        shape = S::NAME,
                        matches = matched.len(),
                        "ambiguous conditioned constructor"
                    );
                    reports.error(
                        input.span(),
                        self.describe("Matched by multiple conditions:", &matched),
                    );
                    return None;
                }
                matched.first().copied()
            }
        };
        if selected.is_none() {
            debug!(
                shape = S::NAME,
                arms = self.arms.len(),
                "no conditioned constructor arm matched"
            );
            if !reports.is_silent() {
                let all: Vec<usize> = (0..self.arms.len()).collect();
                reports.error(
                    input.span(),
                    self.describe(
                        "None of the defined constructor rules match the parameter",
                        &all,
                    ),
                );
            }
        }
        selected
    }

    fn describe(&self, headline: &str, arms: &[usize]) -> String {
        let mut text = headline.to_string();
        for &index in arms {
            text.push_str("\n  ");
            text.push_str(&self.arms[index].condition.to_string());
        }
        text
    }
}

impl<S: Shape, T> Constructor<S, T> for ConditionedConstructor<S, T> {
    fn construct(&self, input: &S, reports: Reporter<'_>) -> Option<T> {
        match &*self.arms {
            [] => {
                reports.error(
                    input.span(),
                    "Invalid conditioned constructor: no rules specified.",
                );
                None
            }
            [arm] => {
                if !arm.condition.test(input, reports) {
                    return None;
                }
                arm.constructor.construct(input, reports)
            }
            arms => {
                let arm = &arms[self.select(input, reports)?];
                // Replay with the reporter so soft warnings of the chosen arm surface.
                if !reports.is_silent() {
                    arm.condition.test(input, reports);
                }
                arm.constructor.construct(input, reports)
            }
        }
    }
}

impl<S: Shape, T> fmt::Debug for ConditionedConstructor<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionedConstructor")
            .field("mode", &self.mode)
            .field(
                "conditions",
                &self
                    .arms
                    .iter()
                    .map(|arm| arm.condition.to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Assembles the arms of a [`ConditionedConstructor`].
///
/// Each arm pairs a condition, configured on a fresh condition builder, with
/// its constructor, so an arm can never lack either half.
pub struct ConditionedBuilder<S: Shape, T> {
    arms: Vec<Arm<S, T>>,
    mode: SelectionMode,
    error: Option<SchemaError>,
}

impl<S: Shape, T> Default for ConditionedBuilder<S, T> {
    fn default() -> Self {
        Self {
            arms: Vec::new(),
            mode: SelectionMode::default(),
            error: None,
        }
    }
}

impl<S: Shape, T> ConditionedBuilder<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_match(mut self) -> Self {
        self.mode = SelectionMode::FirstMatch;
        self
    }

    pub fn only_match(mut self) -> Self {
        self.mode = SelectionMode::OnlyMatch;
        self
    }

    /// Adds an arm with a closure transform.
    pub fn add<B, F>(self, condition: B, transform: F) -> Self
    where
        B: FnOnce(S::Builder) -> S::Builder,
        F: Fn(&S, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.add_constructor(condition, transform)
    }

    /// Adds an arm with an existing constructor.
    pub fn add_constructor<B, C>(mut self, condition: B, constructor: C) -> Self
    where
        B: FnOnce(S::Builder) -> S::Builder,
        C: Constructor<S, T> + 'static,
    {
        match condition(S::Builder::default()).finish() {
            Ok(condition) => self.arms.push(Arm {
                condition,
                constructor: Arc::new(constructor),
            }),
            Err(error) => self.fail(error),
        }
        self
    }

    pub fn build(self) -> Result<ConditionedConstructor<S, T>, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(ConditionedConstructor {
            arms: self.arms.into_boxed_slice(),
            mode: self.mode,
        })
    }

    fn fail(&mut self, error: SchemaError) {
        self.error.get_or_insert(error);
    }
}

// ============================================================================
// FIXED-ARITY SUGAR
// ============================================================================

fn lenient(
    c: ListConditionBuilder,
    arity: usize,
    name: &'static str,
    count: &'static str,
) -> ListConditionBuilder {
    c.min_size(arity).warn_if_bigger(arity, move |size| {
        format!("{name} operations only need {count}, {size} provided")
    })
}

impl<T> ConditionedBuilder<List, T> {
    /// One element or more; extra elements are ignored with a warning.
    pub fn unary<F>(self, transform: F) -> Self
    where
        F: Fn(&Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.unary_with(|c| c, transform)
    }

    /// [`unary`](Self::unary) with extra constraints on the condition.
    pub fn unary_with<B, F>(self, condition: B, transform: F) -> Self
    where
        B: FnOnce(ListConditionBuilder) -> ListConditionBuilder,
        F: Fn(&Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.add(
            |c| condition(lenient(c, 1, "Unary", "one element")),
            move |list: &List, reports: Reporter<'_>| transform(&list[0], reports),
        )
    }

    /// Exactly one element.
    pub fn strict_unary<F>(self, transform: F) -> Self
    where
        F: Fn(&Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.strict_unary_with(|c| c, transform)
    }

    pub fn strict_unary_with<B, F>(self, condition: B, transform: F) -> Self
    where
        B: FnOnce(ListConditionBuilder) -> ListConditionBuilder,
        F: Fn(&Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.add(
            |c| condition(c.size(1)),
            move |list: &List, reports: Reporter<'_>| transform(&list[0], reports),
        )
    }

    /// Two elements or more; extra elements are ignored with a warning.
    pub fn binary<F>(self, transform: F) -> Self
    where
        F: Fn(&Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.binary_with(|c| c, transform)
    }

    pub fn binary_with<B, F>(self, condition: B, transform: F) -> Self
    where
        B: FnOnce(ListConditionBuilder) -> ListConditionBuilder,
        F: Fn(&Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.add(
            |c| condition(lenient(c, 2, "Binary", "two elements")),
            move |list: &List, reports: Reporter<'_>| transform(&list[0], &list[1], reports),
        )
    }

    /// Exactly two elements.
    pub fn strict_binary<F>(self, transform: F) -> Self
    where
        F: Fn(&Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.strict_binary_with(|c| c, transform)
    }

    pub fn strict_binary_with<B, F>(self, condition: B, transform: F) -> Self
    where
        B: FnOnce(ListConditionBuilder) -> ListConditionBuilder,
        F: Fn(&Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.add(
            |c| condition(c.size(2)),
            move |list: &List, reports: Reporter<'_>| transform(&list[0], &list[1], reports),
        )
    }

    /// Three elements or more; extra elements are ignored with a warning.
    pub fn ternary<F>(self, transform: F) -> Self
    where
        F: Fn(&Node, &Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.ternary_with(|c| c, transform)
    }

    pub fn ternary_with<B, F>(self, condition: B, transform: F) -> Self
    where
        B: FnOnce(ListConditionBuilder) -> ListConditionBuilder,
        F: Fn(&Node, &Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.add(
            |c| condition(lenient(c, 3, "Ternary", "three elements")),
            move |list: &List, reports: Reporter<'_>| {
                transform(&list[0], &list[1], &list[2], reports)
            },
        )
    }

    /// Exactly three elements.
    pub fn strict_ternary<F>(self, transform: F) -> Self
    where
        F: Fn(&Node, &Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.strict_ternary_with(|c| c, transform)
    }

    pub fn strict_ternary_with<B, F>(self, condition: B, transform: F) -> Self
    where
        B: FnOnce(ListConditionBuilder) -> ListConditionBuilder,
        F: Fn(&Node, &Node, &Node, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
    {
        self.add(
            |c| condition(c.size(3)),
            move |list: &List, reports: Reporter<'_>| {
                transform(&list[0], &list[1], &list[2], reports)
            },
        )
    }
}

// ============================================================================
// SHORTHANDS
// ============================================================================

/// A single-arm list constructor.
pub fn list_condition<T, B, F>(
    condition: B,
    transform: F,
) -> Result<ConditionedConstructor<List, T>, SchemaError>
where
    B: FnOnce(ListConditionBuilder) -> ListConditionBuilder,
    F: Fn(&List, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
{
    ConditionedBuilder::new().add(condition, transform).build()
}

/// A single-arm object constructor.
pub fn object_condition<T, B, F>(
    condition: B,
    transform: F,
) -> Result<ConditionedConstructor<Object, T>, SchemaError>
where
    B: FnOnce(ObjectConditionBuilder) -> ObjectConditionBuilder,
    F: Fn(&Object, Reporter<'_>) -> Option<T> + Send + Sync + 'static,
{
    ConditionedBuilder::new().add(condition, transform).build()
}

/// A multi-arm list constructor.
pub fn list_conditions<T, B>(arms: B) -> Result<ConditionedConstructor<List, T>, SchemaError>
where
    B: FnOnce(ConditionedBuilder<List, T>) -> ConditionedBuilder<List, T>,
{
    arms(ConditionedBuilder::new()).build()
}

/// A multi-arm object constructor.
pub fn object_conditions<T, B>(arms: B) -> Result<ConditionedConstructor<Object, T>, SchemaError>
where
    B: FnOnce(ConditionedBuilder<Object, T>) -> ConditionedBuilder<Object, T>,
{
    arms(ConditionedBuilder::new()).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ReportCollector;

    fn list(n: usize) -> List {
        List::new(None, (0..n).map(|i| Node::value(i.to_string())))
    }

    #[test]
    fn empty_constructor_reports_configuration_defect() {
        let empty = ConditionedBuilder::<List, ()>::new().build().unwrap();
        let sink = ReportCollector::new();
        assert_eq!(empty.construct(&list(0), sink.reporter()), None);
        assert_eq!(
            sink.messages(),
            ["Invalid conditioned constructor: no rules specified."]
        );
    }

    #[test]
    fn single_arm_reports_through_its_condition() {
        let only = list_condition(|c| c.size(2), |_: &List, _: Reporter<'_>| Some(())).unwrap();
        let sink = ReportCollector::new();
        assert_eq!(only.construct(&list(3), sink.reporter()), None);
        assert_eq!(
            sink.messages(),
            ["Wrong size: expected exactly 2, provided 3"]
        );
    }

    #[test]
    fn selected_arm_warnings_are_replayed() {
        let pairs = list_conditions(|b| {
            b.binary(|_, _, _| Some("pair"))
                .strict_unary(|_, _| Some("single"))
        })
        .unwrap();
        let sink = ReportCollector::new();
        assert_eq!(pairs.construct(&list(3), sink.reporter()), Some("pair"));
        assert_eq!(
            sink.messages(),
            ["Binary operations only need two elements, 3 provided"]
        );
        assert_eq!(pairs.construct(&list(1), sink.reporter()), Some("single"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn schema_errors_surface_at_build() {
        let err = list_conditions::<(), _>(|b| {
            b.add(|c| c.size_range(2, 1), |_: &List, _: Reporter<'_>| Some(()))
        })
        .unwrap_err();
        assert_eq!(err, SchemaError::InvertedRange { min: 2, max: 1 });
    }

    #[test]
    fn ternary_destructures_positionally() {
        let join = list_conditions(|b| {
            b.strict_ternary(|a: &Node, b: &Node, c: &Node, _: Reporter<'_>| {
                Some(format!("{a}{b}{c}"))
            })
        })
        .unwrap();
        assert_eq!(join.construct(&list(3), Reporter::silent()), Some("012".to_string()));
        assert_eq!(join.construct(&list(4), Reporter::silent()), None);
    }
}
