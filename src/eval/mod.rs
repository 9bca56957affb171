//! Expression evaluator built from construct rules.
//!
//! Operators are named lists: `+[1, 2]` evaluates to `3`. Anything that is
//! not a recognized operator, including plain primitives, evaluates to
//! itself. Results are written back as primitive nodes, so evaluated trees
//! can be fed to the ordinary constructors.
//!
//! ## Operators
//!
//! - **Logic**: `||`, `&&` (short-circuit), `|`, `&` (eager), `!`
//! - **Equality**: `==` / `=`, `!=`
//! - **Comparison**: `>`, `<`, `>=`, `<=`
//! - **Arithmetic**: `+`, `-` (binary, or unary identity / negation), `*`,
//!   `/`, `^` / `**`
//!
//! [`extend_evaluator`] adds operators on top of these.
//!
//! ```rust
//! use sutra_construct::ast::Node;
//! use sutra_construct::diagnostics::Reporter;
//! use sutra_construct::eval::eval;
//!
//! let sum = Node::named_list("+", [Node::value("1"), Node::value("2")]);
//! assert_eq!(eval(&sum, Reporter::silent()), Some(Node::value("3")));
//! ```

use std::sync::{Arc, Weak};

use once_cell::sync::{Lazy, OnceCell};
use tracing::error;

use crate::ast::Node;
use crate::construct::constructors::{self, identity};
use crate::construct::{ConstructRule, ConstructRuleBuilder, Constructor};
use crate::diagnostics::Reporter;
use crate::errors::SchemaError;

mod logic;
mod math;

pub use logic::register_logic_rules;
pub use math::register_math_rules;

static EVALUATOR: Lazy<Arc<ConstructRule<Node>>> = Lazy::new(|| {
    // The operator table is fixed; a schema fault here is a bug in this module.
    build_evaluator().expect("evaluator rules are well-formed")
});

/// Builds a fresh evaluator with the built-in operators.
pub fn build_evaluator() -> Result<Arc<ConstructRule<Node>>, SchemaError> {
    extend_evaluator(|rules, _| rules)
}

/// Builds an evaluator whose built-in operators are extended by `operators`.
///
/// The extra operators go into a rule derived from the built-in one, so they
/// shadow built-ins of the same name. Operands of every operator are
/// evaluated by the returned rule, which lets built-in and added operators
/// nest inside each other freely.
///
/// Example:
/// ```rust
/// use sutra_construct::ast::{List, Node};
/// use sutra_construct::construct::Constructor;
/// use sutra_construct::diagnostics::Reporter;
/// use sutra_construct::eval::extend_evaluator;
///
/// let rule = extend_evaluator(|rules, _| {
///     rules.list("two", |_: &List, _: Reporter<'_>| Some(Node::value("2")))
/// })
/// .unwrap();
/// let node = Node::named_list("+", [Node::named_list("two", []), Node::value("1")]);
/// assert_eq!(rule.construct(&node, Reporter::silent()), Some(Node::value("3")));
/// ```
pub fn extend_evaluator<F>(operators: F) -> Result<Arc<ConstructRule<Node>>, SchemaError>
where
    F: FnOnce(ConstructRuleBuilder<Node>, &EvalHandle) -> ConstructRuleBuilder<Node>,
{
    let handle = EvalHandle::new();
    let rules = ConstructRule::builder();
    let rules = register_logic_rules(rules, &handle);
    let rules = register_math_rules(rules, &handle);
    let builtin = Arc::new(rules.any(identity()).build()?);
    let rule = Arc::new(operators(ConstructRule::extend(&builtin), &handle).build()?);
    handle.bind(&rule);
    Ok(rule)
}

/// The shared evaluator.
pub fn evaluator() -> &'static ConstructRule<Node> {
    &EVALUATOR
}

/// Evaluates `node`, reporting failures to `reports`.
pub fn eval(node: &Node, reports: Reporter<'_>) -> Option<Node> {
    EVALUATOR.construct(node, reports)
}

// ============================================================================
// OPERAND EVALUATION
// ============================================================================

/// A one-operand operator, as taken by
/// [`ConditionedBuilder::unary`](crate::construct::ConditionedBuilder::unary).
pub trait UnaryOp: Fn(&Node, Reporter<'_>) -> Option<Node> + Send + Sync + 'static {}

impl<F> UnaryOp for F where F: Fn(&Node, Reporter<'_>) -> Option<Node> + Send + Sync + 'static {}

/// A two-operand operator.
pub trait BinaryOp: Fn(&Node, &Node, Reporter<'_>) -> Option<Node> + Send + Sync + 'static {}

impl<F> BinaryOp for F where
    F: Fn(&Node, &Node, Reporter<'_>) -> Option<Node> + Send + Sync + 'static
{
}

/// Late-bound reference to the rule that evaluates operands.
///
/// Operators are registered before the rule that will own them exists, so
/// they capture a handle that is bound once that rule is built. The handle
/// holds the rule weakly; the rule owns the operators, not the other way
/// round.
#[derive(Clone, Default)]
pub struct EvalHandle {
    rule: Arc<OnceCell<Weak<ConstructRule<Node>>>>,
}

impl EvalHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the handle at `rule`. Returns `false`, leaving the handle
    /// unchanged, when it was already bound.
    pub fn bind(&self, rule: &Arc<ConstructRule<Node>>) -> bool {
        self.rule.set(Arc::downgrade(rule)).is_ok()
    }

    /// Evaluates `node` with the bound rule.
    pub fn eval(&self, node: &Node, reports: Reporter<'_>) -> Option<Node> {
        match self.rule.get().and_then(Weak::upgrade) {
            Some(rule) => rule.construct(node, reports),
            None => {
                error!("operand evaluated through an unbound evaluator handle");
                reports.error(node.span(), "Evaluator is not available");
                None
            }
        }
    }

    pub fn eval_bool(&self, node: &Node, reports: Reporter<'_>) -> Option<bool> {
        let value = self.eval(node, reports)?;
        constructors::bool().construct(&value, reports)
    }

    pub fn eval_number(&self, node: &Node, reports: Reporter<'_>) -> Option<f64> {
        let value = self.eval(node, reports)?;
        constructors::double().construct(&value, reports)
    }

    /// Adapts a one-operand operator for the arity sugar of
    /// [`ConditionedBuilder`](crate::construct::ConditionedBuilder).
    pub fn unary_op<F>(&self, op: F) -> impl UnaryOp
    where
        F: Fn(&EvalHandle, &Node, Reporter<'_>) -> Option<Node> + Send + Sync + 'static,
    {
        let handle = self.clone();
        move |a: &Node, reports: Reporter<'_>| op(&handle, a, reports)
    }

    /// Adapts a two-operand operator, see [`unary_op`](Self::unary_op).
    pub fn binary_op<F>(&self, op: F) -> impl BinaryOp
    where
        F: Fn(&EvalHandle, &Node, &Node, Reporter<'_>) -> Option<Node> + Send + Sync + 'static,
    {
        let handle = self.clone();
        move |a: &Node, b: &Node, reports: Reporter<'_>| op(&handle, a, b, reports)
    }
}

/// A result node positioned over both operands.
pub fn result(value: impl ToString, a: &Node, b: &Node) -> Node {
    Node::value(value.to_string()).with_span(a.span().join(b.span()))
}
