//! Boolean, equality and comparison operators.

use tracing::trace;

use super::{result, BinaryOp, EvalHandle};
use crate::ast::Node;
use crate::construct::constructors;
use crate::construct::{ConstructRuleBuilder, Constructor};
use crate::diagnostics::Reporter;

/// Registers `||`, `&&`, `|`, `&`, `!`, equality and comparison operators.
/// Operands are evaluated through `eval`.
///
/// Usage:
/// ```text
/// &&[a, b]     ; short-circuit: b is not evaluated when a is false
/// &[a, b]      ; eager: both sides are evaluated
/// ==[1, 1.0]   ; true, compared as numbers
/// <=[2, 3]     ; true
/// ```
pub fn register_logic_rules(
    rules: ConstructRuleBuilder<Node>,
    eval: &EvalHandle,
) -> ConstructRuleBuilder<Node> {
    rules
        .list_arms("||", |b| {
            b.binary(eval.binary_op(|eval, a, b, reports| {
                if eval.eval_bool(a, reports)? {
                    return Some(result(true, a, b));
                }
                eval.eval_bool(b, reports).map(|y| result(y, a, b))
            }))
        })
        .list_arms("&&", |b| {
            b.binary(eval.binary_op(|eval, a, b, reports| {
                if !eval.eval_bool(a, reports)? {
                    return Some(result(false, a, b));
                }
                eval.eval_bool(b, reports).map(|y| result(y, a, b))
            }))
        })
        .list_arms("|", |b| b.binary(eager(eval, |x, y| x | y)))
        .list_arms("&", |b| b.binary(eager(eval, |x, y| x & y)))
        .list_arms("!", |b| {
            b.unary(eval.unary_op(|eval, a, reports| {
                let x = eval.eval_bool(a, reports)?;
                Some(Node::value((!x).to_string()).with_span(a.span()))
            }))
        })
        .list_aliases_arms(&["==", "="], |b| {
            b.binary(eval.binary_op(|eval, a, b, reports| {
                equals(eval, a, b, reports).map(|eq| result(eq, a, b))
            }))
        })
        .list_arms("!=", |b| {
            b.binary(eval.binary_op(|eval, a, b, reports| {
                equals(eval, a, b, reports).map(|eq| result(!eq, a, b))
            }))
        })
        .list_arms(">", |b| b.binary(compare(eval, |x, y| x > y)))
        .list_arms("<", |b| b.binary(compare(eval, |x, y| x < y)))
        .list_arms(">=", |b| b.binary(compare(eval, |x, y| x >= y)))
        .list_arms("<=", |b| b.binary(compare(eval, |x, y| x <= y)))
}

/// Both sides are evaluated even when the left one fails.
fn eager(eval: &EvalHandle, op: fn(bool, bool) -> bool) -> impl BinaryOp {
    eval.binary_op(move |eval, a, b, reports| {
        let x = eval.eval_bool(a, reports);
        let y = eval.eval_bool(b, reports);
        let (x, y) = x.zip(y)?;
        Some(result(op(x, y), a, b))
    })
}

/// Evaluates both sides, then compares structurally, as booleans, and as
/// numbers, in that order. Values that agree under none of these are unequal.
fn equals(eval: &EvalHandle, a: &Node, b: &Node, reports: Reporter<'_>) -> Option<bool> {
    let x = eval.eval(a, reports);
    let y = eval.eval(b, reports);
    let (x, y) = x.zip(y)?;
    if x == y {
        return Some(true);
    }
    let silent = Reporter::silent();
    let as_bool = constructors::bool();
    if let (Some(x), Some(y)) = (as_bool.construct(&x, silent), as_bool.construct(&y, silent)) {
        return Some(x == y);
    }
    let as_number = constructors::double();
    if let (Some(x), Some(y)) = (as_number.construct(&x, silent), as_number.construct(&y, silent)) {
        return Some(x == y);
    }
    trace!(left = %x, right = %y, "no common representation");
    Some(false)
}

fn compare(eval: &EvalHandle, op: fn(f64, f64) -> bool) -> impl BinaryOp {
    eval.binary_op(move |eval, a, b, reports| {
        let x = eval.eval_number(a, reports);
        let y = eval.eval_number(b, reports);
        let (x, y) = x.zip(y)?;
        Some(result(op(x, y), a, b))
    })
}
