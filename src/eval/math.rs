//! Arithmetic operators.
//!
//! All arithmetic is done in `f64`; integral results print without a
//! fractional part.

use super::{result, BinaryOp, EvalHandle, UnaryOp};
use crate::ast::value::format_number;
use crate::ast::Node;
use crate::construct::ConstructRuleBuilder;
use crate::diagnostics::Reporter;

/// Registers `+`, `-`, `*`, `/` and `^` (alias `**`). Operands are
/// evaluated through `eval`.
///
/// Usage:
/// ```text
/// +[a, b]     ; a + b
/// +[a]        ; a
/// -[a, b]     ; a - b
/// -[a]        ; negated a
/// /[a, b]     ; a / b, an error when b is zero
/// ^[a, b]     ; a raised to b
/// ```
///
/// Example:
/// ```rust
/// use sutra_construct::ast::Node;
/// use sutra_construct::diagnostics::Reporter;
/// use sutra_construct::eval::eval;
///
/// let node = Node::named_list("^", [Node::value("10"), Node::value("3")]);
/// assert_eq!(eval(&node, Reporter::silent()), Some(Node::value("1000")));
/// ```
pub fn register_math_rules(
    rules: ConstructRuleBuilder<Node>,
    eval: &EvalHandle,
) -> ConstructRuleBuilder<Node> {
    rules
        .list_arms("+", |b| {
            b.binary(arithmetic(eval, |x, y| x + y))
                .strict_unary(unary(eval, |x| x))
        })
        .list_arms("-", |b| {
            b.binary(arithmetic(eval, |x, y| x - y))
                .strict_unary(unary(eval, |x| -x))
        })
        .list_arms("*", |b| b.binary(arithmetic(eval, |x, y| x * y)))
        .list_arms("/", |b| b.binary(eval.binary_op(divide)))
        .list_aliases_arms(&["^", "**"], |b| b.binary(arithmetic(eval, pow)))
}

/// Evaluates both operands, even when the first one fails.
fn operands(eval: &EvalHandle, a: &Node, b: &Node, reports: Reporter<'_>) -> Option<(f64, f64)> {
    let x = eval.eval_number(a, reports);
    let y = eval.eval_number(b, reports);
    x.zip(y)
}

fn arithmetic(eval: &EvalHandle, op: fn(f64, f64) -> f64) -> impl BinaryOp {
    eval.binary_op(move |eval, a, b, reports| {
        let (x, y) = operands(eval, a, b, reports)?;
        Some(result(format_number(op(x, y)), a, b))
    })
}

fn unary(eval: &EvalHandle, op: fn(f64) -> f64) -> impl UnaryOp {
    eval.unary_op(move |eval, a, reports| {
        let x = eval.eval_number(a, reports)?;
        Some(Node::value(format_number(op(x))).with_span(a.span()))
    })
}

/// Errors on division by zero.
fn divide(eval: &EvalHandle, a: &Node, b: &Node, reports: Reporter<'_>) -> Option<Node> {
    let (x, y) = operands(eval, a, b, reports)?;
    if y == 0.0 {
        reports.error(b.span(), "Division by zero");
        return None;
    }
    Some(result(format_number(x / y), a, b))
}

/// Integral exponents use repeated multiplication, which stays exact for
/// results such as `10^12`.
fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}
