//! Matching a guard such as `ISNUMERIC(x) = 1` to a later use of the same
//! value.
//!
//! Two expressions denote the same value when they produce the same identity
//! key: the variable name for `@x`, or the dot-joined path for a column
//! reference. Every other expression has no key and never matches anything,
//! itself included.

use super::chain::unwrap_parens;
use super::visit::{any_node, find_node};
use crate::syntax::{Conversion, Expr, ExprKind, Node};

/// Single-argument functions that test whether a value converts cleanly.
pub const GUARD_FUNCTIONS: &[&str] = &["ISNUMERIC", "ISDATE"];

/// Identity key of `expr`, looking through parentheses.
pub fn key_of(expr: &Expr) -> Option<String> {
    let key = match &unwrap_parens(expr).kind {
        ExprKind::Variable(variable) => variable.value.clone(),
        ExprKind::Column(parts) => parts
            .iter()
            .map(|part| part.value.as_str())
            .collect::<Vec<_>>()
            .join("."),
        _ => return None,
    };
    (!key.is_empty()).then_some(key)
}

/// Key guarded by the first `ISNUMERIC(x)`/`ISDATE(x)` call in `condition`.
///
/// Only the first guard call counts, even if its argument has no key.
pub fn find_guard_key(condition: &Expr) -> Option<String> {
    let argument = find_node(Node::Expr(condition), |node| match node {
        Node::Expr(Expr {
            kind: ExprKind::Function(call),
            ..
        }) if call.arguments.len() == 1
            && GUARD_FUNCTIONS
                .iter()
                .any(|name| name.eq_ignore_ascii_case(call.name.simple_name())) =>
        {
            call.arguments.first()
        }
        _ => None,
    })?;
    key_of(argument)
}

/// The conversion `expr` performs, looking through parentheses.
pub fn conversion_of(expr: &Expr) -> Option<&Conversion> {
    match &unwrap_parens(expr).kind {
        ExprKind::Conversion(conversion) => Some(conversion.as_ref()),
        _ => None,
    }
}

/// Whether `expr` is a `CONVERT`/`CAST` (not `TRY_`) of the value `key`.
pub fn converts_key(expr: &Expr, key: &str) -> bool {
    conversion_of(expr).is_some_and(|conversion| {
        !conversion.function.is_try() && key_of(&conversion.expr).as_deref() == Some(key)
    })
}

/// Whether `expr` references a column anywhere within it.
pub fn contains_column_reference(expr: &Expr) -> bool {
    any_node(Node::Expr(expr), |node| {
        matches!(
            node,
            Node::Expr(Expr {
                kind: ExprKind::Column(_),
                ..
            })
        )
    })
}

/// Whether `expr` is a conversion (any of the four forms) applied to
/// something that references a column.
pub fn converts_column(expr: &Expr) -> bool {
    conversion_of(expr).is_some_and(|conversion| contains_column_reference(&conversion.expr))
}
