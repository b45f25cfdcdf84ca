//! avoid-implicit-conversion-in-predicate: `CAST(col AS ...)` and friends
//! on a column inside a `WHERE` or `JOIN` predicate.
//!
//! Converting the column side of a comparison usually prevents an index seek.
//! Comparisons, `LIKE`, `IN` and `BETWEEN` are checked anywhere below a
//! `WHERE` clause or a join, subqueries included.

use crate::linter::guard::converts_column;
use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::visit::{traverse, walk_children, Visitor, Walk};
use crate::syntax::{Expr, ExprKind, Node, SyntaxTree, TableReferenceKind};
use crate::types::rule_ids;

pub struct AvoidImplicitConversionInPredicate;

impl LintRule for AvoidImplicitConversionInPredicate {
    fn id(&self) -> &'static str {
        rule_ids::AVOID_IMPLICIT_CONVERSION_IN_PREDICATE
    }

    fn message(&self) -> &'static str {
        "Avoid conversions on columns in WHERE/JOIN predicates (e.g., CAST(col AS ...) = ...); they can force scans by preventing index seeks. Prefer correctly typed parameters/literals instead."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        traverse(&mut PredicateConversions::default(), &mut ctx);
    }
}

/// Whether a predicate node converts a column on one of its sides.
fn converts_column_operand(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Binary { op, left, right } if op.is_comparison() => {
            converts_column(left) || converts_column(right)
        }
        ExprKind::Like { expr, pattern, .. } => converts_column(expr) || converts_column(pattern),
        ExprKind::InList { expr, .. } | ExprKind::InSubquery { expr, .. } => converts_column(expr),
        ExprKind::Between {
            expr, low, high, ..
        } => converts_column(expr) || converts_column(low) || converts_column(high),
        _ => false,
    }
}

fn opens_predicate_scope(node: Node<'_>) -> bool {
    match node {
        Node::WhereClause(_) => true,
        Node::TableReference(table) => matches!(
            table.kind,
            TableReferenceKind::QualifiedJoin { .. } | TableReferenceKind::UnqualifiedJoin { .. }
        ),
        _ => false,
    }
}

#[derive(Default)]
struct PredicateConversions {
    /// Number of enclosing `WHERE` clauses and joins.
    depth: usize,
}

impl<'t> Visitor<'t> for PredicateConversions {
    fn visit(&mut self, node: Node<'t>, ctx: &mut LintContext<'t, '_>) -> Walk {
        if opens_predicate_scope(node) {
            self.depth += 1;
            walk_children(node, self, ctx);
            self.depth -= 1;
            return Walk::Skip;
        }

        if self.depth > 0 {
            if let Node::Expr(expr) = node {
                if converts_column_operand(expr) {
                    ctx.report_at(&expr.span);
                }
            }
        }
        Walk::Continue
    }
}
