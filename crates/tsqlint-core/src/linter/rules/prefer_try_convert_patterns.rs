//! prefer-try-convert-patterns: `CASE WHEN ISNUMERIC(x) = 1 THEN CONVERT(t, x)`.
//!
//! A guard that tests convertibility followed by the conversion of the very
//! same value is what `TRY_CONVERT`/`TRY_CAST` does in one step. Only
//! searched `CASE` expressions are checked, and each reports at most once.

use crate::linter::guard::{converts_key, find_guard_key};
use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{CaseExpr, Expr, ExprKind, Node, SyntaxTree};
use crate::types::rule_ids;

pub struct PreferTryConvertPatterns;

impl LintRule for PreferTryConvertPatterns {
    fn id(&self) -> &'static str {
        rule_ids::PREFER_TRY_CONVERT_PATTERNS
    }

    fn message(&self) -> &'static str {
        "Prefer TRY_CONVERT/TRY_CAST over CASE WHEN ISNUMERIC/ISDATE(...) THEN CONVERT/CAST(...) patterns for clarity and correctness."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        traverse(&mut GuardedConversions, &mut ctx);
    }
}

fn has_guarded_conversion(case: &CaseExpr) -> bool {
    case.when_clauses.iter().any(|clause| {
        find_guard_key(&clause.condition).is_some_and(|key| converts_key(&clause.result, &key))
    })
}

struct GuardedConversions;

impl<'t> Visitor<'t> for GuardedConversions {
    fn visit(&mut self, node: Node<'t>, ctx: &mut LintContext<'t, '_>) -> Walk {
        if let Node::Expr(Expr {
            kind: ExprKind::Case(case),
            span,
        }) = node
        {
            if case.operand.is_none() && has_guarded_conversion(case) {
                ctx.report_at(span);
            }
        }
        Walk::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use crate::types::{Location, Violation};
    use rstest::rstest;

    fn run(sql: &str) -> Vec<Violation> {
        let tree = parse_script(sql).expect("parse");
        let mut violations = Vec::new();
        PreferTryConvertPatterns.check(&tree, &mut violations);
        violations
    }

    #[rstest]
    #[case::isnumeric_convert(
        "SELECT CASE WHEN ISNUMERIC(@x) = 1 THEN CONVERT(INT, @x) ELSE NULL END"
    )]
    #[case::isdate_cast("SELECT CASE WHEN ISDATE(t.d) = 1 THEN CAST(t.d AS DATE) END FROM t")]
    #[case::parenthesized(
        "SELECT CASE WHEN ISNUMERIC((@x)) = 1 AND @x <> '' THEN (CONVERT(INT, @x)) END"
    )]
    #[case::later_clause(
        "SELECT CASE WHEN @x IS NULL THEN 0 WHEN ISNUMERIC(@x) = 1 THEN CONVERT(INT, @x) END"
    )]
    fn test_guarded_conversion_is_reported(#[case] sql: &str) {
        let violations = run(sql);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location(), Location::new(1, 8));
    }

    #[rstest]
    #[case::different_value("SELECT CASE WHEN ISNUMERIC(@x) = 1 THEN CONVERT(INT, @y) END")]
    #[case::already_try("SELECT CASE WHEN ISNUMERIC(@x) = 1 THEN TRY_CONVERT(INT, @x) END")]
    #[case::no_guard("SELECT CASE WHEN @x > 0 THEN CONVERT(INT, @x) END")]
    #[case::simple_case("SELECT CASE ISNUMERIC(@x) WHEN 1 THEN CONVERT(INT, @x) END")]
    #[case::keyless_value(
        "SELECT CASE WHEN ISNUMERIC(@x + '') = 1 THEN CONVERT(INT, @x + '') END"
    )]
    #[case::path_differs_in_case("SELECT CASE WHEN ISDATE(t.D) = 1 THEN CAST(t.d AS DATE) END FROM t")]
    fn test_no_violation(#[case] sql: &str) {
        assert!(run(sql).is_empty());
    }

    #[test]
    fn test_nested_case_expressions_report_separately() {
        let violations = run("SELECT CASE WHEN ISNUMERIC(@a) = 1 THEN CONVERT(INT, @a)
            ELSE CASE WHEN ISDATE(@b) = 1 THEN CAST(@b AS DATE) END END");
        assert_eq!(violations.len(), 2);
    }
}
