//! require-as-for-column-alias: Column aliases written without `AS`.
//!
//! The tree keeps the alias but not whether `AS` was written, so the rule
//! scans the tokens between the expression and its alias. `alias = expr`
//! puts the alias first; that gap cannot be scanned and is never reported.

use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::token_range::keyword_between;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{Keyword, Node, SelectElementKind, SyntaxTree};
use crate::types::rule_ids;

pub struct RequireAsForColumnAlias;

impl LintRule for RequireAsForColumnAlias {
    fn id(&self) -> &'static str {
        rule_ids::REQUIRE_AS_FOR_COLUMN_ALIAS
    }

    fn message(&self) -> &'static str {
        "Column aliases must use AS."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        traverse(&mut ColumnAliases, &mut ctx);
    }
}

struct ColumnAliases;

impl<'t> Visitor<'t> for ColumnAliases {
    fn visit(&mut self, node: Node<'t>, ctx: &mut LintContext<'t, '_>) -> Walk {
        if let Node::SelectElement(element) = node {
            if let SelectElementKind::Expression {
                expr,
                alias: Some(alias),
            } = &element.kind
            {
                if keyword_between(ctx.tokens(), &expr.span, &alias.span, Keyword::As)
                    == Some(false)
                {
                    ctx.report_at(&alias.span);
                }
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
        RequireAsForColumnAlias.check(&tree, &mut violations);
        violations
    }

    #[test]
    fn test_missing_as_is_reported_at_alias() {
        let violations = run("SELECT col alias FROM t");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location(), Location::new(1, 12));
    }

    #[rstest]
    #[case::explicit_as("SELECT col AS alias FROM t")]
    #[case::as_across_lines("SELECT col\n    AS\n    alias FROM t")]
    #[case::as_after_comment("SELECT col /* note */ AS alias FROM t")]
    #[case::equals_form("SELECT alias = col FROM t")]
    #[case::no_alias("SELECT col FROM t")]
    fn test_no_violation(#[case] sql: &str) {
        assert!(run(sql).is_empty());
    }

    #[test]
    fn test_comment_between_is_not_as() {
        let violations = run("SELECT col /* AS */ alias FROM t");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_nested_queries_are_checked() {
        let violations = run("SELECT x FROM (SELECT a + 1 total FROM t) AS d
WHERE EXISTS (SELECT 1 one FROM u)");
        assert_eq!(
            violations
                .iter()
                .map(Violation::location)
                .collect::<Vec<_>>(),
            vec![Location::new(1, 29), Location::new(2, 24)]
        );
    }

    #[test]
    fn test_string_literal_alias_without_as() {
        assert_eq!(run("SELECT col 'Label' FROM t").len(), 1);
    }
}
