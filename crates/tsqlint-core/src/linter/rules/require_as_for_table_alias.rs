//! require-as-for-table-alias: Table aliases written without `AS`.
//!
//! Covers named tables and derived tables; for a derived table the gap runs
//! from the end of the inner query, so the closing parenthesis is part of it.

use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::token_range::keyword_between;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{Keyword, Node, Span, SyntaxTree, TableReferenceKind};
use crate::types::rule_ids;

pub struct RequireAsForTableAlias;

impl LintRule for RequireAsForTableAlias {
    fn id(&self) -> &'static str {
        rule_ids::REQUIRE_AS_FOR_TABLE_ALIAS
    }

    fn message(&self) -> &'static str {
        "Table aliases must use AS."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        traverse(&mut TableAliases, &mut ctx);
    }
}

struct TableAliases;

impl<'t> Visitor<'t> for TableAliases {
    fn visit(&mut self, node: Node<'t>, ctx: &mut LintContext<'t, '_>) -> Walk {
        let Node::TableReference(table) = node else {
            return Walk::Continue;
        };

        let aliased: Option<(Span, Span)> = match &table.kind {
            TableReferenceKind::Named {
                name,
                alias: Some(alias),
                ..
            } => Some((name.span, alias.span)),
            TableReferenceKind::Derived {
                query,
                alias: Some(alias),
                ..
            } => Some((query.span, alias.span)),
            _ => None,
        };

        if let Some((source, alias)) = aliased {
            if keyword_between(ctx.tokens(), &source, &alias, Keyword::As) == Some(false) {
                ctx.report_at(&alias);
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
        RequireAsForTableAlias.check(&tree, &mut violations);
        violations
    }

    #[test]
    fn test_named_table_without_as() {
        let violations = run("SELECT c.Id FROM dbo.Customer c");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location(), Location::new(1, 31));
    }

    #[test]
    fn test_derived_table_without_as() {
        let violations = run("SELECT d.x FROM (SELECT 1 AS x) d");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location(), Location::new(1, 33));
    }

    #[rstest]
    #[case::named("SELECT c.Id FROM dbo.Customer AS c")]
    #[case::derived("SELECT d.x FROM (SELECT 1 AS x) AS d")]
    #[case::unaliased("SELECT Id FROM dbo.Customer")]
    #[case::hints("SELECT c.Id FROM dbo.Customer AS c WITH (NOLOCK)")]
    fn test_no_violation(#[case] sql: &str) {
        assert!(run(sql).is_empty());
    }

    #[test]
    fn test_every_table_of_a_join_is_checked() {
        let violations = run("SELECT * FROM dbo.A a INNER JOIN dbo.B AS b ON a.Id = b.Id
LEFT OUTER JOIN dbo.C c ON c.Id = a.Id");
        assert_eq!(
            violations
                .iter()
                .map(Violation::location)
                .collect::<Vec<_>>(),
            vec![Location::new(1, 21), Location::new(2, 23)]
        );
    }

    #[test]
    fn test_update_and_delete_targets_are_checked() {
        assert_eq!(
            run("UPDATE o SET Total = 0 FROM dbo.Orders o WHERE o.Id = 1").len(),
            1
        );
        assert_eq!(
            run("DELETE o FROM dbo.Orders o WHERE o.Id = 1").len(),
            1
        );
    }
}
