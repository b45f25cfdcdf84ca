//! prefer-concat-ws: `+` chains that repeat one separator between values.
//!
//! `a + ', ' + ISNULL(b, '') + ', ' + c` is `CONCAT_WS(', ', a, b, c)` with
//! the NULL handling built in. Only the outermost `+` of each chain is judged.

use crate::linter::chain::{match_separator_chain, ChainCollector};
use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{BinaryOperator, Node, SyntaxTree};
use crate::types::rule_ids;

pub struct PreferConcatWs;

impl LintRule for PreferConcatWs {
    fn id(&self) -> &'static str {
        rule_ids::PREFER_CONCAT_WS
    }

    fn message(&self) -> &'static str {
        "Prefer CONCAT_WS(separator, ...) over + when concatenating values with repeated separators."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        let mut visitor = SeparatorChains {
            additions: ChainCollector::new(BinaryOperator::Add),
        };
        traverse(&mut visitor, &mut ctx);
    }
}

struct SeparatorChains<'t> {
    additions: ChainCollector<'t>,
}

impl<'t> Visitor<'t> for SeparatorChains<'t> {
    fn visit(&mut self, node: Node<'t>, _ctx: &mut LintContext<'t, '_>) -> Walk {
        self.additions.collect(node);
        Walk::Continue
    }

    fn finish(&mut self, ctx: &mut LintContext<'t, '_>) {
        for chain in self.additions.outermost() {
            if match_separator_chain(&chain.operands).is_some() {
                ctx.report_at(&chain.span);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use crate::types::{Location, Violation};

    fn run(sql: &str) -> Vec<Violation> {
        let tree = parse_script(sql).expect("parse");
        let mut violations = Vec::new();
        PreferConcatWs.check(&tree, &mut violations);
        violations
    }

    #[test]
    fn test_repeated_separator_is_reported_once() {
        let violations = run("SELECT a + ', ' + ISNULL(b, '') + ', ' + c FROM t");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location(), Location::new(1, 8));
    }

    #[test]
    fn test_coalesce_counts_as_null_handling() {
        assert_eq!(
            run("SELECT first + ' ' + COALESCE(middle, '') + ' ' + last FROM people").len(),
            1
        );
    }

    #[test]
    fn test_mixed_separators_are_not_reported() {
        assert!(run("SELECT a + ', ' + ISNULL(b, '') + '; ' + c FROM t").is_empty());
    }

    #[test]
    fn test_without_null_handling_is_not_reported() {
        assert!(run("SELECT a + ', ' + b + ', ' + c FROM t").is_empty());
    }

    #[test]
    fn test_short_chains_and_empty_separators_are_not_reported() {
        assert!(run("SELECT a + ', ' + ISNULL(b, '') FROM t").is_empty());
        assert!(run("SELECT a + '' + ISNULL(b, '') + '' + c FROM t").is_empty());
    }

    #[test]
    fn test_chains_in_different_statements_are_judged_separately() {
        let violations = run("SELECT a + '-' + ISNULL(b, '') + '-' + c FROM t;
SET @x = a + '-' + b;
PRINT ISNULL(@a, '') + '|' + @b + '|' + @c;");
        assert_eq!(
            violations
                .iter()
                .map(Violation::location)
                .collect::<Vec<_>>(),
            vec![Location::new(1, 8), Location::new(3, 7)]
        );
    }
}
