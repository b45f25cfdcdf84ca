//! prefer-concat-over-plus: `+` string building that patches NULLs by hand.
//!
//! A chain that contains a string literal and wraps some operand in `ISNULL`
//! or `COALESCE` reads better as `CONCAT(...)`, which treats NULL as empty.
//! Chains that qualify for `CONCAT_WS` are left to prefer-concat-ws.

use crate::linter::chain::{
    contains_function_call, contains_string_literal, match_separator_chain, ChainCollector,
    NULL_HANDLING_FUNCTIONS,
};
use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{BinaryOperator, Node, SyntaxTree};
use crate::types::rule_ids;

pub struct PreferConcatOverPlus;

impl LintRule for PreferConcatOverPlus {
    fn id(&self) -> &'static str {
        rule_ids::PREFER_CONCAT_OVER_PLUS
    }

    fn message(&self) -> &'static str {
        "Prefer CONCAT() for string concatenation when using ISNULL/COALESCE; it avoids NULL-propagation surprises and improves readability."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        let mut visitor = NullPatchedChains {
            additions: ChainCollector::new(BinaryOperator::Add),
        };
        traverse(&mut visitor, &mut ctx);
    }
}

struct NullPatchedChains<'t> {
    additions: ChainCollector<'t>,
}

impl<'t> Visitor<'t> for NullPatchedChains<'t> {
    fn visit(&mut self, node: Node<'t>, _ctx: &mut LintContext<'t, '_>) -> Walk {
        self.additions.collect(node);
        Walk::Continue
    }

    fn finish(&mut self, ctx: &mut LintContext<'t, '_>) {
        for chain in self.additions.outermost() {
            if match_separator_chain(&chain.operands).is_some() {
                continue;
            }
            let operands = &chain.operands;
            let has_literal = operands.iter().any(|operand| contains_string_literal(operand));
            let handles_null = operands
                .iter()
                .any(|operand| contains_function_call(operand, NULL_HANDLING_FUNCTIONS));
            if has_literal && handles_null {
                ctx.report_at(&chain.span);
            }
        }
    }
}
