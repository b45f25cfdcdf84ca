//! prefer-concat-over-plus-when-nullable-or-convert: `+` string building
//! mixed with `ISNULL`, `CONVERT` or `CAST`.
//!
//! Requires a string literal as a direct operand of the chain. `TRY_CAST`
//! and `TRY_CONVERT` do not count.

use crate::linter::chain::{
    contains_conversion, contains_function_call, is_string_literal, ChainCollector,
};
use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{BinaryOperator, Expr, Node, SyntaxTree};
use crate::types::rule_ids;

pub struct PreferConcatOverPlusWhenNullableOrConvert;

impl LintRule for PreferConcatOverPlusWhenNullableOrConvert {
    fn id(&self) -> &'static str {
        rule_ids::PREFER_CONCAT_OVER_PLUS_WHEN_NULLABLE_OR_CONVERT
    }

    fn message(&self) -> &'static str {
        "Use CONCAT when string building involves ISNULL/CONVERT/CAST to avoid NULL propagation or readability issues."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        let mut visitor = ConvertingChains {
            additions: ChainCollector::new(BinaryOperator::Add),
        };
        traverse(&mut visitor, &mut ctx);
    }
}

fn is_problematic(operand: &Expr) -> bool {
    contains_function_call(operand, &["ISNULL"]) || contains_conversion(operand)
}

struct ConvertingChains<'t> {
    additions: ChainCollector<'t>,
}

impl<'t> Visitor<'t> for ConvertingChains<'t> {
    fn visit(&mut self, node: Node<'t>, _ctx: &mut LintContext<'t, '_>) -> Walk {
        self.additions.collect(node);
        Walk::Continue
    }

    fn finish(&mut self, ctx: &mut LintContext<'t, '_>) {
        for chain in self.additions.outermost() {
            let has_literal = chain
                .operands
                .iter()
                .any(|operand| is_string_literal(operand));
            if has_literal && chain.operands.iter().any(|operand| is_problematic(operand)) {
                ctx.report_at(&chain.span);
            }
        }
    }
}
