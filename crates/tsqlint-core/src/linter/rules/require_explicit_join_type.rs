//! require-explicit-join-type: `JOIN` without `INNER`, or an outer join
//! without `OUTER`.
//!
//! The parser normalizes `JOIN` to an inner join and `LEFT JOIN` to a left
//! outer join, so the written keywords are recovered from the tokens between
//! the two joined tables.

use crate::linter::rule::{LintContext, LintRule};
use crate::linter::sink::ViolationSink;
use crate::linter::token_range::{first_token_of, has_token, token_range_between};
use crate::linter::visit::{traverse, Visitor, Walk};
use crate::syntax::{Keyword, Node, QualifiedJoinType, SyntaxTree, TableReferenceKind, TokenKind};
use crate::types::{rule_ids, Location};

pub struct RequireExplicitJoinType;

impl LintRule for RequireExplicitJoinType {
    fn id(&self) -> &'static str {
        rule_ids::REQUIRE_EXPLICIT_JOIN_TYPE
    }

    fn message(&self) -> &'static str {
        "JOIN must be explicit: use INNER JOIN, LEFT OUTER JOIN, RIGHT OUTER JOIN, or FULL OUTER JOIN."
    }

    fn check(&self, tree: &SyntaxTree, sink: &mut dyn ViolationSink) {
        let mut ctx = LintContext::new(tree, self, sink);
        traverse(&mut QualifiedJoins, &mut ctx);
    }
}

/// The keyword a join of this type must spell out.
fn required_keyword(join_type: QualifiedJoinType) -> Keyword {
    match join_type {
        QualifiedJoinType::Inner => Keyword::Inner,
        QualifiedJoinType::LeftOuter | QualifiedJoinType::RightOuter | QualifiedJoinType::FullOuter => {
            Keyword::Outer
        }
    }
}

struct QualifiedJoins;

impl<'t> Visitor<'t> for QualifiedJoins {
    fn visit(&mut self, node: Node<'t>, ctx: &mut LintContext<'t, '_>) -> Walk {
        let Node::TableReference(table) = node else {
            return Walk::Continue;
        };
        let TableReferenceKind::QualifiedJoin {
            first,
            second,
            join_type,
            ..
        } = &table.kind
        else {
            return Walk::Continue;
        };
        let Some(range) = token_range_between(&first.span, &second.span) else {
            return Walk::Continue;
        };

        let tokens = ctx.tokens();
        let keyword = TokenKind::Keyword(required_keyword(*join_type));
        if !has_token(tokens, range.start, range.end, keyword) {
            let location = first_token_of(tokens, range, TokenKind::Keyword(Keyword::Join))
                .map_or(table.span.location(), |token| {
                    Location::new(token.line, token.column)
                });
            ctx.report(location);
        }
        Walk::Continue
    }
}
