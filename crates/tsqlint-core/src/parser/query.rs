//! `SELECT` queries, select lists and table references.

use super::{Parser, Result};
use crate::syntax::{
    CommonTableExpression, Ident, Keyword, ObjectName, OrderByItem, QualifiedJoinType, Query,
    QueryExpr, QueryExprKind, QuerySpecification, SelectElement, SelectElementKind, SetOperator,
    SortDirection, TableReference, TableReferenceKind, TokenKind, TopClause, UnqualifiedJoinType,
    WhereClause,
};

/// Join hints accepted between the join type and `JOIN`.
const JOIN_HINTS: &[&str] = &["LOOP", "HASH", "MERGE", "REMOTE"];

impl<'t> Parser<'t> {
    pub(super) fn parse_query(&mut self) -> Result<Query> {
        self.nested(|p| p.parse_query_inner())
    }

    fn parse_query_inner(&mut self) -> Result<Query> {
        let start = self.pos;
        let ctes = if self.consume_keyword(Keyword::With) {
            self.parse_ctes()?
        } else {
            Vec::new()
        };

        let body = self.parse_query_expr()?;

        let order_by = if self.check_keyword(Keyword::Order) {
            self.parse_order_by()?
        } else {
            Vec::new()
        };

        let mut offset = None;
        let mut fetch = None;
        if self.consume_word("OFFSET") {
            offset = Some(self.parse_expression()?);
            if !self.consume_word("ROWS") {
                self.expect_word("ROW")?;
            }
            if self.consume_keyword(Keyword::Fetch) {
                if !self.consume_word("NEXT") {
                    self.expect_word("FIRST")?;
                }
                fetch = Some(self.parse_expression()?);
                if !self.consume_word("ROWS") {
                    self.expect_word("ROW")?;
                }
                self.expect_word("ONLY")?;
            }
        }

        if self.consume_keyword(Keyword::Option) {
            self.skip_parenthesized()?;
        }

        Ok(Query {
            ctes,
            body,
            order_by,
            offset,
            fetch,
            span: self.span_from(start),
        })
    }

    fn parse_ctes(&mut self) -> Result<Vec<CommonTableExpression>> {
        let mut ctes = Vec::new();
        loop {
            let start = self.pos;
            let name = self.parse_ident()?;
            let columns = if self.check(TokenKind::LParen) {
                self.parse_parenthesized_idents()?
            } else {
                Vec::new()
            };
            self.expect_keyword(Keyword::As)?;
            self.expect(TokenKind::LParen)?;
            let query = self.parse_query()?;
            self.expect(TokenKind::RParen)?;
            ctes.push(CommonTableExpression {
                name,
                columns,
                query,
                span: self.span_from(start),
            });
            if !self.consume(TokenKind::Comma) {
                return Ok(ctes);
            }
        }
    }

    fn parse_query_expr(&mut self) -> Result<QueryExpr> {
        let start = self.pos;
        let mut left = self.parse_query_term()?;
        loop {
            let operator = if self.consume_keyword(Keyword::Union) {
                SetOperator::Union
            } else if self.consume_keyword(Keyword::Except) {
                SetOperator::Except
            } else if self.consume_keyword(Keyword::Intersect) {
                SetOperator::Intersect
            } else {
                return Ok(left);
            };
            let all = self.consume_keyword(Keyword::All);
            let right = self.parse_query_term()?;
            left = QueryExpr {
                kind: QueryExprKind::SetOperation {
                    operator,
                    all,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span: self.span_from(start),
            };
        }
    }

    fn parse_query_term(&mut self) -> Result<QueryExpr> {
        let start = self.pos;
        let kind = if self.consume(TokenKind::LParen) {
            let query = self.parse_query()?;
            self.expect(TokenKind::RParen)?;
            QueryExprKind::Parenthesized(Box::new(query))
        } else if self.check_keyword(Keyword::Select) {
            QueryExprKind::Specification(Box::new(self.parse_query_specification()?))
        } else {
            return Err(self.error_expected("SELECT"));
        };
        Ok(QueryExpr {
            kind,
            span: self.span_from(start),
        })
    }

    fn parse_query_specification(&mut self) -> Result<QuerySpecification> {
        let start = self.pos;
        self.expect_keyword(Keyword::Select)?;

        let distinct = self.consume_keyword(Keyword::Distinct);
        if !distinct {
            self.consume_keyword(Keyword::All);
        }
        let top = if self.check_keyword(Keyword::Top) {
            Some(self.parse_top()?)
        } else {
            None
        };

        let mut select_list = vec![self.parse_select_element()?];
        while self.consume(TokenKind::Comma) {
            select_list.push(self.parse_select_element()?);
        }

        let into = if self.consume_keyword(Keyword::Into) {
            Some(self.parse_object_name()?)
        } else {
            None
        };

        let from = if self.consume_keyword(Keyword::From) {
            self.parse_table_references()?
        } else {
            Vec::new()
        };

        let where_clause = self.parse_where_clause()?;

        let mut group_by = Vec::new();
        if self.check_keyword(Keyword::Group) && self.peek_keyword(1, Keyword::By) {
            self.advance();
            self.advance();
            group_by = self.parse_expression_list()?;
        }

        let having = if self.consume_keyword(Keyword::Having) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(QuerySpecification {
            distinct,
            top,
            select_list,
            into,
            from,
            where_clause,
            group_by,
            having,
            span: self.span_from(start),
        })
    }

    /// `TOP n`, `TOP (expr)`, optionally `PERCENT` and `WITH TIES`.
    pub(super) fn parse_top(&mut self) -> Result<TopClause> {
        let start = self.pos;
        self.expect_keyword(Keyword::Top)?;
        let expr = if self.consume(TokenKind::LParen) {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::RParen)?;
            expr
        } else {
            self.parse_primary()?
        };
        let percent = self.consume_keyword(Keyword::Percent);
        let with_ties = self.check_keyword(Keyword::With) && self.peek_word(1, "TIES");
        if with_ties {
            self.advance();
            self.advance();
        }
        Ok(TopClause {
            expr,
            percent,
            with_ties,
            span: self.span_from(start),
        })
    }

    fn parse_select_element(&mut self) -> Result<SelectElement> {
        let start = self.pos;

        let kind = if self.consume(TokenKind::Star) {
            SelectElementKind::Wildcard { qualifier: None }
        } else if self.is_qualified_wildcard() {
            let qualifier = self.parse_object_name()?;
            self.expect(TokenKind::Period)?;
            self.expect(TokenKind::Star)?;
            SelectElementKind::Wildcard {
                qualifier: Some(qualifier),
            }
        } else if self.check(TokenKind::Variable) && self.is_simple_assignment(1) {
            let variable = self.parse_variable()?;
            self.advance();
            SelectElementKind::VariableAssignment {
                variable,
                value: self.parse_expression()?,
            }
        } else if self.check_identifier() && self.is_simple_assignment(1) {
            // `alias = expr`
            let alias = self.parse_ident()?;
            self.advance();
            SelectElementKind::Expression {
                expr: self.parse_expression()?,
                alias: Some(alias),
            }
        } else {
            let expr = self.parse_expression()?;
            let alias = if self.consume_keyword(Keyword::As) {
                Some(self.parse_alias()?)
            } else if self.is_alias_candidate()
                || self.check(TokenKind::StringLiteral)
                || self.check(TokenKind::NationalStringLiteral)
            {
                Some(self.parse_alias()?)
            } else {
                None
            };
            SelectElementKind::Expression { expr, alias }
        };

        Ok(SelectElement {
            kind,
            span: self.span_from(start),
        })
    }

    /// `=` at `offset` that is not part of a compound operator.
    fn is_simple_assignment(&self, offset: usize) -> bool {
        self.peek_is(offset, TokenKind::Eq)
    }

    /// `name(.name)*.*`
    fn is_qualified_wildcard(&self) -> bool {
        let mut offset = 0;
        loop {
            let is_name = self.peek(offset).is_some_and(|token| token.is_identifier());
            if !is_name || !self.peek_is(offset + 1, TokenKind::Period) {
                return false;
            }
            if self.peek_is(offset + 2, TokenKind::Star) {
                return true;
            }
            offset += 2;
        }
    }

    /// Column alias: identifier or string literal.
    fn parse_alias(&mut self) -> Result<Ident> {
        if self.check(TokenKind::StringLiteral) || self.check(TokenKind::NationalStringLiteral) {
            self.take_ident()
        } else {
            self.parse_ident()
        }
    }

    pub(super) fn parse_where_clause(&mut self) -> Result<Option<WhereClause>> {
        if !self.check_keyword(Keyword::Where) {
            return Ok(None);
        }
        let start = self.pos;
        self.advance();
        let condition = self.parse_expression()?;
        Ok(Some(WhereClause {
            condition,
            span: self.span_from(start),
        }))
    }

    /// `ORDER BY item[, item...]`
    pub(super) fn parse_order_by(&mut self) -> Result<Vec<OrderByItem>> {
        self.expect_keyword(Keyword::Order)?;
        self.expect_keyword(Keyword::By)?;
        let mut items = Vec::new();
        loop {
            let start = self.pos;
            let expr = self.parse_expression()?;
            let direction = if self.consume_keyword(Keyword::Asc) {
                Some(SortDirection::Asc)
            } else if self.consume_keyword(Keyword::Desc) {
                Some(SortDirection::Desc)
            } else {
                None
            };
            items.push(OrderByItem {
                expr,
                direction,
                span: self.span_from(start),
            });
            if !self.consume(TokenKind::Comma) {
                return Ok(items);
            }
        }
    }

    // ========================================================================
    // Table references
    // ========================================================================

    pub(super) fn parse_table_references(&mut self) -> Result<Vec<TableReference>> {
        let mut tables = vec![self.parse_table_reference()?];
        while self.consume(TokenKind::Comma) {
            tables.push(self.parse_table_reference()?);
        }
        Ok(tables)
    }

    /// A table factor followed by any number of joins, nested left-deep.
    pub(super) fn parse_table_reference(&mut self) -> Result<TableReference> {
        let start = self.pos;
        let mut left = self.parse_table_factor()?;

        loop {
            if let Some(join_type) = self.parse_qualified_join_type()? {
                let second = self.parse_table_factor()?;
                self.expect_keyword(Keyword::On)?;
                let condition = self.parse_expression()?;
                left = TableReference {
                    kind: TableReferenceKind::QualifiedJoin {
                        first: Box::new(left),
                        second: Box::new(second),
                        join_type,
                        condition,
                    },
                    span: self.span_from(start),
                };
            } else if let Some(join_type) = self.parse_unqualified_join_type()? {
                let second = self.parse_table_factor()?;
                left = TableReference {
                    kind: TableReferenceKind::UnqualifiedJoin {
                        first: Box::new(left),
                        second: Box::new(second),
                        join_type,
                    },
                    span: self.span_from(start),
                };
            } else {
                return Ok(left);
            }
        }
    }

    /// Consumes `[INNER | {LEFT|RIGHT|FULL} [OUTER]] [hint] JOIN`.
    fn parse_qualified_join_type(&mut self) -> Result<Option<QualifiedJoinType>> {
        let join_type = if self.consume_keyword(Keyword::Inner) {
            QualifiedJoinType::Inner
        } else if self.consume_keyword(Keyword::Left) {
            self.consume_keyword(Keyword::Outer);
            QualifiedJoinType::LeftOuter
        } else if self.consume_keyword(Keyword::Right) {
            self.consume_keyword(Keyword::Outer);
            QualifiedJoinType::RightOuter
        } else if self.consume_keyword(Keyword::Full) {
            self.consume_keyword(Keyword::Outer);
            QualifiedJoinType::FullOuter
        } else if self.check_keyword(Keyword::Join) {
            QualifiedJoinType::Inner
        } else {
            return Ok(None);
        };

        if JOIN_HINTS.iter().any(|hint| self.check_word(hint)) {
            self.advance();
        }
        self.expect_keyword(Keyword::Join)?;
        Ok(Some(join_type))
    }

    /// Consumes `CROSS JOIN`, `CROSS APPLY` or `OUTER APPLY`.
    fn parse_unqualified_join_type(&mut self) -> Result<Option<UnqualifiedJoinType>> {
        if self.check_keyword(Keyword::Cross) {
            self.advance();
            if self.consume_keyword(Keyword::Join) {
                return Ok(Some(UnqualifiedJoinType::CrossJoin));
            }
            self.expect_word("APPLY")?;
            return Ok(Some(UnqualifiedJoinType::CrossApply));
        }
        if self.check_keyword(Keyword::Outer) && self.peek_word(1, "APPLY") {
            self.advance();
            self.advance();
            return Ok(Some(UnqualifiedJoinType::OuterApply));
        }
        Ok(None)
    }

    pub(super) fn parse_table_factor(&mut self) -> Result<TableReference> {
        let start = self.pos;

        if self.check(TokenKind::LParen) {
            self.advance();
            if self.starts_query() {
                let query = self.parse_query()?;
                self.expect(TokenKind::RParen)?;
                let alias = self.parse_table_alias()?;
                let columns = if alias.is_some() && self.check(TokenKind::LParen) {
                    self.parse_parenthesized_idents()?
                } else {
                    Vec::new()
                };
                return Ok(TableReference {
                    kind: TableReferenceKind::Derived {
                        query: Box::new(query),
                        alias,
                        columns,
                    },
                    span: self.span_from(start),
                });
            }

            let inner = self.parse_table_reference()?;
            self.expect(TokenKind::RParen)?;
            return Ok(TableReference {
                kind: TableReferenceKind::Parenthesized(Box::new(inner)),
                span: self.span_from(start),
            });
        }

        let name = self.parse_object_name()?;

        if self.check(TokenKind::LParen) {
            self.advance();
            let arguments = if self.check(TokenKind::RParen) {
                Vec::new()
            } else {
                self.parse_expression_list()?
            };
            self.expect(TokenKind::RParen)?;
            let alias = self.parse_table_alias()?;
            return Ok(TableReference {
                kind: TableReferenceKind::Function {
                    name,
                    arguments,
                    alias,
                },
                span: self.span_from(start),
            });
        }

        let alias = self.parse_table_alias()?;
        let hints = self.parse_table_hints()?;

        Ok(TableReference {
            kind: TableReferenceKind::Named { name, alias, hints },
            span: self.span_from(start),
        })
    }

    fn parse_table_alias(&mut self) -> Result<Option<Ident>> {
        if self.consume_keyword(Keyword::As) {
            return self.parse_ident().map(Some);
        }
        if self.is_alias_candidate() {
            return self.parse_ident().map(Some);
        }
        Ok(None)
    }

    /// `WITH (NOLOCK, INDEX(ix), ...)`; hint arguments are skipped.
    fn parse_table_hints(&mut self) -> Result<Vec<Ident>> {
        if !(self.check_keyword(Keyword::With) && self.peek_is(1, TokenKind::LParen)) {
            return Ok(Vec::new());
        }
        self.advance();
        self.advance();

        let mut hints = Vec::new();
        loop {
            let is_word = self.current().is_some_and(|token| {
                matches!(
                    token.kind,
                    TokenKind::Identifier | TokenKind::Keyword(_) | TokenKind::QuotedIdentifier
                )
            });
            if !is_word {
                return Err(self.error_expected("table hint"));
            }
            hints.push(self.take_ident()?);
            if self.check(TokenKind::LParen) {
                self.skip_parenthesized()?;
            } else if self.consume(TokenKind::Eq) {
                self.advance();
            }
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(hints)
    }
}

/// Helper for callers holding a single-part name.
pub(super) fn single_part_name(ident: Ident) -> ObjectName {
    ObjectName {
        span: ident.span,
        parts: vec![ident],
    }
}
