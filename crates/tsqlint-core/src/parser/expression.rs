//! Scalar and boolean expressions.
//!
//! Precedence, loosest first: `OR`, `AND`, `NOT`, comparisons and
//! predicates (`IS`, `IN`, `BETWEEN`, `LIKE`), additive and bitwise
//! operators, multiplicative operators, unary sign and `~`.

use super::query::single_part_name;
use super::{Parser, Result};
use crate::syntax::{
    BinaryOperator, CaseExpr, Conversion, ConversionFunction, Expr, ExprKind, FunctionCall,
    Keyword, Literal, LiteralKind, ObjectName, TokenKind, UnaryOperator, WhenClause, WindowSpec,
};

impl<'t> Parser<'t> {
    pub(super) fn parse_expression(&mut self) -> Result<Expr> {
        self.nested(|p| p.parse_or())
    }

    fn binary(&self, start: usize, op: BinaryOperator, left: Expr, right: Expr) -> Expr {
        Expr {
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span: self.span_from(start),
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let start = self.pos;
        let mut left = self.parse_and()?;
        while self.consume_keyword(Keyword::Or) {
            let right = self.parse_and()?;
            left = self.binary(start, BinaryOperator::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let start = self.pos;
        let mut left = self.parse_not()?;
        while self.consume_keyword(Keyword::And) {
            let right = self.parse_not()?;
            left = self.binary(start, BinaryOperator::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if !self.check_keyword(Keyword::Not) {
            return self.parse_predicate();
        }
        let start = self.pos;
        self.advance();
        let expr = self.nested(|p| p.parse_not())?;
        Ok(Expr {
            kind: ExprKind::Unary {
                op: UnaryOperator::Not,
                expr: Box::new(expr),
            },
            span: self.span_from(start),
        })
    }

    fn parse_predicate(&mut self) -> Result<Expr> {
        let start = self.pos;
        let left = self.parse_additive()?;

        if let Some(op) = self.comparison_operator() {
            let right = self.parse_additive()?;
            return Ok(self.binary(start, op, left, right));
        }

        if self.consume_keyword(Keyword::Is) {
            let negated = self.consume_keyword(Keyword::Not);
            self.expect_keyword(Keyword::Null)?;
            return Ok(Expr {
                kind: ExprKind::IsNull {
                    expr: Box::new(left),
                    negated,
                },
                span: self.span_from(start),
            });
        }

        let negated = self.check_keyword(Keyword::Not)
            && (self.peek_keyword(1, Keyword::In)
                || self.peek_keyword(1, Keyword::Between)
                || self.peek_keyword(1, Keyword::Like));
        if negated {
            self.advance();
        }

        let kind = if self.consume_keyword(Keyword::In) {
            self.expect(TokenKind::LParen)?;
            let kind = if self.starts_query() {
                ExprKind::InSubquery {
                    expr: Box::new(left),
                    subquery: Box::new(self.parse_query()?),
                    negated,
                }
            } else {
                ExprKind::InList {
                    expr: Box::new(left),
                    list: self.parse_expression_list()?,
                    negated,
                }
            };
            self.expect(TokenKind::RParen)?;
            kind
        } else if self.consume_keyword(Keyword::Between) {
            let low = self.parse_additive()?;
            self.expect_keyword(Keyword::And)?;
            let high = self.parse_additive()?;
            ExprKind::Between {
                expr: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            }
        } else if self.consume_keyword(Keyword::Like) {
            let pattern = self.parse_additive()?;
            let escape = if self.consume_keyword(Keyword::Escape) {
                Some(Box::new(self.parse_additive()?))
            } else {
                None
            };
            ExprKind::Like {
                expr: Box::new(left),
                pattern: Box::new(pattern),
                escape,
                negated,
            }
        } else {
            return Ok(left);
        };

        Ok(Expr {
            kind,
            span: self.span_from(start),
        })
    }

    /// Consumes a comparison operator, including `!<` and `!>`.
    fn comparison_operator(&mut self) -> Option<BinaryOperator> {
        let kind = self.current()?.kind;
        let op = match kind {
            TokenKind::Eq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::LtEq => BinaryOperator::LtEq,
            TokenKind::GtEq => BinaryOperator::GtEq,
            TokenKind::Bang if self.peek_is(1, TokenKind::Lt) => {
                self.advance();
                BinaryOperator::NotLt
            }
            TokenKind::Bang if self.peek_is(1, TokenKind::Gt) => {
                self.advance();
                BinaryOperator::NotGt
            }
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let start = self.pos;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current().map(|token| token.kind) {
                Some(TokenKind::Plus) => BinaryOperator::Add,
                Some(TokenKind::Minus) => BinaryOperator::Subtract,
                Some(TokenKind::Ampersand) => BinaryOperator::BitAnd,
                Some(TokenKind::Pipe) => BinaryOperator::BitOr,
                Some(TokenKind::Caret) => BinaryOperator::BitXor,
                _ => break,
            };
            // `+=` belongs to a compound assignment, not to this expression.
            if self.peek_is(1, TokenKind::Eq) {
                break;
            }
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(start, op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let start = self.pos;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().map(|token| token.kind) {
                Some(TokenKind::Star) => BinaryOperator::Multiply,
                Some(TokenKind::Slash) => BinaryOperator::Divide,
                Some(TokenKind::Percent) => BinaryOperator::Modulo,
                _ => break,
            };
            if self.peek_is(1, TokenKind::Eq) {
                break;
            }
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(start, op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.current().map(|token| token.kind) {
            Some(TokenKind::Minus) => UnaryOperator::Minus,
            Some(TokenKind::Plus) => UnaryOperator::Plus,
            Some(TokenKind::Tilde) => UnaryOperator::BitNot,
            _ => return self.parse_primary(),
        };
        let start = self.pos;
        self.advance();
        let expr = self.nested(|p| p.parse_unary())?;
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_primary(&mut self) -> Result<Expr> {
        let start = self.pos;
        let token = self
            .current()
            .ok_or_else(|| self.error_expected("expression"))?;

        let kind = match token.kind {
            TokenKind::StringLiteral => self.literal(LiteralKind::String),
            TokenKind::NationalStringLiteral => self.literal(LiteralKind::NationalString),
            TokenKind::BinaryLiteral => self.literal(LiteralKind::Binary),
            TokenKind::NumberLiteral => {
                let numeric = token.value.contains(['.', 'e', 'E']);
                self.literal(if numeric {
                    LiteralKind::Numeric
                } else {
                    LiteralKind::Integer
                })
            }
            TokenKind::Keyword(Keyword::Null) => self.literal(LiteralKind::Null),
            TokenKind::Keyword(Keyword::Default) => self.literal(LiteralKind::Default),
            TokenKind::Variable => ExprKind::Variable(self.parse_variable()?),
            TokenKind::Star => {
                self.advance();
                ExprKind::Wildcard
            }
            TokenKind::LParen => {
                self.advance();
                let kind = if self.starts_query() {
                    ExprKind::Subquery(Box::new(self.parse_query()?))
                } else {
                    ExprKind::Nested(Box::new(self.parse_expression()?))
                };
                self.expect(TokenKind::RParen)?;
                kind
            }
            TokenKind::Keyword(Keyword::Case) => ExprKind::Case(self.parse_case()?),
            TokenKind::Keyword(Keyword::Cast) => {
                ExprKind::Conversion(Box::new(self.parse_cast(ConversionFunction::Cast)?))
            }
            TokenKind::Keyword(Keyword::Convert) => {
                ExprKind::Conversion(Box::new(self.parse_convert(ConversionFunction::Convert)?))
            }
            TokenKind::Identifier
                if token.is_word("TRY_CAST") && self.peek_is(1, TokenKind::LParen) =>
            {
                ExprKind::Conversion(Box::new(self.parse_cast(ConversionFunction::TryCast)?))
            }
            TokenKind::Identifier
                if token.is_word("TRY_CONVERT") && self.peek_is(1, TokenKind::LParen) =>
            {
                ExprKind::Conversion(Box::new(self.parse_convert(ConversionFunction::TryConvert)?))
            }
            TokenKind::Keyword(Keyword::Exists) => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let query = self.parse_query()?;
                self.expect(TokenKind::RParen)?;
                ExprKind::Exists(Box::new(query))
            }
            // LEFT(...) and RIGHT(...) are reserved words used as functions.
            TokenKind::Keyword(Keyword::Left | Keyword::Right)
                if self.peek_is(1, TokenKind::LParen) =>
            {
                let name = single_part_name(self.take_ident()?);
                ExprKind::Function(Box::new(self.parse_function_call(name)?))
            }
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                let name = self.parse_object_name()?;
                if self.check(TokenKind::LParen) {
                    ExprKind::Function(Box::new(self.parse_function_call(name)?))
                } else {
                    ExprKind::Column(name.parts)
                }
            }
            _ => return Err(self.error_expected("expression")),
        };

        Ok(Expr {
            kind,
            span: self.span_from(start),
        })
    }

    fn literal(&mut self, kind: LiteralKind) -> ExprKind {
        let value = self
            .advance()
            .map(|token| token.value.clone())
            .unwrap_or_default();
        ExprKind::Literal(Literal { kind, value })
    }

    /// True at `SELECT`, `WITH` or a parenthesized query.
    pub(super) fn starts_query(&self) -> bool {
        let mut offset = 0;
        while self.peek_is(offset, TokenKind::LParen) {
            offset += 1;
        }
        self.peek_keyword(offset, Keyword::Select)
            || (offset == 0 && self.peek_keyword(0, Keyword::With))
    }

    pub(super) fn parse_expression_list(&mut self) -> Result<Vec<Expr>> {
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(TokenKind::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    fn parse_function_call(&mut self, name: ObjectName) -> Result<FunctionCall> {
        self.expect(TokenKind::LParen)?;
        let mut distinct = false;
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RParen) {
            distinct = self.consume_keyword(Keyword::Distinct);
            if !distinct {
                self.consume_keyword(Keyword::All);
            }
            arguments = self.parse_expression_list()?;
        }
        self.expect(TokenKind::RParen)?;

        let mut within_group = Vec::new();
        if self.check_word("WITHIN") && self.peek_keyword(1, Keyword::Group) {
            self.advance();
            self.advance();
            self.expect(TokenKind::LParen)?;
            within_group = self.parse_order_by()?;
            self.expect(TokenKind::RParen)?;
        }

        let over = if self.check_keyword(Keyword::Over) {
            Some(self.parse_window_spec()?)
        } else {
            None
        };

        Ok(FunctionCall {
            name,
            distinct,
            arguments,
            within_group,
            over,
        })
    }

    fn parse_window_spec(&mut self) -> Result<WindowSpec> {
        self.expect_keyword(Keyword::Over)?;
        let start = self.pos;
        self.expect(TokenKind::LParen)?;

        let mut partition_by = Vec::new();
        if self.check_word("PARTITION") && self.peek_keyword(1, Keyword::By) {
            self.advance();
            self.advance();
            partition_by = self.parse_expression_list()?;
        }

        let mut order_by = Vec::new();
        if self.check_keyword(Keyword::Order) {
            order_by = self.parse_order_by()?;
        }

        // Frame clauses (ROWS/RANGE ...) are not modelled.
        let mut depth = 0usize;
        while !self.is_at_end() && !(depth == 0 && self.check(TokenKind::RParen)) {
            match self.advance().map(|token| token.kind) {
                Some(TokenKind::LParen) => depth += 1,
                Some(TokenKind::RParen) => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(WindowSpec {
            partition_by,
            order_by,
            span: self.span_from(start),
        })
    }

    fn parse_case(&mut self) -> Result<CaseExpr> {
        self.expect_keyword(Keyword::Case)?;
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        let mut when_clauses = Vec::new();
        while self.check_keyword(Keyword::When) {
            let start = self.pos;
            self.advance();
            let condition = self.parse_expression()?;
            self.expect_keyword(Keyword::Then)?;
            let result = self.parse_expression()?;
            when_clauses.push(WhenClause {
                condition,
                result,
                span: self.span_from(start),
            });
        }
        if when_clauses.is_empty() {
            return Err(self.error_expected("WHEN"));
        }

        let else_result = if self.consume_keyword(Keyword::Else) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;

        Ok(CaseExpr {
            operand,
            when_clauses,
            else_result,
        })
    }

    /// `CAST(expr AS type)` / `TRY_CAST(expr AS type)`.
    fn parse_cast(&mut self, function: ConversionFunction) -> Result<Conversion> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_data_type()?;
        self.expect(TokenKind::RParen)?;
        Ok(Conversion {
            function,
            data_type,
            expr: Box::new(expr),
            style: None,
        })
    }

    /// `CONVERT(type, expr[, style])` / `TRY_CONVERT(...)`.
    fn parse_convert(&mut self, function: ConversionFunction) -> Result<Conversion> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let data_type = self.parse_data_type()?;
        self.expect(TokenKind::Comma)?;
        let expr = self.parse_expression()?;
        let style = if self.consume(TokenKind::Comma) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect(TokenKind::RParen)?;
        Ok(Conversion {
            function,
            data_type,
            expr: Box::new(expr),
            style,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_script;
    use crate::syntax::*;

    fn select_expr(sql: &str) -> Expr {
        let tree = parse_script(sql).expect("parse");
        let StatementKind::Select(query) = &tree.script().batches[0].statements[0].kind else {
            panic!("expected SELECT");
        };
        let QueryExprKind::Specification(spec) = &query.body.kind else {
            panic!("expected query specification");
        };
        match &spec.select_list[0].kind {
            SelectElementKind::Expression { expr, .. } => expr.clone(),
            other => panic!("unexpected select element {other:?}"),
        }
    }

    #[test]
    fn plus_chains_are_left_deep() {
        let expr = select_expr("SELECT a + b + c");
        let ExprKind::Binary { op, left, .. } = &expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOperator::Add);
        assert!(matches!(
            left.kind,
            ExprKind::Binary {
                op: BinaryOperator::Add,
                ..
            }
        ));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = select_expr("SELECT a + b * c");
        let ExprKind::Binary { op, right, .. } = &expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOperator::Add);
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOperator::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let tree = parse_script("SELECT 1 FROM t WHERE a = 1 OR b = 2 AND c = 3").expect("parse");
        let StatementKind::Select(query) = &tree.script().batches[0].statements[0].kind else {
            panic!("expected SELECT");
        };
        let QueryExprKind::Specification(spec) = &query.body.kind else {
            panic!("expected specification");
        };
        let condition = &spec.where_clause.as_ref().expect("where").condition;
        assert!(matches!(
            condition.kind,
            ExprKind::Binary {
                op: BinaryOperator::Or,
                ..
            }
        ));
    }

    #[test]
    fn parses_conversions() {
        let expr = select_expr("SELECT TRY_CONVERT(INT, @x, 1)");
        let ExprKind::Conversion(conversion) = &expr.kind else {
            panic!("expected conversion");
        };
        assert_eq!(conversion.function, ConversionFunction::TryConvert);
        assert_eq!(conversion.data_type.name.simple_name(), "INT");
        assert!(conversion.style.is_some());

        let expr = select_expr("SELECT CAST(x AS NVARCHAR(MAX))");
        let ExprKind::Conversion(conversion) = &expr.kind else {
            panic!("expected conversion");
        };
        assert_eq!(conversion.function, ConversionFunction::Cast);
        assert_eq!(conversion.data_type.arguments, vec!["MAX".to_string()]);
    }

    #[test]
    fn parses_searched_and_simple_case() {
        let expr = select_expr("SELECT CASE WHEN ISNUMERIC(@v) = 1 THEN 1 ELSE 0 END");
        let ExprKind::Case(case) = &expr.kind else {
            panic!("expected CASE");
        };
        assert!(case.operand.is_none());
        assert_eq!(case.when_clauses.len(), 1);

        let expr = select_expr("SELECT CASE @v WHEN 1 THEN 'a' END");
        let ExprKind::Case(case) = &expr.kind else {
            panic!("expected CASE");
        };
        assert!(case.operand.is_some());
    }

    #[test]
    fn parses_predicates() {
        let tree = parse_script(
            "SELECT 1 FROM t WHERE a NOT IN (1, 2) AND b BETWEEN 1 AND 5 \
             AND c LIKE 'x%' AND d IS NOT NULL AND EXISTS (SELECT 1)",
        )
        .expect("parse");
        assert_eq!(tree.script().batches[0].statements.len(), 1);
    }

    #[test]
    fn parses_window_functions() {
        let expr = select_expr(
            "SELECT ROW_NUMBER() OVER (PARTITION BY a ORDER BY b DESC ROWS UNBOUNDED PRECEDING)",
        );
        let ExprKind::Function(call) = &expr.kind else {
            panic!("expected function");
        };
        let over = call.over.as_ref().expect("window");
        assert_eq!(over.partition_by.len(), 1);
        assert_eq!(over.order_by.len(), 1);
    }

    #[test]
    fn nested_expression_spans_include_parentheses() {
        let sql = "SELECT (a + b)";
        let tree = parse_script(sql).expect("parse");
        let StatementKind::Select(query) = &tree.script().batches[0].statements[0].kind else {
            panic!("expected SELECT");
        };
        let QueryExprKind::Specification(spec) = &query.body.kind else {
            panic!("expected specification");
        };
        let SelectElementKind::Expression { expr, .. } = &spec.select_list[0].kind else {
            panic!("expected expression");
        };
        assert_eq!(tree.text(&expr.span), "(a + b)");
    }
}
