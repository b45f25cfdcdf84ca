//! Statement dispatch, DML and control flow.

use super::{Parser, Result};
use crate::syntax::{
    Assignment, BinaryOperator, DeclarationKind, DeleteStatement, ExecuteParameter,
    ExecuteStatement, ExecuteTarget, Ident, IfStatement, InsertSource, InsertStatement, Keyword,
    SetOptionStatement, SetVariableStatement, Statement, StatementKind, TokenKind,
    TransactionKind, TransactionStatement, TryCatchStatement, UpdateStatement,
    VariableDeclaration, WhileStatement,
};

/// Reserved words that can only begin a new statement.
const STATEMENT_KEYWORDS: &[Keyword] = &[
    Keyword::Select,
    Keyword::Insert,
    Keyword::Update,
    Keyword::Delete,
    Keyword::Merge,
    Keyword::Create,
    Keyword::Alter,
    Keyword::Drop,
    Keyword::Truncate,
    Keyword::Exec,
    Keyword::Execute,
    Keyword::Declare,
    Keyword::Set,
    Keyword::If,
    Keyword::While,
    Keyword::Begin,
    Keyword::Commit,
    Keyword::Rollback,
    Keyword::Return,
    Keyword::Print,
    Keyword::Break,
    Keyword::Continue,
    Keyword::Raiserror,
    Keyword::Use,
    Keyword::Goto,
    Keyword::Waitfor,
];

impl<'t> Parser<'t> {
    /// Parses statements until end of input, a `GO` separator, or, when
    /// `stop_at_end` is set, an `END` keyword (left unconsumed).
    pub(super) fn parse_statement_list(&mut self, stop_at_end: bool) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.consume(TokenKind::SemiColon) {}
            if self.is_at_end() || self.is_batch_separator() {
                break;
            }
            if stop_at_end && self.check_keyword(Keyword::End) {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    pub(super) fn parse_statement(&mut self) -> Result<Statement> {
        self.nested(|p| p.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Statement> {
        let start = self.pos;
        let token = self
            .current()
            .ok_or_else(|| self.error_expected("statement"))?;

        let kind = match token.kind {
            TokenKind::Keyword(Keyword::Select | Keyword::With) | TokenKind::LParen => {
                StatementKind::Select(Box::new(self.parse_query()?))
            }
            TokenKind::Keyword(Keyword::Insert) => {
                StatementKind::Insert(Box::new(self.parse_insert()?))
            }
            TokenKind::Keyword(Keyword::Update) => {
                StatementKind::Update(Box::new(self.parse_update()?))
            }
            TokenKind::Keyword(Keyword::Delete) => {
                StatementKind::Delete(Box::new(self.parse_delete()?))
            }
            TokenKind::Keyword(Keyword::Create) => self.parse_create()?,
            TokenKind::Keyword(Keyword::Alter) => self.parse_alter()?,
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop()?,
            TokenKind::Keyword(Keyword::Truncate) => {
                self.advance();
                self.expect_keyword(Keyword::Table)?;
                StatementKind::Truncate(self.parse_object_name()?)
            }
            TokenKind::Keyword(Keyword::Exec | Keyword::Execute) => {
                StatementKind::Execute(Box::new(self.parse_execute()?))
            }
            TokenKind::Keyword(Keyword::Declare) => StatementKind::Declare(self.parse_declare()?),
            TokenKind::Keyword(Keyword::Set) => self.parse_set()?,
            TokenKind::Keyword(Keyword::If) => StatementKind::If(Box::new(self.parse_if()?)),
            TokenKind::Keyword(Keyword::While) => {
                self.advance();
                let condition = self.parse_expression()?;
                let body = self.parse_statement()?;
                StatementKind::While(Box::new(WhileStatement { condition, body }))
            }
            TokenKind::Keyword(Keyword::Begin) => self.parse_begin()?,
            TokenKind::Keyword(Keyword::Commit) => {
                StatementKind::Transaction(self.parse_transaction_end(TransactionKind::Commit)?)
            }
            TokenKind::Keyword(Keyword::Rollback) => {
                StatementKind::Transaction(self.parse_transaction_end(TransactionKind::Rollback)?)
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let value = if self.can_start_expression() {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                StatementKind::Return(value)
            }
            TokenKind::Keyword(Keyword::Print) => {
                self.advance();
                StatementKind::Print(self.parse_expression()?)
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                StatementKind::Break
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                StatementKind::Continue
            }
            TokenKind::Keyword(Keyword::Merge) => {
                let word = token.text.to_ascii_uppercase();
                self.advance();
                self.skip_to_terminator();
                StatementKind::Other(word)
            }
            TokenKind::Keyword(
                Keyword::Raiserror | Keyword::Waitfor | Keyword::Use | Keyword::Goto,
            ) => {
                let word = token.text.to_ascii_uppercase();
                self.advance();
                self.skip_to_statement_end();
                StatementKind::Other(word)
            }
            // THROW is not reserved, so the statement before it ends with `;`.
            TokenKind::Identifier if token.is_word("THROW") => {
                self.advance();
                self.skip_to_statement_end();
                StatementKind::Other("THROW".to_string())
            }
            _ => return Err(self.unsupported()),
        };

        Ok(Statement {
            kind,
            span: self.span_from(start),
        })
    }

    pub(super) fn at_statement_start(&self) -> bool {
        STATEMENT_KEYWORDS
            .iter()
            .any(|keyword| self.check_keyword(*keyword))
            || self.is_batch_separator()
    }

    /// Where an opaque clause must stop: a new statement, `;`, or the end of
    /// an enclosing block.
    pub(super) fn at_statement_boundary(&self) -> bool {
        self.is_at_end()
            || self.check(TokenKind::SemiColon)
            || self.check_keyword(Keyword::End)
            || self.check_keyword(Keyword::Else)
            || self.at_statement_start()
    }

    /// Skips the rest of a statement whose contents are not modelled.
    pub(super) fn skip_to_statement_end(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            if depth == 0 && self.at_statement_boundary() {
                break;
            }
            match self.advance().map(|token| token.kind) {
                Some(TokenKind::LParen) => depth += 1,
                Some(TokenKind::RParen) => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    /// Skips a statement that only `;` ends, such as `MERGE`, whose clauses
    /// start with statement keywords of their own.
    fn skip_to_terminator(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            if depth == 0 && (self.check(TokenKind::SemiColon) || self.is_batch_separator()) {
                break;
            }
            match self.advance().map(|token| token.kind) {
                Some(TokenKind::LParen) => depth += 1,
                Some(TokenKind::RParen) => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    /// True when the current token can begin a scalar expression on the
    /// same logical statement (used after `RETURN`).
    fn can_start_expression(&self) -> bool {
        let Some(token) = self.current() else {
            return false;
        };
        match token.kind {
            TokenKind::Variable
            | TokenKind::StringLiteral
            | TokenKind::NationalStringLiteral
            | TokenKind::NumberLiteral
            | TokenKind::BinaryLiteral
            | TokenKind::LParen
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Tilde => true,
            TokenKind::Keyword(keyword) => matches!(
                keyword,
                Keyword::Null | Keyword::Case | Keyword::Cast | Keyword::Convert | Keyword::Exists
            ),
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                self.previous().is_some_and(|previous| previous.line == token.line)
                    && !self.is_batch_separator()
            }
            _ => false,
        }
    }

    // ========================================================================
    // DML
    // ========================================================================

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect_keyword(Keyword::Insert)?;
        let top = if self.check_keyword(Keyword::Top) {
            Some(self.parse_top()?)
        } else {
            None
        };
        self.consume_keyword(Keyword::Into);
        let target = self.parse_object_name()?;

        let columns = if self.check(TokenKind::LParen)
            && !self.peek_keyword(1, Keyword::Select)
            && !self.peek_keyword(1, Keyword::With)
        {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };

        let source = if self.consume_keyword(Keyword::Values) {
            let mut rows = Vec::new();
            loop {
                self.expect(TokenKind::LParen)?;
                rows.push(self.parse_expression_list()?);
                self.expect(TokenKind::RParen)?;
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
            InsertSource::Values(rows)
        } else if self.check_keyword(Keyword::Default) && self.peek_keyword(1, Keyword::Values) {
            self.advance();
            self.advance();
            InsertSource::DefaultValues
        } else if self.check_keyword(Keyword::Exec) || self.check_keyword(Keyword::Execute) {
            InsertSource::Execute(Box::new(self.parse_execute()?))
        } else if self.starts_query() {
            InsertSource::Query(Box::new(self.parse_query()?))
        } else {
            return Err(self.error_expected("VALUES, SELECT or EXEC"));
        };

        Ok(InsertStatement {
            top,
            target,
            columns,
            source,
        })
    }

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect_keyword(Keyword::Update)?;
        let top = if self.check_keyword(Keyword::Top) {
            Some(self.parse_top()?)
        } else {
            None
        };
        let target = self.parse_table_factor()?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let start = self.pos;
            let target = self.parse_primary()?;
            if self.compound_operator().is_some() {
                self.advance();
            }
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expression()?;
            assignments.push(Assignment {
                target,
                value,
                span: self.span_from(start),
            });
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        let from = if self.consume_keyword(Keyword::From) {
            self.parse_table_references()?
        } else {
            Vec::new()
        };
        let where_clause = self.parse_where_clause()?;

        Ok(UpdateStatement {
            top,
            target,
            assignments,
            from,
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect_keyword(Keyword::Delete)?;
        let top = if self.check_keyword(Keyword::Top) {
            Some(self.parse_top()?)
        } else {
            None
        };
        self.consume_keyword(Keyword::From);
        let target = self.parse_table_factor()?;
        let from = if self.consume_keyword(Keyword::From) {
            self.parse_table_references()?
        } else {
            Vec::new()
        };
        let where_clause = self.parse_where_clause()?;

        Ok(DeleteStatement {
            top,
            target,
            from,
            where_clause,
        })
    }

    /// Operator of a compound assignment such as `+=`, without consuming it.
    fn compound_operator(&self) -> Option<BinaryOperator> {
        if !self.peek_is(1, TokenKind::Eq) {
            return None;
        }
        let op = match self.current()?.kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Subtract,
            TokenKind::Star => BinaryOperator::Multiply,
            TokenKind::Slash => BinaryOperator::Divide,
            TokenKind::Percent => BinaryOperator::Modulo,
            TokenKind::Ampersand => BinaryOperator::BitAnd,
            TokenKind::Pipe => BinaryOperator::BitOr,
            TokenKind::Caret => BinaryOperator::BitXor,
            _ => return None,
        };
        Some(op)
    }

    // ========================================================================
    // EXECUTE
    // ========================================================================

    pub(super) fn parse_execute(&mut self) -> Result<ExecuteStatement> {
        self.advance();

        if self.consume(TokenKind::LParen) {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::RParen)?;
            return Ok(ExecuteStatement {
                return_variable: None,
                target: ExecuteTarget::Dynamic(expr),
            });
        }

        let return_variable = if self.check(TokenKind::Variable) && self.peek_is(1, TokenKind::Eq)
        {
            let variable = self.parse_variable()?;
            self.advance();
            Some(variable)
        } else {
            None
        };

        let name = self.parse_object_name()?;
        let mut parameters = Vec::new();
        if self.starts_execute_parameter() {
            loop {
                parameters.push(self.parse_execute_parameter()?);
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        if self.check_keyword(Keyword::With) && self.peek_word(1, "RECOMPILE") {
            self.advance();
            self.advance();
        }

        Ok(ExecuteStatement {
            return_variable,
            target: ExecuteTarget::Procedure { name, parameters },
        })
    }

    fn starts_execute_parameter(&self) -> bool {
        let Some(token) = self.current() else {
            return false;
        };
        match token.kind {
            TokenKind::Variable
            | TokenKind::StringLiteral
            | TokenKind::NationalStringLiteral
            | TokenKind::NumberLiteral
            | TokenKind::BinaryLiteral
            | TokenKind::Minus
            | TokenKind::Plus => true,
            TokenKind::Keyword(keyword) => matches!(keyword, Keyword::Null | Keyword::Default),
            // Unquoted string arguments: `EXEC sp_help Customer`.
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                self.previous().is_some_and(|previous| previous.line == token.line)
                    && !self.is_batch_separator()
            }
            _ => false,
        }
    }

    fn parse_execute_parameter(&mut self) -> Result<ExecuteParameter> {
        let start = self.pos;
        let name = if self.check(TokenKind::Variable) && self.peek_is(1, TokenKind::Eq) {
            let name = self.parse_variable()?;
            self.advance();
            Some(name)
        } else {
            None
        };
        let value = self.parse_expression()?;
        let output = self.consume_word("OUTPUT") || self.consume_word("OUT");
        Ok(ExecuteParameter {
            name,
            value,
            output,
            span: self.span_from(start),
        })
    }

    // ========================================================================
    // Variables
    // ========================================================================

    fn parse_declare(&mut self) -> Result<Vec<VariableDeclaration>> {
        self.expect_keyword(Keyword::Declare)?;
        let mut declarations = Vec::new();
        loop {
            let start = self.pos;
            let name = self.parse_variable()?;
            self.consume_keyword(Keyword::As);

            let kind = if self.consume_keyword(Keyword::Table) {
                DeclarationKind::Table(self.parse_table_definition()?)
            } else if self.check_keyword(Keyword::Cursor) {
                return Err(self.unsupported());
            } else {
                let data_type = self.parse_data_type()?;
                let value = if self.consume(TokenKind::Eq) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                DeclarationKind::Scalar { data_type, value }
            };

            declarations.push(VariableDeclaration {
                name,
                kind,
                span: self.span_from(start),
            });
            if !self.consume(TokenKind::Comma) {
                return Ok(declarations);
            }
        }
    }

    fn parse_set(&mut self) -> Result<StatementKind> {
        self.expect_keyword(Keyword::Set)?;

        if self.check(TokenKind::Variable) {
            let variable = self.parse_variable()?;
            let operator = self.compound_operator();
            if operator.is_some() {
                self.advance();
            }
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expression()?;
            return Ok(StatementKind::SetVariable(Box::new(SetVariableStatement {
                variable,
                operator,
                value,
            })));
        }

        let mut options: Vec<Ident> = Vec::new();
        let mut value = None;
        while let Some(token) = self.current() {
            match token.kind {
                TokenKind::Keyword(Keyword::On | Keyword::Off)
                | TokenKind::NumberLiteral
                | TokenKind::StringLiteral
                | TokenKind::NationalStringLiteral
                | TokenKind::Variable => {
                    value = Some(self.take_ident()?);
                    break;
                }
                TokenKind::Comma | TokenKind::Period => {
                    self.advance();
                }
                TokenKind::Identifier | TokenKind::QuotedIdentifier | TokenKind::Keyword(_)
                    if !self.at_statement_boundary() =>
                {
                    options.push(self.take_ident()?);
                }
                _ => break,
            }
        }

        if options.is_empty() {
            return Err(self.error_expected("SET option"));
        }
        Ok(StatementKind::SetOption(SetOptionStatement { options, value }))
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_if(&mut self) -> Result<IfStatement> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;
        let then_statement = self.parse_statement()?;

        let checkpoint = self.pos;
        while self.consume(TokenKind::SemiColon) {}
        let else_statement = if self.consume_keyword(Keyword::Else) {
            Some(self.parse_statement()?)
        } else {
            self.pos = checkpoint;
            None
        };

        Ok(IfStatement {
            condition,
            then_statement,
            else_statement,
        })
    }

    fn parse_begin(&mut self) -> Result<StatementKind> {
        if self.peek_keyword(1, Keyword::Tran) || self.peek_keyword(1, Keyword::Transaction) {
            self.advance();
            self.advance();
            let name = self.parse_transaction_name()?;
            return Ok(StatementKind::Transaction(TransactionStatement {
                kind: TransactionKind::Begin,
                name,
            }));
        }

        if self.peek_word(1, "TRY") {
            self.advance();
            self.advance();
            let try_statements = self.parse_statement_list(true)?;
            self.expect_keyword(Keyword::End)?;
            self.expect_word("TRY")?;
            self.expect_keyword(Keyword::Begin)?;
            self.expect_word("CATCH")?;
            let catch_statements = self.parse_statement_list(true)?;
            self.expect_keyword(Keyword::End)?;
            self.expect_word("CATCH")?;
            return Ok(StatementKind::TryCatch(Box::new(TryCatchStatement {
                try_statements,
                catch_statements,
            })));
        }

        if self.peek_word(1, "DISTRIBUTED") {
            return Err(self.unsupported());
        }

        self.expect_keyword(Keyword::Begin)?;
        let statements = self.parse_statement_list(true)?;
        self.expect_keyword(Keyword::End)?;
        Ok(StatementKind::Block(statements))
    }

    fn parse_transaction_end(&mut self, kind: TransactionKind) -> Result<TransactionStatement> {
        self.advance();
        let keyword_given = self.consume_keyword(Keyword::Tran)
            || self.consume_keyword(Keyword::Transaction)
            || self.consume_word("WORK");
        let name = if keyword_given {
            self.parse_transaction_name()?
        } else {
            None
        };
        Ok(TransactionStatement { kind, name })
    }

    fn parse_transaction_name(&mut self) -> Result<Option<Ident>> {
        let Some(token) = self.current() else {
            return Ok(None);
        };
        let same_line = self
            .previous()
            .is_some_and(|previous| previous.line == token.line);
        let is_name = match token.kind {
            TokenKind::Variable => true,
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                same_line && !self.is_batch_separator()
            }
            _ => false,
        };
        if is_name {
            self.take_ident().map(Some)
        } else {
            Ok(None)
        }
    }
}
