//! Reference T-SQL front-end.
//!
//! Builds a [`SyntaxTree`] for the subset of T-SQL the lint rules inspect.
//! Tokens come from `sqlparser`'s MS SQL tokenizer (see
//! [`tokenize`](crate::syntax::tokenize)); parsing is recursive descent over
//! the significant (non-trivia) tokens. Token indices recorded in spans are
//! global over the script, across `GO` batches.

mod ddl;
mod expression;
mod query;
mod statement;

use crate::error::{ParseError, Position};
use crate::syntax::{
    tokenize, Batch, DataType, Ident, Keyword, ObjectName, Script, Span, SyntaxTree, Token,
    TokenKind,
};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Maximum nesting of statements, queries and expressions before parsing
/// fails with [`ParseError::DepthLimit`].
///
/// Each level costs a full pass down the precedence ladder, so the limit is
/// sized for a 2 MiB thread stack in an unoptimized build. Operator chains
/// are parsed in loops and do not count.
pub const MAX_NESTING_DEPTH: usize = 24;

/// Parse a T-SQL script into a syntax tree.
pub fn parse_script(sql: &str) -> std::result::Result<SyntaxTree, ParseError> {
    let tokens = tokenize(sql)?;
    let script = Parser::new(&tokens).parse_script()?;
    Ok(SyntaxTree::new(sql, tokens, script))
}

pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    /// Indices of non-trivia tokens; `pos` points into this list.
    significant: Vec<usize>,
    pos: usize,
    depth: usize,
}

type Result<T> = std::result::Result<T, ParseError>;

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_trivia())
            .map(|(index, _)| index)
            .collect();

        Self {
            tokens,
            significant,
            pos: 0,
            depth: 0,
        }
    }

    // ========================================================================
    // Script and batches
    // ========================================================================

    fn parse_script(&mut self) -> Result<Script> {
        let mut batches = Vec::new();

        loop {
            let start = self.pos;
            let statements = self.parse_statement_list(false)?;
            if !statements.is_empty() {
                batches.push(Batch {
                    statements,
                    span: self.span_from(start),
                });
            }

            if self.consume_batch_separator() {
                continue;
            }
            if self.is_at_end() {
                break;
            }
            return Err(self.error_expected("statement"));
        }

        let span = if self.significant.is_empty() {
            Span::default()
        } else {
            self.span_from(0)
        };
        Ok(Script { batches, span })
    }

    /// `GO` on its own line, optionally followed by a repeat count.
    fn is_batch_separator(&self) -> bool {
        let Some(token) = self.current() else {
            return false;
        };
        if !(token.kind == TokenKind::Identifier && token.is_word("GO")) {
            return false;
        }
        match self.previous() {
            Some(previous) => previous.line < token.line,
            None => true,
        }
    }

    fn consume_batch_separator(&mut self) -> bool {
        if !self.is_batch_separator() {
            return false;
        }
        let line = self.current().map_or(0, |token| token.line);
        self.advance();
        if let Some(count) = self.current() {
            if count.kind == TokenKind::NumberLiteral && count.line == line {
                self.advance();
            }
        }
        true
    }

    // ========================================================================
    // Token access
    // ========================================================================

    fn current(&self) -> Option<&'t Token> {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> Option<&'t Token> {
        let tokens = self.tokens;
        self.significant
            .get(self.pos + offset)
            .and_then(|&index| tokens.get(index))
    }

    fn previous(&self) -> Option<&'t Token> {
        let tokens = self.tokens;
        self.pos
            .checked_sub(1)
            .and_then(|index| self.significant.get(index))
            .and_then(|&index| tokens.get(index))
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.significant.len()
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.current();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_is(0, kind)
    }

    fn peek_is(&self, offset: usize, kind: TokenKind) -> bool {
        self.peek(offset).is_some_and(|token| token.kind == kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.check(TokenKind::Keyword(keyword))
    }

    fn peek_keyword(&self, offset: usize, keyword: Keyword) -> bool {
        self.peek_is(offset, TokenKind::Keyword(keyword))
    }

    /// Case-insensitive check for a non-reserved word such as `APPLY`.
    fn check_word(&self, word: &str) -> bool {
        self.peek_word(0, word)
    }

    fn peek_word(&self, offset: usize, word: &str) -> bool {
        self.peek(offset).is_some_and(|token| token.is_word(word))
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        self.consume(TokenKind::Keyword(keyword))
    }

    fn consume_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        if self.check(kind) {
            self.advance()
                .ok_or_else(|| self.error_expected(&kind.to_string()))
        } else {
            Err(self.error_expected(&kind.to_string()))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<&'t Token> {
        self.expect(TokenKind::Keyword(keyword))
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.consume_word(word) {
            Ok(())
        } else {
            Err(self.error_expected(word))
        }
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(token) => ParseError::Unexpected {
                expected: expected.to_string(),
                found: token.text.clone(),
                position: Position::new(token.line, token.column),
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn unsupported(&self) -> ParseError {
        match self.current() {
            Some(token) => ParseError::Unsupported {
                keyword: token.text.to_ascii_uppercase(),
                position: Position::new(token.line, token.column),
            },
            None => ParseError::UnexpectedEof {
                expected: "statement".to_string(),
            },
        }
    }

    // ========================================================================
    // Spans and depth
    // ========================================================================

    /// Span from the significant token at `start` to the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let first = self.significant.get(start).copied();
        let last = self
            .pos
            .checked_sub(1)
            .and_then(|index| self.significant.get(index))
            .copied();

        match (first, last) {
            (Some(first), Some(last)) if last >= first => self.token_span(first, last),
            (Some(first), _) => self.token_span(first, first),
            _ => Span::default(),
        }
    }

    fn token_span(&self, first: usize, last: usize) -> Span {
        match (self.tokens.get(first), self.tokens.get(last)) {
            (Some(start), Some(end)) => Span {
                line: start.line,
                column: start.column,
                first_token: first,
                last_token: last,
                offset: start.offset,
                length: end.end().saturating_sub(start.offset),
            },
            _ => Span::default(),
        }
    }

    /// Runs `f` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            let position = self
                .current()
                .map_or(Position::new(0, 0), |token| {
                    Position::new(token.line, token.column)
                });
            #[cfg(feature = "tracing")]
            debug!(depth = self.depth, %position, "Max nesting depth exceeded while parsing");
            return Err(ParseError::DepthLimit {
                limit: MAX_NESTING_DEPTH,
                position,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // Names and types
    // ========================================================================

    fn check_identifier(&self) -> bool {
        self.current().is_some_and(Token::is_identifier)
    }

    /// A bare or delimited identifier that may serve as an implicit alias.
    fn is_alias_candidate(&self) -> bool {
        self.check_identifier() && !self.is_batch_separator()
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        if !self.check_identifier() {
            return Err(self.error_expected("identifier"));
        }
        self.take_ident()
    }

    fn parse_variable(&mut self) -> Result<Ident> {
        if !self.check(TokenKind::Variable) {
            return Err(self.error_expected("variable"));
        }
        self.take_ident()
    }

    /// Turns the current token, whatever its kind, into an [`Ident`].
    fn take_ident(&mut self) -> Result<Ident> {
        let start = self.pos;
        let token = self
            .advance()
            .ok_or_else(|| self.error_expected("identifier"))?;
        let quote_style = match token.kind {
            TokenKind::QuotedIdentifier => token.text.chars().next(),
            TokenKind::StringLiteral | TokenKind::NationalStringLiteral => Some('\''),
            _ => None,
        };
        Ok(Ident {
            value: token.value.clone(),
            quote_style,
            span: self.span_from(start),
        })
    }

    /// `part[.part...]`, allowing empty middle parts as in `db..table`.
    ///
    /// The first part may be a variable so table variables parse as names.
    fn parse_object_name(&mut self) -> Result<ObjectName> {
        let start = self.pos;
        let mut parts = Vec::new();
        if self.check(TokenKind::Variable) {
            parts.push(self.parse_variable()?);
        } else {
            parts.push(self.parse_ident()?);
        }

        while self.check(TokenKind::Period) && !self.peek_is(1, TokenKind::Star) {
            self.advance();
            while self.consume(TokenKind::Period) {}
            parts.push(self.parse_ident()?);
        }

        Ok(ObjectName {
            parts,
            span: self.span_from(start),
        })
    }

    fn parse_parenthesized_idents(&mut self) -> Result<Vec<Ident>> {
        self.expect(TokenKind::LParen)?;
        let mut idents = vec![self.parse_ident()?];
        while self.consume(TokenKind::Comma) {
            idents.push(self.parse_ident()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(idents)
    }

    /// `name[(n[, m])]` with `MAX` accepted as a length.
    fn parse_data_type(&mut self) -> Result<DataType> {
        let start = self.pos;
        let name = self.parse_object_name()?;
        let mut arguments = Vec::new();

        if self.consume(TokenKind::LParen) {
            loop {
                let token = self
                    .current()
                    .ok_or_else(|| self.error_expected("type argument"))?;
                match token.kind {
                    TokenKind::NumberLiteral | TokenKind::Identifier => {
                        arguments.push(token.value.clone());
                        self.advance();
                    }
                    _ => return Err(self.error_expected("type argument")),
                }
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        Ok(DataType {
            name,
            arguments,
            span: self.span_from(start),
        })
    }

    /// Skips a balanced `( ... )` group whose contents are not modelled.
    fn skip_parenthesized(&mut self) -> Result<()> {
        self.expect(TokenKind::LParen)?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self
                .advance()
                .ok_or_else(|| self.error_expected("`)`"))?;
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::StatementKind;

    #[test]
    fn test_parse_multiple_statements() {
        let tree = parse_script("SELECT 1; SELECT 2;").expect("parse");
        let batches = &tree.script().batches;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].statements.len(), 2);
    }

    #[test]
    fn test_go_splits_batches_and_keeps_global_token_indices() {
        let sql = "SELECT 1\nGO\nSELECT 2\nGO 2\n";
        let tree = parse_script(sql).expect("parse");
        let batches = &tree.script().batches;
        assert_eq!(batches.len(), 2);

        let second = &batches[1].statements[0];
        let first_token = &tree.tokens()[second.span.first_token];
        assert!(first_token.is_keyword(Keyword::Select));
        assert_eq!(first_token.line, 3);
        assert_eq!(tree.text(&second.span), "SELECT 2");
    }

    #[test]
    fn test_go_inside_a_line_is_not_a_separator() {
        let tree = parse_script("SELECT 1 AS go").expect("parse");
        assert_eq!(tree.script().batches.len(), 1);
    }

    #[test]
    fn test_empty_script() {
        let tree = parse_script("  -- nothing here\n").expect("parse");
        assert!(tree.script().batches.is_empty());
    }

    #[test]
    fn test_unsupported_statement_is_an_error() {
        let err = parse_script("DBCC CHECKDB").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { ref keyword, .. } if keyword == "DBCC"));
    }

    #[test]
    fn test_incomplete_statement_is_an_error() {
        let err = parse_script("SELECT * FROM").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_deep_nesting_hits_depth_limit() {
        let depth = MAX_NESTING_DEPTH + 10;
        let sql = format!("SELECT {}1{}", "(".repeat(depth), ")".repeat(depth));
        let err = parse_script(&sql).unwrap_err();
        assert!(matches!(err, ParseError::DepthLimit { .. }));
    }

    #[test]
    fn test_object_name_parts() {
        let tree = parse_script("TRUNCATE TABLE [db].dbo.[Customer]").expect("parse");
        let StatementKind::Truncate(name) = &tree.script().batches[0].statements[0].kind else {
            panic!("expected TRUNCATE");
        };
        assert_eq!(name.to_dotted(), "db.dbo.Customer");
        assert_eq!(name.base_identifier().map(|i| i.quote_style), Some(Some('[')));
    }
}
