//! Lexical tokens of a T-SQL script.
//!
//! Tokenization is delegated to `sqlparser`'s MS SQL dialect. Its output is
//! re-shaped into [`Token`]s that carry byte offsets and a T-SQL specific
//! classification, including trivia (whitespace and comments) so that rules
//! can inspect exactly what the author wrote between two nodes.

use crate::error::{ParseError, Position};
use sqlparser::dialect::MsSqlDialect;
use sqlparser::keywords::Keyword as SqlKeyword;
use sqlparser::tokenizer::{Token as SqlToken, TokenWithSpan, Tokenizer, Whitespace};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text, delimiters and quotes included.
    pub text: String,
    /// Decoded value: identifier without brackets, string literal contents,
    /// variable name with its `@` prefix.
    pub value: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Case-insensitive match of an unquoted word (keyword or plain identifier).
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self.kind, TokenKind::Keyword(_) | TokenKind::Identifier)
            && self.value.eq_ignore_ascii_case(word)
    }

    /// True for tokens that can name an object: plain or delimited identifiers.
    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::QuotedIdentifier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    QuotedIdentifier,
    Variable,
    StringLiteral,
    NationalStringLiteral,
    NumberLiteral,
    BinaryLiteral,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Bang,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    Comma,
    Period,
    LParen,
    RParen,
    SemiColon,
    Colon,
    Whitespace,
    Comment,
    Other,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "{keyword:?}"),
            Self::Identifier | Self::QuotedIdentifier => f.write_str("identifier"),
            Self::Variable => f.write_str("variable"),
            Self::StringLiteral | Self::NationalStringLiteral => f.write_str("string literal"),
            Self::NumberLiteral => f.write_str("number"),
            Self::BinaryLiteral => f.write_str("binary literal"),
            Self::Plus => f.write_str("`+`"),
            Self::Minus => f.write_str("`-`"),
            Self::Star => f.write_str("`*`"),
            Self::Slash => f.write_str("`/`"),
            Self::Percent => f.write_str("`%`"),
            Self::Eq => f.write_str("`=`"),
            Self::NotEq => f.write_str("`<>`"),
            Self::Lt => f.write_str("`<`"),
            Self::Gt => f.write_str("`>`"),
            Self::LtEq => f.write_str("`<=`"),
            Self::GtEq => f.write_str("`>=`"),
            Self::Bang => f.write_str("`!`"),
            Self::Ampersand => f.write_str("`&`"),
            Self::Pipe => f.write_str("`|`"),
            Self::Caret => f.write_str("`^`"),
            Self::Tilde => f.write_str("`~`"),
            Self::Comma => f.write_str("`,`"),
            Self::Period => f.write_str("`.`"),
            Self::LParen => f.write_str("`(`"),
            Self::RParen => f.write_str("`)`"),
            Self::SemiColon => f.write_str("`;`"),
            Self::Colon => f.write_str("`:`"),
            Self::Whitespace => f.write_str("whitespace"),
            Self::Comment => f.write_str("comment"),
            Self::Other => f.write_str("symbol"),
        }
    }
}

/// Reserved T-SQL words the parser dispatches on.
///
/// Non-reserved words that only matter in one position (`APPLY`, `GO`,
/// `TRY_CONVERT`, `INCLUDE`, ...) stay identifiers and are matched with
/// [`Token::is_word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Add,
    All,
    Alter,
    And,
    As,
    Asc,
    Begin,
    Between,
    Break,
    By,
    Cascade,
    Case,
    Cast,
    Check,
    Clustered,
    Collate,
    Commit,
    Constraint,
    Continue,
    Convert,
    Create,
    Cross,
    Cursor,
    Declare,
    Default,
    Delete,
    Desc,
    Distinct,
    Drop,
    Else,
    End,
    Escape,
    Except,
    Exec,
    Execute,
    Exists,
    Fetch,
    For,
    Foreign,
    From,
    Full,
    Function,
    Goto,
    Group,
    Having,
    Identity,
    If,
    In,
    Index,
    Inner,
    Insert,
    Intersect,
    Into,
    Is,
    Join,
    Key,
    Left,
    Like,
    Merge,
    Nocheck,
    NonClustered,
    Not,
    Null,
    Of,
    Off,
    On,
    Option,
    Or,
    Order,
    Outer,
    Over,
    Percent,
    Primary,
    Print,
    Proc,
    Procedure,
    Raiserror,
    References,
    Return,
    Right,
    Rollback,
    Rowguidcol,
    Select,
    Set,
    Table,
    Then,
    Top,
    Tran,
    Transaction,
    Trigger,
    Truncate,
    Union,
    Unique,
    Update,
    Use,
    Values,
    View,
    Waitfor,
    When,
    Where,
    While,
    With,
}

impl Keyword {
    /// Maps a word `sqlparser` already classified as a keyword.
    fn from_sql_keyword(keyword: SqlKeyword) -> Option<Self> {
        let keyword = match keyword {
            SqlKeyword::ADD => Self::Add,
            SqlKeyword::ALL => Self::All,
            SqlKeyword::ALTER => Self::Alter,
            SqlKeyword::AND => Self::And,
            SqlKeyword::AS => Self::As,
            SqlKeyword::ASC => Self::Asc,
            SqlKeyword::BEGIN => Self::Begin,
            SqlKeyword::BETWEEN => Self::Between,
            SqlKeyword::BY => Self::By,
            SqlKeyword::CASCADE => Self::Cascade,
            SqlKeyword::CASE => Self::Case,
            SqlKeyword::CAST => Self::Cast,
            SqlKeyword::CHECK => Self::Check,
            SqlKeyword::CLUSTERED => Self::Clustered,
            SqlKeyword::COLLATE => Self::Collate,
            SqlKeyword::COMMIT => Self::Commit,
            SqlKeyword::CONSTRAINT => Self::Constraint,
            SqlKeyword::CONTINUE => Self::Continue,
            SqlKeyword::CONVERT => Self::Convert,
            SqlKeyword::CREATE => Self::Create,
            SqlKeyword::CROSS => Self::Cross,
            SqlKeyword::CURSOR => Self::Cursor,
            SqlKeyword::DECLARE => Self::Declare,
            SqlKeyword::DEFAULT => Self::Default,
            SqlKeyword::DELETE => Self::Delete,
            SqlKeyword::DESC => Self::Desc,
            SqlKeyword::DISTINCT => Self::Distinct,
            SqlKeyword::DROP => Self::Drop,
            SqlKeyword::ELSE => Self::Else,
            SqlKeyword::END => Self::End,
            SqlKeyword::ESCAPE => Self::Escape,
            SqlKeyword::EXCEPT => Self::Except,
            SqlKeyword::EXEC => Self::Exec,
            SqlKeyword::EXECUTE => Self::Execute,
            SqlKeyword::EXISTS => Self::Exists,
            SqlKeyword::FETCH => Self::Fetch,
            SqlKeyword::FOR => Self::For,
            SqlKeyword::FOREIGN => Self::Foreign,
            SqlKeyword::FROM => Self::From,
            SqlKeyword::FULL => Self::Full,
            SqlKeyword::FUNCTION => Self::Function,
            SqlKeyword::GROUP => Self::Group,
            SqlKeyword::HAVING => Self::Having,
            SqlKeyword::IDENTITY => Self::Identity,
            SqlKeyword::IF => Self::If,
            SqlKeyword::IN => Self::In,
            SqlKeyword::INDEX => Self::Index,
            SqlKeyword::INNER => Self::Inner,
            SqlKeyword::INSERT => Self::Insert,
            SqlKeyword::INTERSECT => Self::Intersect,
            SqlKeyword::INTO => Self::Into,
            SqlKeyword::IS => Self::Is,
            SqlKeyword::JOIN => Self::Join,
            SqlKeyword::KEY => Self::Key,
            SqlKeyword::LEFT => Self::Left,
            SqlKeyword::LIKE => Self::Like,
            SqlKeyword::MERGE => Self::Merge,
            SqlKeyword::NOT => Self::Not,
            SqlKeyword::NULL => Self::Null,
            SqlKeyword::OF => Self::Of,
            SqlKeyword::OFF => Self::Off,
            SqlKeyword::ON => Self::On,
            SqlKeyword::OPTION => Self::Option,
            SqlKeyword::OR => Self::Or,
            SqlKeyword::ORDER => Self::Order,
            SqlKeyword::OUTER => Self::Outer,
            SqlKeyword::OVER => Self::Over,
            SqlKeyword::PERCENT => Self::Percent,
            SqlKeyword::PRIMARY => Self::Primary,
            SqlKeyword::PRINT => Self::Print,
            SqlKeyword::PROCEDURE => Self::Procedure,
            SqlKeyword::RAISERROR => Self::Raiserror,
            SqlKeyword::REFERENCES => Self::References,
            SqlKeyword::RETURN => Self::Return,
            SqlKeyword::RIGHT => Self::Right,
            SqlKeyword::ROLLBACK => Self::Rollback,
            SqlKeyword::SELECT => Self::Select,
            SqlKeyword::SET => Self::Set,
            SqlKeyword::TABLE => Self::Table,
            SqlKeyword::THEN => Self::Then,
            SqlKeyword::TOP => Self::Top,
            SqlKeyword::TRANSACTION => Self::Transaction,
            SqlKeyword::TRIGGER => Self::Trigger,
            SqlKeyword::TRUNCATE => Self::Truncate,
            SqlKeyword::UNION => Self::Union,
            SqlKeyword::UNIQUE => Self::Unique,
            SqlKeyword::UPDATE => Self::Update,
            SqlKeyword::USE => Self::Use,
            SqlKeyword::VALUES => Self::Values,
            SqlKeyword::VIEW => Self::View,
            SqlKeyword::WHEN => Self::When,
            SqlKeyword::WHERE => Self::Where,
            SqlKeyword::WHILE => Self::While,
            SqlKeyword::WITH => Self::With,
            _ => return None,
        };
        Some(keyword)
    }

    /// Reserved T-SQL words missing from `sqlparser`'s keyword list.
    ///
    /// `THROW` is not reserved and stays an identifier.
    fn from_tsql_word(word: &str) -> Option<Self> {
        let keyword = match word.to_ascii_uppercase().as_str() {
            "BREAK" => Self::Break,
            "GOTO" => Self::Goto,
            "NOCHECK" => Self::Nocheck,
            "NONCLUSTERED" => Self::NonClustered,
            "PROC" => Self::Proc,
            "ROWGUIDCOL" => Self::Rowguidcol,
            "TRAN" => Self::Tran,
            "WAITFOR" => Self::Waitfor,
            _ => return None,
        };
        Some(keyword)
    }
}

/// Tokenizes `sql`, keeping trivia, and records byte offsets for every token.
pub fn tokenize(sql: &str) -> Result<Vec<Token>, ParseError> {
    let dialect = MsSqlDialect {};
    let raw: Vec<TokenWithSpan> = Tokenizer::new(&dialect, sql).tokenize_with_location()?;
    let mut cursor = OffsetCursor::new(sql);

    let mut tokens = Vec::with_capacity(raw.len());
    for token in raw {
        let start = token.span.start;
        let end = token.span.end;
        let offset = cursor.seek(start.line as usize, start.column as usize)?;
        let end_offset = cursor.seek(end.line as usize, end.column as usize)?;

        let (kind, value) = classify(&token.token);
        tokens.push(Token {
            kind,
            text: sql[offset..end_offset].to_string(),
            value,
            line: start.line as usize,
            column: start.column as usize,
            offset,
            length: end_offset - offset,
        });
    }

    Ok(tokens)
}

fn classify(token: &SqlToken) -> (TokenKind, String) {
    let kind = match token {
        SqlToken::Word(word) => {
            let kind = if word.quote_style.is_some() {
                TokenKind::QuotedIdentifier
            } else if word.value.starts_with('@') {
                TokenKind::Variable
            } else if let Some(keyword) = Keyword::from_sql_keyword(word.keyword)
                .or_else(|| Keyword::from_tsql_word(&word.value))
            {
                TokenKind::Keyword(keyword)
            } else {
                TokenKind::Identifier
            };
            return (kind, word.value.clone());
        }
        SqlToken::SingleQuotedString(value) => {
            return (TokenKind::StringLiteral, value.clone());
        }
        SqlToken::NationalStringLiteral(value) => {
            return (TokenKind::NationalStringLiteral, value.clone());
        }
        SqlToken::HexStringLiteral(value) => {
            return (TokenKind::BinaryLiteral, value.clone());
        }
        SqlToken::Number(value, _) => {
            return (TokenKind::NumberLiteral, value.clone());
        }
        SqlToken::Whitespace(Whitespace::SingleLineComment { .. })
        | SqlToken::Whitespace(Whitespace::MultiLineComment(_)) => TokenKind::Comment,
        SqlToken::Whitespace(_) => TokenKind::Whitespace,
        SqlToken::Plus => TokenKind::Plus,
        SqlToken::Minus => TokenKind::Minus,
        SqlToken::Mul => TokenKind::Star,
        SqlToken::Div => TokenKind::Slash,
        SqlToken::Mod => TokenKind::Percent,
        SqlToken::Eq | SqlToken::DoubleEq => TokenKind::Eq,
        SqlToken::Neq => TokenKind::NotEq,
        SqlToken::Lt => TokenKind::Lt,
        SqlToken::Gt => TokenKind::Gt,
        SqlToken::LtEq => TokenKind::LtEq,
        SqlToken::GtEq => TokenKind::GtEq,
        SqlToken::ExclamationMark => TokenKind::Bang,
        SqlToken::Ampersand => TokenKind::Ampersand,
        SqlToken::Pipe => TokenKind::Pipe,
        SqlToken::Caret => TokenKind::Caret,
        SqlToken::Tilde => TokenKind::Tilde,
        SqlToken::Comma => TokenKind::Comma,
        SqlToken::Period => TokenKind::Period,
        SqlToken::LParen => TokenKind::LParen,
        SqlToken::RParen => TokenKind::RParen,
        SqlToken::SemiColon => TokenKind::SemiColon,
        SqlToken::Colon => TokenKind::Colon,
        _ => TokenKind::Other,
    };
    (kind, token.to_string())
}

/// Turns the tokenizer's 1-based line/column positions (counted in
/// characters) into byte offsets.
///
/// Positions arrive in source order, so the cursor only ever moves forward
/// and the whole script is scanned once.
struct OffsetCursor<'a> {
    sql: &'a str,
    line: usize,
    column: usize,
    offset: usize,
}

impl<'a> OffsetCursor<'a> {
    fn new(sql: &'a str) -> Self {
        Self {
            sql,
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Byte offset of `line`/`column`.
    ///
    /// A position behind the cursor or outside the source is an error: a
    /// dropped or misplaced token would shift every later token index.
    fn seek(&mut self, line: usize, column: usize) -> Result<usize, ParseError> {
        while (self.line, self.column) < (line, column) {
            let Some(ch) = self.sql[self.offset..].chars().next() else {
                break;
            };
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }

        if (self.line, self.column) == (line, column) {
            Ok(self.offset)
        } else {
            Err(ParseError::Tokenize {
                message: "token position does not match the source text".to_string(),
                position: Some(Position::new(line, column)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(sql: &str) -> Vec<Token> {
        tokenize(sql)
            .expect("tokenize")
            .into_iter()
            .filter(|token| !token.is_trivia())
            .collect()
    }

    #[test]
    fn classifies_keywords_identifiers_and_variables() {
        let tokens = significant("SELECT [Name], @id FROM dbo.Customer");
        let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::QuotedIdentifier,
                TokenKind::Comma,
                TokenKind::Variable,
                TokenKind::Keyword(Keyword::From),
                TokenKind::Identifier,
                TokenKind::Period,
                TokenKind::Identifier,
            ]
        );
        assert_eq!(tokens[1].value, "Name");
        assert_eq!(tokens[1].text, "[Name]");
        assert_eq!(tokens[3].value, "@id");
    }

    #[test]
    fn records_offsets_and_positions_across_lines() {
        let sql = "SELECT 1\n  FROM t";
        let tokens = tokenize(sql).expect("tokenize");
        let from = tokens
            .iter()
            .find(|token| token.is_keyword(Keyword::From))
            .expect("FROM token");
        assert_eq!(from.line, 2);
        assert_eq!(from.column, 3);
        assert_eq!(&sql[from.offset..from.end()], "FROM");
    }

    #[test]
    fn keeps_comments_as_trivia() {
        let tokens = tokenize("SELECT a /* note */ b").expect("tokenize");
        assert!(tokens
            .iter()
            .any(|token| token.kind == TokenKind::Comment && token.text == "/* note */"));
    }

    #[test]
    fn national_strings_keep_their_contents() {
        let tokens = significant("SELECT N'abc'");
        assert_eq!(tokens[1].kind, TokenKind::NationalStringLiteral);
        assert_eq!(tokens[1].value, "abc");
    }

    #[test]
    fn non_reserved_words_stay_identifiers() {
        let tokens = significant("GO");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[0].is_word("go"));
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let sql = "SELECT N'é€', x\r\nFROM t";
        let tokens = tokenize(sql).expect("tokenize");
        for token in &tokens {
            assert_eq!(&sql[token.offset..token.end()], token.text);
        }
        let x = tokens.iter().find(|token| token.value == "x").expect("x");
        assert_eq!((x.line, x.column), (1, 15));
        let from = tokens
            .iter()
            .find(|token| token.is_keyword(Keyword::From))
            .expect("FROM token");
        assert_eq!((from.line, from.column), (2, 1));
    }

    #[test]
    fn tokens_cover_the_source_without_gaps() {
        let sql = "SELECT a, -- trailing\n  b /* x */ FROM [t]";
        let tokens = tokenize(sql).expect("tokenize");
        let mut offset = 0;
        for token in &tokens {
            assert_eq!(token.offset, offset);
            offset = token.end();
        }
        assert_eq!(offset, sql.len());
    }

    #[test]
    fn positions_behind_the_cursor_are_rejected() {
        let mut cursor = OffsetCursor::new("SELECT 1\nFROM t");
        assert_eq!(cursor.seek(2, 1).unwrap(), 9);
        assert!(matches!(
            cursor.seek(1, 8),
            Err(ParseError::Tokenize {
                position: Some(Position { line: 1, column: 8 }),
                ..
            })
        ));
        assert!(cursor.seek(2, 40).is_err());
    }

    #[test]
    fn long_single_line_tokenizes_in_linear_time() {
        let sql = format!("SELECT {}", vec!["'x'"; 50_000].join(" + "));
        let started = std::time::Instant::now();
        let tokens = tokenize(&sql).expect("tokenize");
        assert_eq!(tokens.len(), 2 + 50_000 + 49_999 * 3);
        assert_eq!(tokens.last().map(Token::end), Some(sql.len()));
        assert!(started.elapsed() < std::time::Duration::from_secs(20));
    }

    #[test]
    fn keywords_come_from_the_tokenizer_and_tsql_extras() {
        let tokens = significant("select nonclustered Proc goto [select] selected");
        let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::NonClustered),
                TokenKind::Keyword(Keyword::Proc),
                TokenKind::Keyword(Keyword::Goto),
                TokenKind::QuotedIdentifier,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_a_tokenize_error() {
        let err = tokenize("SELECT 'abc").unwrap_err();
        assert!(matches!(err, ParseError::Tokenize { .. }));
    }
}
