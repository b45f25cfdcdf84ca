//! Syntax model consumed by the lint rules.
//!
//! A [`SyntaxTree`] bundles the source text, the full token stream (trivia
//! included) and the typed [`Script`] root. It is immutable once built and
//! can be shared across threads while several rules analyze it.

pub mod ast;
mod node;
mod span;
mod token;

pub use ast::*;
pub use node::{Node, NodeKind};
pub use span::Span;
pub use token::{tokenize, Keyword, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    tokens: Vec<Token>,
    script: Script,
}

impl SyntaxTree {
    pub fn new(source: impl Into<String>, tokens: Vec<Token>, script: Script) -> Self {
        Self {
            source: source.into(),
            tokens,
            script,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every token of the script, whitespace and comments included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn root(&self) -> Node<'_> {
        Node::Script(&self.script)
    }

    /// Source text covered by `span`, or an empty string for spans outside it.
    pub fn text(&self, span: &Span) -> &str {
        self.source.get(span.byte_range()).unwrap_or("")
    }
}
