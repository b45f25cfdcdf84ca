//! Source spans carried by every syntax node.

use crate::types::Location;
use std::ops::Range;

/// Where a node sits in the script, both lexically and in the token stream.
///
/// `first_token` and `last_token` are inclusive indices into
/// [`SyntaxTree::tokens`](super::SyntaxTree::tokens), which includes
/// whitespace and comments. `offset`/`length` are byte positions in the
/// source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// 1-based line of the first token.
    pub line: usize,
    /// 1-based column of the first token.
    pub column: usize,
    pub first_token: usize,
    pub last_token: usize,
    /// Byte offset of the first character.
    pub offset: usize,
    /// Length in bytes, up to the end of the last token.
    pub length: usize,
}

impl Span {
    /// Exclusive byte offset where the node ends.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    /// True when `other` lies within this span (equal spans included).
    pub fn contains(&self, other: &Span) -> bool {
        self.offset <= other.offset && self.end() >= other.end()
    }

    /// True when `other` lies within this span and this span is larger.
    pub fn strictly_contains(&self, other: &Span) -> bool {
        self.contains(other) && (self.offset < other.offset || self.end() > other.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(offset: usize, length: usize) -> Span {
        Span {
            offset,
            length,
            ..Span::default()
        }
    }

    #[test]
    fn strict_containment_requires_a_larger_span() {
        let outer = span(0, 10);
        assert!(outer.strictly_contains(&span(0, 5)));
        assert!(outer.strictly_contains(&span(5, 5)));
        assert!(!outer.strictly_contains(&span(0, 10)));
        assert!(!outer.strictly_contains(&span(5, 10)));
        assert!(outer.contains(&span(0, 10)));
    }
}
