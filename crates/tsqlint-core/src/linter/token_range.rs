//! Lexical gap checks over the raw token stream.
//!
//! The tree does not record whether optional keywords such as `AS`, `INNER`
//! or `OUTER` were written. These helpers recover that by scanning the tokens
//! strictly between two nodes.

use crate::syntax::{Keyword, Span, Token, TokenKind};
use std::ops::Range;
#[cfg(feature = "tracing")]
use tracing::trace;

/// True if a token of `kind` occurs in `tokens[start..end]`.
///
/// Empty, inverted and out-of-bounds ranges are clamped, never an error.
pub fn has_token(tokens: &[Token], start: usize, end: usize, kind: TokenKind) -> bool {
    first_token_of(tokens, start..end, kind).is_some()
}

/// First token of `kind` within `range`, clamped to the stream.
pub fn first_token_of(tokens: &[Token], range: Range<usize>, kind: TokenKind) -> Option<&Token> {
    let end = range.end.min(tokens.len());
    if range.start >= end {
        return None;
    }
    tokens[range.start..end]
        .iter()
        .find(|token| token.kind == kind)
}

/// Token indices strictly between `left` and `right`.
///
/// `None` when `right` does not start after `left` ends, which callers treat
/// as "cannot determine" and do not report.
pub fn token_range_between(left: &Span, right: &Span) -> Option<Range<usize>> {
    let start = left.last_token.checked_add(1)?;
    (right.first_token >= start).then(|| start..right.first_token)
}

/// Whether `keyword` occurs between `left` and `right`, or `None` if the gap
/// cannot be determined.
pub fn keyword_between(
    tokens: &[Token],
    left: &Span,
    right: &Span,
    keyword: Keyword,
) -> Option<bool> {
    let Some(range) = token_range_between(left, right) else {
        #[cfg(feature = "tracing")]
        trace!(
            left_last = left.last_token,
            right_first = right.first_token,
            "Skipping undeterminable token range"
        );
        return None;
    };
    Some(has_token(
        tokens,
        range.start,
        range.end,
        TokenKind::Keyword(keyword),
    ))
}
