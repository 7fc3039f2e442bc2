//! Token cursor for the parser.

use fbs_ir::{PosRange, Position, Token, TokenKind};

/// Read-only walk over a token stream. The stream always ends with an
/// `Eof` token; advancing past it keeps yielding `Eof`.
#[derive(Debug)]
pub(crate) struct TokenCursor {
    tokens: Vec<Token>,
    idx: usize,
}

impl TokenCursor {
    pub(crate) fn new(mut tokens: Vec<Token>) -> TokenCursor {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let pos = tokens.last().map_or(Position::FIRST, |t| t.range.end);
            tokens.push(Token {
                kind: TokenKind::Eof,
                range: PosRange::new(pos, pos),
                raw: String::new(),
            });
        }
        TokenCursor { tokens, idx: 0 }
    }

    /// The current token, unconsumed.
    #[inline]
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.idx]
    }

    /// Consume and return the current token; sticks at `Eof`.
    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.tokens[self.idx].clone();
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
        tok
    }
}
