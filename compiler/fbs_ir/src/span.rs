//! Source locations.
//!
//! A [`Position`] is a point in one schema file; a [`PosRange`] is the
//! half-open region covered by a token or AST node. Line and column are
//! 1-based; `offset` counts characters (not bytes) from the start of the
//! file.

use std::fmt;

/// A location in a schema file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Position {
    pub line: u32,
    pub col: u32,
    pub offset: u32,
}

impl Position {
    /// The first position of any file.
    pub const FIRST: Position = Position {
        line: 1,
        col: 1,
        offset: 0,
    };

    /// Create a new position.
    #[inline]
    pub const fn new(line: u32, col: u32, offset: u32) -> Self {
        Position { line, col, offset }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::FIRST
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A region of a schema file, `start` inclusive, `end` exclusive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct PosRange {
    pub start: Position,
    pub end: Position,
}

impl PosRange {
    /// Create a new range.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        PosRange { start, end }
    }

    /// The range covering both `self` and `other`.
    ///
    /// Ranges produced by the lexer are already ordered by offset, so the
    /// earlier start and the later end are taken by offset comparison.
    #[must_use]
    pub fn merge(self, other: PosRange) -> PosRange {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        PosRange { start, end }
    }
}

impl fmt::Display for PosRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A line or block comment captured by the lexer.
///
/// Comments are trivia: they never reach the parser, but the lexer records
/// them with the whitespace that preceded them so tooling can reattach them.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Comment {
    pub range: PosRange,
    pub leading_whitespace: String,
    pub text: String,
}
