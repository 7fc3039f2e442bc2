//! Character cursor with position tracking.

use fbs_ir::Position;

const TAB_SIZE: u32 = 4;

/// Walks the source one character at a time, maintaining line, column and
/// character offset. Columns are advanced per character; a tab jumps to the
/// next multiple-of-4 stop and a carriage return does not move at all.
#[derive(Debug)]
pub(crate) struct Cursor {
    chars: Vec<char>,
    idx: usize,
    /// 0-based; reported positions add 1.
    line: u32,
    col: u32,
}

impl Cursor {
    pub(crate) fn new(src: &str) -> Cursor {
        Cursor {
            chars: src.chars().collect(),
            idx: 0,
            line: 0,
            col: 0,
        }
    }

    /// The next character, unconsumed.
    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Lookahead by `n` characters without consuming anything.
    #[inline]
    pub(crate) fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.idx + n).copied()
    }

    /// Consume one character and advance the position.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        match c {
            '\n' => {
                self.col = 0;
                self.line += 1;
            }
            '\r' => {}
            '\t' => {
                self.col += TAB_SIZE - self.col % TAB_SIZE;
            }
            _ => self.col += 1,
        }
        Some(c)
    }

    /// The 1-based position of the next unconsumed character.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn pos(&self) -> Position {
        Position::new(self.line + 1, self.col + 1, self.idx as u32)
    }

    /// Source text between a previously captured position and the cursor.
    pub(crate) fn text_from(&self, start: Position) -> String {
        self.chars[start.offset as usize..self.idx].iter().collect()
    }
}
