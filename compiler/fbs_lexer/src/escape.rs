//! Escape sequence decoding for string literals.
//!
//! Recognized forms: octal `\N`..`\NNN` (value must fit a byte), hex `\xN`/
//! `\xNN`, short unicode `\uNNNN`, long unicode `\UNNNNNNNN` (value must be
//! a valid code point), and the single-letter escapes `a b f n r v \ ' " ?`.
//! Each escape decodes to one Unicode scalar value.

use crate::cursor::Cursor;

const UNEXPECTED_EOF: &str = "unexpected EOF";

/// Decode one escape sequence. The backslash has already been consumed;
/// errors are returned as bare messages for the lexer to position.
pub(crate) fn decode(cursor: &mut Cursor) -> Result<char, String> {
    let Some(c) = cursor.bump() else {
        return Err(UNEXPECTED_EOF.to_owned());
    };
    match c {
        'x' | 'X' => hex(cursor),
        '0'..='7' => octal(cursor, c),
        'u' => unicode(cursor, 'u', 4),
        'U' => unicode(cursor, 'U', 8),
        'a' => Ok('\x07'),
        'b' => Ok('\x08'),
        'f' => Ok('\x0C'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        'v' => Ok('\x0B'),
        '\\' => Ok('\\'),
        '\'' => Ok('\''),
        '"' => Ok('"'),
        '?' => Ok('?'),
        other => Err(format!("invalid escape sequence: \\{other}")),
    }
}

/// `\xN` or `\xNN`: one mandatory character, a second only when it is a
/// hex digit. The first character is validated by the parse so that
/// `\xx9` reports the escape, not the stray `x`.
fn hex(cursor: &mut Cursor) -> Result<char, String> {
    let Some(c1) = cursor.bump() else {
        return Err(UNEXPECTED_EOF.to_owned());
    };
    let mut digits = String::from(c1);
    match cursor.peek() {
        Some(c2) if c2.is_ascii_hexdigit() => {
            cursor.bump();
            digits.push(c2);
        }
        Some(_) => {}
        None => return Err(UNEXPECTED_EOF.to_owned()),
    }
    match u8::from_str_radix(&digits, 16) {
        Ok(v) => Ok(char::from(v)),
        Err(_) => Err(format!("invalid hex escape: \\x{digits}")),
    }
}

/// `\N`..`\NNN`: up to three octal digits, value at most 0o377.
fn octal(cursor: &mut Cursor, c1: char) -> Result<char, String> {
    let mut digits = String::from(c1);
    match cursor.peek() {
        Some(c2) if is_octal(c2) => {
            cursor.bump();
            digits.push(c2);
            // A third digit only if present; EOF here surfaces from the
            // enclosing string scan instead.
            if let Some(c3) = cursor.peek() {
                if is_octal(c3) {
                    cursor.bump();
                    digits.push(c3);
                }
            }
        }
        Some(_) => {}
        None => return Err(UNEXPECTED_EOF.to_owned()),
    }
    match u16::from_str_radix(&digits, 8) {
        Ok(v) if v <= 0xFF => Ok(char::from(v as u8)),
        _ => Err(format!(
            "octal escape out of range, should in [0,377]: \\{digits}"
        )),
    }
}

/// `\uNNNN` or `\UNNNNNNNN`: a fixed count of characters, parsed as hex.
/// The long form is range-checked against the last code point; a value
/// with no `char` (a surrogate) decodes to U+FFFD.
fn unicode(cursor: &mut Cursor, marker: char, len: usize) -> Result<char, String> {
    let mut digits = String::with_capacity(len);
    for _ in 0..len {
        let Some(c) = cursor.bump() else {
            return Err(UNEXPECTED_EOF.to_owned());
        };
        digits.push(c);
    }
    let Ok(v) = i32::from_str_radix(&digits, 16) else {
        return Err(format!("invalid unicode escape: \\{marker}{digits}"));
    };
    if marker == 'U' && !(0..=0x0010_FFFF).contains(&v) {
        return Err(format!(
            "unicode escape out of range, should in [0,0x10ffff]: \\{marker}{digits}"
        ));
    }
    #[allow(clippy::cast_sign_loss)]
    Ok(char::from_u32(v as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
}

#[inline]
fn is_octal(c: char) -> bool {
    ('0'..='7').contains(&c)
}
