//! The token scanner.

use std::num::IntErrorKind;

use fbs_diagnostic::{ErrorKind, ErrorWithPos};
use fbs_ir::{Comment, Keyword, PosRange, Position, Token, TokenKind};

use crate::cursor::Cursor;
use crate::escape;

/// Scans one schema file into tokens.
///
/// The lexer is sticky on failure: once an error has been returned, every
/// later call to [`next_token`](Lexer::next_token) returns the same error
/// without touching the input again.
#[derive(Debug)]
pub struct Lexer {
    file: String,
    cursor: Cursor,
    comments: Vec<Comment>,
    /// Whitespace seen since the last token, attached to the next comment.
    ws: String,
    err: Option<ErrorWithPos>,
}

impl Lexer {
    pub fn new(file: impl Into<String>, src: &str) -> Lexer {
        Lexer {
            file: file.into(),
            cursor: Cursor::new(src),
            comments: Vec::new(),
            ws: String::new(),
            err: None,
        }
    }

    /// Produce the next token; [`TokenKind::Eof`] at end of input.
    pub fn next_token(&mut self) -> Result<Token, ErrorWithPos> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        match self.scan() {
            Ok(tok) => Ok(tok),
            Err(err) => {
                self.err = Some(err.clone());
                Err(err)
            }
        }
    }

    /// All remaining tokens, ending with `Eof`, or the first error.
    pub fn lex_all(&mut self) -> Result<Vec<Token>, ErrorWithPos> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Comments collected so far, in source order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }

    fn scan(&mut self) -> Result<Token, ErrorWithPos> {
        loop {
            let start = self.cursor.pos();
            let Some(c) = self.cursor.peek() else {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    range: PosRange::new(start, start),
                    raw: String::new(),
                });
            };
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.bump();
                    self.ws.push(c);
                }
                '/' => match self.cursor.peek_at(1) {
                    Some('/') => self.line_comment(start),
                    Some('*') => self.block_comment(start)?,
                    _ => {
                        self.cursor.bump();
                        return Ok(self.token(TokenKind::Punct('/'), start));
                    }
                },
                '.' => {
                    self.cursor.bump();
                    if matches!(self.cursor.peek(), Some(d) if d.is_ascii_digit()) {
                        return self.number_from_dot(start);
                    }
                    return Ok(self.token(TokenKind::Punct('.'), start));
                }
                '_' => return Ok(self.ident(start)),
                c if c.is_ascii_alphabetic() => return Ok(self.ident(start)),
                c if c.is_ascii_digit() => return self.number(start),
                '\'' | '"' => return self.string(start, c),
                other => {
                    self.cursor.bump();
                    return Ok(self.token(TokenKind::Punct(other), start));
                }
            }
        }
    }

    /// Finish a token that started at `start`; raw text comes straight from
    /// the cursor.
    fn token(&mut self, kind: TokenKind, start: Position) -> Token {
        self.ws.clear();
        Token {
            kind,
            range: PosRange::new(start, self.cursor.pos()),
            raw: self.cursor.text_from(start),
        }
    }

    fn error_at(&self, pos: Position, msg: impl Into<String>) -> ErrorWithPos {
        ErrorWithPos::new(self.file.clone(), pos, ErrorKind::Lexical(msg.into()))
    }

    fn ident(&mut self, start: Position) -> Token {
        self.cursor.bump();
        while matches!(self.cursor.peek(), Some(c) if c == '_' || c.is_ascii_alphanumeric()) {
            self.cursor.bump();
        }
        let name = self.cursor.text_from(start);
        let kind = match Keyword::lookup(&name) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(name),
        };
        self.token(kind, start)
    }

    /// A number starting with a digit: hex, octal, decimal or float.
    fn number(&mut self, start: Position) -> Result<Token, ErrorWithPos> {
        let first = self.cursor.bump().unwrap_or('0');
        if first == '0' && matches!(self.cursor.peek(), Some('x' | 'X')) {
            if matches!(self.cursor.peek_at(1), Some(h) if h.is_ascii_hexdigit()) {
                return self.hex_number(start);
            }
            // Bare `0x`: the zero stands alone and the `x` lexes as the
            // start of an identifier.
            return Ok(self.token(TokenKind::Int(0), start));
        }
        let mut raw = String::from(first);
        self.read_number(&mut raw, true, true);
        self.finish_number(start, raw)
    }

    /// `.5`-style fraction; the dot is already consumed.
    fn number_from_dot(&mut self, start: Position) -> Result<Token, ErrorWithPos> {
        let mut raw = String::from('.');
        self.read_number(&mut raw, false, true);
        self.finish_number(start, raw)
    }

    fn hex_number(&mut self, start: Position) -> Result<Token, ErrorWithPos> {
        self.cursor.bump(); // x
        let digits_start = self.cursor.pos();
        while matches!(self.cursor.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.cursor.bump();
        }
        let digits = self.cursor.text_from(digits_start);
        match u64::from_str_radix(&digits, 16) {
            Ok(v) => Ok(self.token(TokenKind::Int(v), start)),
            Err(_) => Err(self.error_at(start, "value out of range")),
        }
    }

    /// Accumulate digits, at most one dot, and at most one exponent. An
    /// exponent is only consumed when a digit (or a sign and a digit)
    /// follows it, so `1ee` lexes as `1` and the identifier `ee`.
    fn read_number(&mut self, raw: &mut String, mut allow_dot: bool, mut allow_exp: bool) {
        loop {
            let Some(c) = self.cursor.peek() else { break };
            match c {
                '.' if allow_dot => allow_dot = false,
                'e' | 'E' if allow_exp => {
                    let next = self.cursor.peek_at(1);
                    let digit = matches!(next, Some(d) if d.is_ascii_digit());
                    let signed_digit = matches!(next, Some('+' | '-'))
                        && matches!(self.cursor.peek_at(2), Some(d) if d.is_ascii_digit());
                    if !digit && !signed_digit {
                        break;
                    }
                    allow_exp = false;
                    raw.push(c);
                    self.cursor.bump();
                    if signed_digit {
                        if let Some(sign) = self.cursor.bump() {
                            raw.push(sign);
                        }
                    }
                    continue;
                }
                c if c.is_ascii_digit() => {}
                _ => break,
            }
            raw.push(c);
            self.cursor.bump();
        }
    }

    fn finish_number(&mut self, start: Position, raw: String) -> Result<Token, ErrorWithPos> {
        if raw.contains(['.', 'e', 'E']) {
            let v = self.parse_float(start, &raw)?;
            return Ok(self.token(TokenKind::Float(v), start));
        }
        // Plain integer: a leading zero makes the rest octal.
        let parsed = if raw.len() > 1 && raw.starts_with('0') {
            u64::from_str_radix(&raw[1..], 8)
        } else {
            raw.parse::<u64>()
        };
        match parsed {
            Ok(v) => Ok(self.token(TokenKind::Int(v), start)),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                // Too large for u64: fall back to a float literal.
                let v = self.parse_float(start, &raw)?;
                Ok(self.token(TokenKind::Float(v), start))
            }
            Err(_) => Err(self.error_at(start, format!("invalid number: {raw}"))),
        }
    }

    fn parse_float(&self, start: Position, raw: &str) -> Result<f64, ErrorWithPos> {
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(self.error_at(start, "value out of range")),
            Err(_) => Err(self.error_at(start, format!("invalid number: {raw}"))),
        }
    }

    fn string(&mut self, start: Position, quote: char) -> Result<Token, ErrorWithPos> {
        self.cursor.bump(); // opening quote
        let mut value = String::new();
        loop {
            let Some(c) = self.cursor.bump() else {
                return Err(self.error_at(start, "unexpected EOF"));
            };
            if c == quote {
                break;
            }
            match c {
                '\n' => {
                    return Err(
                        self.error_at(start, "encountered end of line before end of string")
                    );
                }
                '\0' => {
                    return Err(self.error_at(start, "null char not allowed in string literal"));
                }
                '\\' => match escape::decode(&mut self.cursor) {
                    Ok(decoded) => value.push(decoded),
                    Err(msg) => return Err(self.error_at(start, msg)),
                },
                other => value.push(other),
            }
        }
        Ok(self.token(TokenKind::Str(value), start))
    }

    fn line_comment(&mut self, start: Position) {
        self.cursor.bump();
        self.cursor.bump();
        while matches!(self.cursor.peek(), Some(c) if c != '\n') {
            self.cursor.bump();
        }
        self.push_comment(start);
    }

    fn block_comment(&mut self, start: Position) -> Result<(), ErrorWithPos> {
        self.cursor.bump();
        self.cursor.bump();
        loop {
            if self.cursor.peek() == Some('*') && self.cursor.peek_at(1) == Some('/') {
                self.cursor.bump();
                self.cursor.bump();
                break;
            }
            if self.cursor.bump().is_none() {
                return Err(
                    self.error_at(start, "block comment never terminates, unexpected EOF")
                );
            }
        }
        self.push_comment(start);
        Ok(())
    }

    fn push_comment(&mut self, start: Position) {
        let text = self.cursor.text_from(start);
        self.comments.push(Comment {
            range: PosRange::new(start, self.cursor.pos()),
            leading_whitespace: std::mem::take(&mut self.ws),
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new("test.fbs", src)
            .lex_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn first_err(src: &str) -> String {
        Lexer::new("test.fbs", src)
            .lex_all()
            .unwrap_err()
            .kind
            .to_string()
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(
            kinds(".666 .5 90e0 9e-3 1e1 1. 0.009"),
            vec![
                TokenKind::Float(0.666),
                TokenKind::Float(0.5),
                TokenKind::Float(90.0),
                TokenKind::Float(0.009),
                TokenKind::Float(10.0),
                TokenKind::Float(1.0),
                TokenKind::Float(0.009),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_dot_without_digit_is_punct() {
        assert_eq!(
            kinds(".app"),
            vec![
                TokenKind::Punct('.'),
                TokenKind::Ident("app".to_owned()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_exponent_needs_digits() {
        // `1ee` is the integer 1 followed by an identifier.
        assert_eq!(
            kinds("1ee"),
            vec![
                TokenKind::Int(1),
                TokenKind::Ident("ee".to_owned()),
                TokenKind::Eof,
            ]
        );
        // A second exponent is not consumed.
        assert_eq!(
            kinds("1e1e"),
            vec![
                TokenKind::Float(10.0),
                TokenKind::Ident("e".to_owned()),
                TokenKind::Eof,
            ]
        );
        // Sign without a digit leaves `e-` unread.
        assert_eq!(
            kinds("1e- "),
            vec![
                TokenKind::Int(1),
                TokenKind::Ident("e".to_owned()),
                TokenKind::Punct('-'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hex_numbers() {
        assert_eq!(kinds("0xff"), vec![TokenKind::Int(255), TokenKind::Eof]);
        assert_eq!(kinds("0X1A"), vec![TokenKind::Int(26), TokenKind::Eof]);
        // `0x` without a hex digit: zero, then an identifier.
        assert_eq!(
            kinds("0xzz"),
            vec![
                TokenKind::Int(0),
                TokenKind::Ident("xzz".to_owned()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("0x"),
            vec![
                TokenKind::Int(0),
                TokenKind::Ident("x".to_owned()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(first_err("0xFFFFFFFFFFFFFFFFF"), "value out of range");
    }

    #[test]
    fn test_octal_numbers() {
        assert_eq!(kinds("0777"), vec![TokenKind::Int(511), TokenKind::Eof]);
        assert_eq!(kinds("0"), vec![TokenKind::Int(0), TokenKind::Eof]);
        assert_eq!(first_err("09"), "invalid number: 09");
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        // 2^64 does not fit u64.
        assert_eq!(
            kinds("18446744073709551616"),
            vec![TokenKind::Float(18_446_744_073_709_551_616.0), TokenKind::Eof]
        );
    }

    #[test]
    fn test_float_out_of_range() {
        assert_eq!(first_err(".1e1000"), "value out of range");
        assert_eq!(first_err("1.1e1000"), "value out of range");
    }

    #[test]
    fn test_keywords_and_idents() {
        assert_eq!(
            kinds("table Monster true truex"),
            vec![
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Ident("Monster".to_owned()),
                TokenKind::Keyword(Keyword::True),
                TokenKind::Ident("truex".to_owned()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("{};:[]()=,@"),
            vec![
                TokenKind::Punct('{'),
                TokenKind::Punct('}'),
                TokenKind::Punct(';'),
                TokenKind::Punct(':'),
                TokenKind::Punct('['),
                TokenKind::Punct(']'),
                TokenKind::Punct('('),
                TokenKind::Punct(')'),
                TokenKind::Punct('='),
                TokenKind::Punct(','),
                TokenKind::Punct('@'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            kinds(r#""a simple string literal""#),
            vec![
                TokenKind::Str("a simple string literal".to_owned()),
                TokenKind::Eof,
            ]
        );
        // Single quotes work too.
        assert_eq!(
            kinds("'it\\'s'"),
            vec![TokenKind::Str("it's".to_owned()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""\x41 \101 \u0041 \U00000041""#),
            vec![TokenKind::Str("A A A A".to_owned()), TokenKind::Eof]
        );
        assert_eq!(
            kinds(r#""\a \b \f \n \r \v \\ \' \" \?""#),
            vec![
                TokenKind::Str("\x07 \x08 \x0C \n \r \x0B \\ ' \" ?".to_owned()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds(r#""\xef -\u0414- \U0001F602""#),
            vec![TokenKind::Str("\u{ef} -Д- 😂".to_owned()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(first_err("\"partial string literal"), "unexpected EOF");
        assert_eq!(
            first_err("\"string with\nmore"),
            "encountered end of line before end of string"
        );
        assert_eq!(
            first_err("\"string\0"),
            "null char not allowed in string literal"
        );
        assert_eq!(first_err(r#""\H""#), "invalid escape sequence: \\H");
        assert_eq!(first_err(r#""\xx9""#), "invalid hex escape: \\xx9");
        assert_eq!(
            first_err(r#""\777""#),
            "octal escape out of range, should in [0,377]: \\777"
        );
        assert_eq!(
            first_err("\"\\ukkkk\""),
            "invalid unicode escape: \\ukkkk"
        );
        assert_eq!(
            first_err("\"\\U00ffffff\""),
            "unicode escape out of range, should in [0,0x10ffff]: \\U00ffffff"
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(
            first_err("/*"),
            "block comment never terminates, unexpected EOF"
        );
        assert_eq!(
            first_err("/**"),
            "block comment never terminates, unexpected EOF"
        );
    }

    #[test]
    fn test_comments_are_captured() {
        let mut lexer = Lexer::new("test.fbs", "// hi\n  /* blk */ table");
        let tokens = lexer.lex_all().unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind.clone()).collect::<Vec<_>>(),
            vec![TokenKind::Keyword(Keyword::Table), TokenKind::Eof]
        );
        let comments = lexer.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "// hi");
        assert_eq!(comments[1].text, "/* blk */");
        assert_eq!(comments[1].leading_whitespace, "\n  ");
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("test.fbs", "  .666\n\t0xff").lex_all().unwrap();
        let float = &tokens[0];
        assert_eq!(float.range.start, Position::new(1, 3, 2));
        assert_eq!(float.range.end, Position::new(1, 7, 6));
        assert_eq!(float.raw, ".666");

        // The tab jumps to the next multiple-of-4 column stop.
        let hex = &tokens[1];
        assert_eq!(hex.range.start, Position::new(2, 5, 8));
        assert_eq!(hex.range.end, Position::new(2, 9, 12));
        assert_eq!(hex.raw, "0xff");
    }

    #[test]
    fn test_error_is_sticky() {
        let mut lexer = Lexer::new("test.fbs", "\"\\H\" table");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(lexer.next_token().unwrap_err(), err);
        assert_eq!(lexer.next_token().unwrap_err(), err);
    }

    #[test]
    fn test_error_display() {
        let err = Lexer::new("lexer_test.fbs", "  \"\\H\"").lex_all().unwrap_err();
        assert_eq!(
            err.to_string(),
            "lexer_test.fbs:1:3: invalid escape sequence: \\H"
        );
    }

    proptest! {
        #[test]
        fn test_decimal_roundtrip(n in any::<u64>()) {
            let src = n.to_string();
            prop_assert_eq!(kinds(&src), vec![TokenKind::Int(n), TokenKind::Eof]);
        }

        #[test]
        fn test_float_roundtrip(
            x in any::<f64>().prop_filter("finite positive", |x| x.is_finite() && *x > 0.0)
        ) {
            // Debug formatting always keeps a dot or exponent, so the
            // literal lexes back as a float, and shortest-roundtrip
            // formatting guarantees the exact same value.
            let src = format!("{x:?}");
            prop_assert_eq!(kinds(&src), vec![TokenKind::Float(x), TokenKind::Eof]);
        }
    }
}
