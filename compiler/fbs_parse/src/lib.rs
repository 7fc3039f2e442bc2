//! Parser for the FBS schema language.
//!
//! Hand-written recursive descent over the token stream; see
//! [`Parser`] for the grammar and [`parse_schema`] for the lex-and-parse
//! convenience entry.

mod cursor;
mod grammar;

pub use grammar::Parser;

use fbs_diagnostic::ErrorWithPos;
use fbs_ir::Schema;
use fbs_lexer::Lexer;

/// Lex and parse one schema file.
pub fn parse_schema(file: &str, src: &str) -> Result<Schema, ErrorWithPos> {
    let tokens = Lexer::new(file, src).lex_all()?;
    Parser::new(file, tokens).parse()
}
