//! Lexer for the FBS schema language.
//!
//! Turns source text into [`fbs_ir::Token`]s with full literal semantics:
//! decimal, octal and hex integers (with overflow falling back to floats),
//! floats with exponents, quoted strings with the complete escape table,
//! and line/block comments captured as trivia.

mod cursor;
mod escape;
mod lexer;

pub use lexer::Lexer;
