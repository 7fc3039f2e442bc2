//! The error kinds and their rendering.

use std::error::Error;
use std::fmt;

use fbs_ir::Position;

/// Which half of an rpc method signature an error refers to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MethodDir {
    Request,
    Response,
}

impl MethodDir {
    fn as_str(self) -> &'static str {
        match self {
            MethodDir::Request => "request",
            MethodDir::Response => "response",
        }
    }
}

/// Everything that can go wrong between raw text and linked descriptors.
#[derive(Clone, PartialEq, Debug)]
pub enum ErrorKind {
    /// A lexical error with its full message, e.g. `value out of range`
    /// or `invalid escape sequence`.
    Lexical(String),
    /// The parser met a token it could not accept.
    Syntax { expected: String, found: String },
    /// An explicit enum value does not fit the 32-bit signed range. The
    /// offending literal is carried as text since it may not fit `i64`
    /// either.
    ValueOutOfRange { value: String },
    /// Two declarations produced the same fully-qualified name.
    ///
    /// `existing_file` is set when the earlier definition lives in a
    /// different file.
    DuplicateSymbol {
        symbol: String,
        existing_kind: &'static str,
        existing_file: Option<String>,
    },
    /// A type reference that matched nothing at all. `dir` is set when
    /// the reference sits in an rpc method signature.
    UnknownType {
        context: String,
        dir: Option<MethodDir>,
        name: String,
    },
    /// A type reference that landed on a namespace prefix: the walk found
    /// a plausible qualified name, but no symbol is defined there.
    MissingSymbol {
        context: String,
        dir: Option<MethodDir>,
        name: String,
        resolved: String,
    },
    /// A field type resolved to a symbol of the wrong kind.
    InvalidFieldType {
        context: String,
        fqn: String,
        actual: &'static str,
    },
    /// An rpc method request or response resolved to something other than
    /// a table.
    InvalidMethodType {
        context: String,
        dir: MethodDir,
        fqn: String,
        actual: &'static str,
    },
    /// A requested or included file could not be opened.
    FileNotFound { name: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical(msg) => f.write_str(msg),
            ErrorKind::Syntax { expected, found } => {
                write!(f, "syntax error: expected {expected}, found {found}")
            }
            ErrorKind::ValueOutOfRange { value } => {
                write!(f, "value {value} is out of range: [-2147483648,2147483647]")
            }
            ErrorKind::DuplicateSymbol {
                symbol,
                existing_kind,
                existing_file,
            } => {
                write!(f, "duplicate symbol {symbol}: already defined as {existing_kind}")?;
                if let Some(file) = existing_file {
                    write!(f, " in \"{file}\"")?;
                }
                Ok(())
            }
            ErrorKind::UnknownType { context, dir, name } => {
                write!(f, "{context}: unknown ")?;
                if let Some(d) = dir {
                    write!(f, "{} ", d.as_str())?;
                }
                write!(f, "type {name}")
            }
            ErrorKind::MissingSymbol {
                context,
                dir,
                name,
                resolved,
            } => {
                write!(f, "{context}: unknown ")?;
                if let Some(d) = dir {
                    write!(f, "{} ", d.as_str())?;
                }
                write!(f, "type {name}; resolved to {resolved} which is not defined")
            }
            ErrorKind::InvalidFieldType { context, fqn, actual } => {
                write!(f, "{context}: invalid type: {fqn} is a {actual}")
            }
            ErrorKind::InvalidMethodType {
                context,
                dir,
                fqn,
                actual,
            } => {
                write!(
                    f,
                    "{context}: invalid {} type: {fqn} is a {actual}, not a table",
                    dir.as_str()
                )
            }
            ErrorKind::FileNotFound { name } => write!(f, "cannot find file {name}"),
        }
    }
}

/// An error tied to a file and, when known, a position within it.
#[derive(Clone, PartialEq, Debug)]
pub struct ErrorWithPos {
    pub file: String,
    pub pos: Option<Position>,
    pub kind: ErrorKind,
}

impl ErrorWithPos {
    /// An error at a known position.
    pub fn new(file: impl Into<String>, pos: Position, kind: ErrorKind) -> Self {
        ErrorWithPos {
            file: file.into(),
            pos: Some(pos),
            kind,
        }
    }

    /// An error with no meaningful position, e.g. a missing file.
    pub fn unpositioned(file: impl Into<String>, kind: ErrorKind) -> Self {
        ErrorWithPos {
            file: file.into(),
            pos: None,
            kind,
        }
    }
}

impl fmt::Display for ErrorWithPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) if pos.line > 0 && pos.col > 0 => {
                write!(f, "{}:{}:{}: {}", self.file, pos.line, pos.col, self.kind)
            }
            _ if self.file.is_empty() => write!(f, "{}", self.kind),
            _ => write!(f, "{}: {}", self.file, self.kind),
        }
    }
}

impl Error for ErrorWithPos {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_with_position() {
        let err = ErrorWithPos::new(
            "schema.fbs",
            Position::new(3, 14, 40),
            ErrorKind::Lexical("value out of range".to_owned()),
        );
        assert_eq!(err.to_string(), "schema.fbs:3:14: value out of range");
    }

    #[test]
    fn test_display_without_position() {
        let err = ErrorWithPos::unpositioned(
            "main.fbs",
            ErrorKind::FileNotFound {
                name: "missing.fbs".to_owned(),
            },
        );
        assert_eq!(err.to_string(), "main.fbs: cannot find file missing.fbs");

        let bare = ErrorWithPos::unpositioned(
            "",
            ErrorKind::FileNotFound {
                name: "missing.fbs".to_owned(),
            },
        );
        assert_eq!(bare.to_string(), "cannot find file missing.fbs");
    }

    #[test]
    fn test_display_duplicate_symbol() {
        let same_file = ErrorKind::DuplicateSymbol {
            symbol: "a.b.M".to_owned(),
            existing_kind: "table",
            existing_file: None,
        };
        assert_eq!(
            same_file.to_string(),
            "duplicate symbol a.b.M: already defined as table"
        );

        let cross_file = ErrorKind::DuplicateSymbol {
            symbol: "a.b.M".to_owned(),
            existing_kind: "enum",
            existing_file: Some("first.fbs".to_owned()),
        };
        assert_eq!(
            cross_file.to_string(),
            "duplicate symbol a.b.M: already defined as enum in \"first.fbs\""
        );
    }

    #[test]
    fn test_display_value_out_of_range() {
        let err = ErrorKind::ValueOutOfRange {
            value: "2147483648".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "value 2147483648 is out of range: [-2147483648,2147483647]"
        );
    }

    #[test]
    fn test_display_unknown_type() {
        let field = ErrorKind::UnknownType {
            context: "field a.M.pos".to_owned(),
            dir: None,
            name: "Vec3".to_owned(),
        };
        assert_eq!(field.to_string(), "field a.M.pos: unknown type Vec3");

        let method = ErrorKind::UnknownType {
            context: "method a.Svc.Get".to_owned(),
            dir: Some(MethodDir::Request),
            name: "Req".to_owned(),
        };
        assert_eq!(method.to_string(), "method a.Svc.Get: unknown request type Req");
    }

    #[test]
    fn test_display_method_type() {
        let err = ErrorKind::InvalidMethodType {
            context: "method Greeter.Hello".to_owned(),
            dir: MethodDir::Response,
            fqn: "a.Vec3".to_owned(),
            actual: "struct",
        };
        assert_eq!(
            err.to_string(),
            "method Greeter.Hello: invalid response type: a.Vec3 is a struct, not a table"
        );
    }
}
