//! Token model and the fixed keyword table.

use std::fmt;

use crate::span::PosRange;

/// Position and raw text shared by every terminal node.
///
/// This is the payload the lexer attaches to each token; terminal AST nodes
/// embed it so that `start()`/`end()` and the original source text stay
/// available after parsing.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TokenInfo {
    pub range: PosRange,
    pub raw: String,
}

/// What a token is, with its decoded literal value where applicable.
#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    /// Identifier that is not a keyword.
    Ident(String),
    /// One of the fixed schema keywords.
    Keyword(Keyword),
    /// String literal, escape sequences already decoded.
    Str(String),
    /// Unsigned integer literal (decimal, octal or hex).
    Int(u64),
    /// Floating point literal.
    Float(f64),
    /// Single punctuation character.
    Punct(char),
    /// End of input.
    Eof,
}

/// A single decoded token.
#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub range: PosRange,
    /// Raw source text of the token.
    pub raw: String,
}

impl Token {
    /// Position and raw text of this token, for embedding in an AST node.
    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            range: self.range,
            raw: self.raw.clone(),
        }
    }
}

/// Reserved words of the schema language.
///
/// The set is fixed by the grammar; lookup is case-sensitive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Keyword {
    Attribute,
    Bool,
    Byte,
    Double,
    Enum,
    False,
    FileExtension,
    FileIdentifier,
    Float,
    Float32,
    Float64,
    Include,
    Inf,
    Int,
    Int16,
    Int32,
    Int64,
    Int8,
    Long,
    Namespace,
    Nan,
    RootType,
    RpcService,
    Short,
    String,
    Struct,
    Table,
    True,
    Ubyte,
    Uint,
    Uint16,
    Uint32,
    Uint64,
    Uint8,
    Ulong,
    Union,
    Ushort,
}

impl Keyword {
    /// Look up an identifier in the keyword table.
    pub fn lookup(s: &str) -> Option<Keyword> {
        let kw = match s {
            "attribute" => Keyword::Attribute,
            "bool" => Keyword::Bool,
            "byte" => Keyword::Byte,
            "double" => Keyword::Double,
            "enum" => Keyword::Enum,
            "false" => Keyword::False,
            "file_extension" => Keyword::FileExtension,
            "file_identifier" => Keyword::FileIdentifier,
            "float" => Keyword::Float,
            "float32" => Keyword::Float32,
            "float64" => Keyword::Float64,
            "include" => Keyword::Include,
            "inf" => Keyword::Inf,
            "int" => Keyword::Int,
            "int16" => Keyword::Int16,
            "int32" => Keyword::Int32,
            "int64" => Keyword::Int64,
            "int8" => Keyword::Int8,
            "long" => Keyword::Long,
            "namespace" => Keyword::Namespace,
            "nan" => Keyword::Nan,
            "root_type" => Keyword::RootType,
            "rpc_service" => Keyword::RpcService,
            "short" => Keyword::Short,
            "string" => Keyword::String,
            "struct" => Keyword::Struct,
            "table" => Keyword::Table,
            "true" => Keyword::True,
            "ubyte" => Keyword::Ubyte,
            "uint" => Keyword::Uint,
            "uint16" => Keyword::Uint16,
            "uint32" => Keyword::Uint32,
            "uint64" => Keyword::Uint64,
            "uint8" => Keyword::Uint8,
            "ulong" => Keyword::Ulong,
            "union" => Keyword::Union,
            "ushort" => Keyword::Ushort,
            _ => return None,
        };
        Some(kw)
    }

    /// The source spelling of this keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Attribute => "attribute",
            Keyword::Bool => "bool",
            Keyword::Byte => "byte",
            Keyword::Double => "double",
            Keyword::Enum => "enum",
            Keyword::False => "false",
            Keyword::FileExtension => "file_extension",
            Keyword::FileIdentifier => "file_identifier",
            Keyword::Float => "float",
            Keyword::Float32 => "float32",
            Keyword::Float64 => "float64",
            Keyword::Include => "include",
            Keyword::Inf => "inf",
            Keyword::Int => "int",
            Keyword::Int16 => "int16",
            Keyword::Int32 => "int32",
            Keyword::Int64 => "int64",
            Keyword::Int8 => "int8",
            Keyword::Long => "long",
            Keyword::Namespace => "namespace",
            Keyword::Nan => "nan",
            Keyword::RootType => "root_type",
            Keyword::RpcService => "rpc_service",
            Keyword::Short => "short",
            Keyword::String => "string",
            Keyword::Struct => "struct",
            Keyword::Table => "table",
            Keyword::True => "true",
            Keyword::Ubyte => "ubyte",
            Keyword::Uint => "uint",
            Keyword::Uint16 => "uint16",
            Keyword::Uint32 => "uint32",
            Keyword::Uint64 => "uint64",
            Keyword::Uint8 => "uint8",
            Keyword::Ulong => "ulong",
            Keyword::Union => "union",
            Keyword::Ushort => "ushort",
        }
    }

    /// Whether this keyword names a built-in scalar or string type usable
    /// as a field type.
    pub fn is_scalar_type(self) -> bool {
        matches!(
            self,
            Keyword::Bool
                | Keyword::Byte
                | Keyword::Double
                | Keyword::Float
                | Keyword::Float32
                | Keyword::Float64
                | Keyword::Int
                | Keyword::Int16
                | Keyword::Int32
                | Keyword::Int64
                | Keyword::Int8
                | Keyword::Long
                | Keyword::Short
                | Keyword::String
                | Keyword::Ubyte
                | Keyword::Uint
                | Keyword::Uint16
                | Keyword::Uint32
                | Keyword::Uint64
                | Keyword::Uint8
                | Keyword::Ulong
                | Keyword::Ushort
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "identifier `{s}`"),
            TokenKind::Keyword(k) => write!(f, "`{k}`"),
            TokenKind::Str(_) => write!(f, "string literal"),
            TokenKind::Int(n) => write!(f, "integer literal `{n}`"),
            TokenKind::Float(v) => write!(f, "float literal `{v}`"),
            TokenKind::Punct(c) => write!(f, "`{c}`"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_hit() {
        assert_eq!(Keyword::lookup("table"), Some(Keyword::Table));
        assert_eq!(Keyword::lookup("rpc_service"), Some(Keyword::RpcService));
        assert_eq!(Keyword::lookup("ushort"), Some(Keyword::Ushort));
    }

    #[test]
    fn test_keyword_lookup_case_sensitive() {
        assert_eq!(Keyword::lookup("Table"), None);
        assert_eq!(Keyword::lookup("TABLE"), None);
    }

    #[test]
    fn test_keyword_lookup_miss() {
        assert_eq!(Keyword::lookup("monster"), None);
        assert_eq!(Keyword::lookup(""), None);
    }

    #[test]
    fn test_keyword_roundtrip() {
        for s in ["bool", "file_identifier", "inf", "nan", "union"] {
            let kw = Keyword::lookup(s).unwrap_or(Keyword::Bool);
            assert_eq!(kw.as_str(), s);
        }
    }

    #[test]
    fn test_scalar_type_keywords() {
        assert!(Keyword::String.is_scalar_type());
        assert!(Keyword::Ubyte.is_scalar_type());
        assert!(!Keyword::Table.is_scalar_type());
        assert!(!Keyword::Include.is_scalar_type());
    }
}
