//! Shared front-end data model: source positions, tokens, keywords, AST
//! node families and literal values.
//!
//! Everything downstream of the lexer speaks these types; the crate itself
//! depends on nothing else in the workspace.

pub mod ast;
pub mod span;
pub mod token;
pub mod value;

pub use ast::{
    Decl, EnumDecl, EnumValue, Field, FileDecl, Ident, Include, Metadata, MetadataEntry,
    NamespaceDecl, QualIdent, RootDecl, RpcDecl, RpcMethod, Schema, TypeDecl, TypeName,
    TypeRefNode, UnionDecl, UnionValue,
};
pub use span::{Comment, PosRange, Position};
pub use token::{Keyword, Token, TokenInfo, TokenKind};
pub use value::{
    BoolLit, FloatLit, IntLit, SignedFloatLit, SignedIntLit, SpecialFloatLit, StrLit, UintLit,
    ValueNode,
};
