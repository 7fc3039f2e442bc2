//! AST node families for a parsed schema file.
//!
//! Nodes are closed enums and plain structs. Composite nodes carry a
//! `PosRange` computed from their first and last child at construction, so
//! every node can report where it starts and ends without a side table.

use std::fmt;

use crate::span::PosRange;
use crate::token::Keyword;
use crate::value::{IntLit, StrLit, ValueNode};

/// A plain identifier.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Ident {
    pub name: String,
    pub range: PosRange,
}

/// A possibly dotted name, e.g. `rpc.app.Vec3` or `.rpc.app.Vec3`.
///
/// A leading dot marks the name as fully qualified: resolution looks it up
/// directly instead of walking the enclosing namespaces.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct QualIdent {
    pub leading_dot: bool,
    pub parts: Vec<Ident>,
    /// The full dotted spelling, leading dot included when present.
    pub value: String,
    pub range: PosRange,
}

impl QualIdent {
    /// Build a qualified identifier from its parts.
    ///
    /// `dot_range` is the range of the leading dot when there is one, used
    /// to extend the node's own range.
    pub fn new(dot_range: Option<PosRange>, parts: Vec<Ident>) -> QualIdent {
        let leading_dot = dot_range.is_some();
        let mut value = String::new();
        if leading_dot {
            value.push('.');
        }
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                value.push('.');
            }
            value.push_str(&part.name);
        }
        let mut range = match (parts.first(), parts.last()) {
            (Some(first), Some(last)) => first.range.merge(last.range),
            _ => PosRange::default(),
        };
        if let Some(dot) = dot_range {
            range = range.merge(dot);
        }
        QualIdent {
            leading_dot,
            parts,
            value,
            range,
        }
    }

    /// The first dotted segment, e.g. `rpc` of `rpc.app.Vec3`.
    pub fn first_name(&self) -> &str {
        self.parts.first().map_or("", |p| p.name.as_str())
    }
}

impl fmt::Display for QualIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// One parsed schema file.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Schema {
    pub includes: Vec<Include>,
    pub decls: Vec<Decl>,
}

/// `include "other.fbs";`
#[derive(Clone, PartialEq, Debug)]
pub struct Include {
    pub name: StrLit,
    pub range: PosRange,
}

/// A top-level declaration.
#[derive(Clone, PartialEq, Debug)]
pub enum Decl {
    Namespace(NamespaceDecl),
    Table(TypeDecl),
    Struct(TypeDecl),
    Enum(EnumDecl),
    Union(UnionDecl),
    Root(RootDecl),
    FileExtension(FileDecl),
    FileIdentifier(FileDecl),
    Attribute(FileDecl),
    Rpc(RpcDecl),
}

impl Decl {
    pub fn range(&self) -> PosRange {
        match self {
            Decl::Namespace(d) => d.range,
            Decl::Table(d) | Decl::Struct(d) => d.range,
            Decl::Enum(d) => d.range,
            Decl::Union(d) => d.range,
            Decl::Root(d) => d.range,
            Decl::FileExtension(d) | Decl::FileIdentifier(d) | Decl::Attribute(d) => d.range,
            Decl::Rpc(d) => d.range,
        }
    }
}

/// `namespace a.b.c;`
#[derive(Clone, PartialEq, Debug)]
pub struct NamespaceDecl {
    pub name: QualIdent,
    pub range: PosRange,
}

/// `root_type Monster;`
#[derive(Clone, PartialEq, Debug)]
pub struct RootDecl {
    pub name: QualIdent,
    pub range: PosRange,
}

/// A declaration whose single operand is a string literal:
/// `file_extension`, `file_identifier` or `attribute`.
#[derive(Clone, PartialEq, Debug)]
pub struct FileDecl {
    pub value: StrLit,
    pub range: PosRange,
}

/// A `table` or `struct` declaration; the two share a shape and are told
/// apart by their [`Decl`] variant.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeDecl {
    pub name: Ident,
    pub metadata: Option<Metadata>,
    pub fields: Vec<Field>,
    pub range: PosRange,
}

/// `name: type = default (metadata);`
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    pub name: Ident,
    pub ty: TypeName,
    pub default: Option<ValueNode>,
    pub metadata: Option<Metadata>,
    pub range: PosRange,
}

/// A field or enum-base type, optionally wrapped in `[...]` for vectors.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeName {
    pub vector: bool,
    pub ty: TypeRefNode,
    pub range: PosRange,
}

/// The element of a [`TypeName`]: a built-in type keyword or a reference to
/// a declared type.
#[derive(Clone, PartialEq, Debug)]
pub enum TypeRefNode {
    Scalar { keyword: Keyword, range: PosRange },
    Named(QualIdent),
}

impl TypeRefNode {
    pub fn range(&self) -> PosRange {
        match self {
            TypeRefNode::Scalar { range, .. } => *range,
            TypeRefNode::Named(q) => q.range,
        }
    }
}

/// `enum Color : byte { ... }`
#[derive(Clone, PartialEq, Debug)]
pub struct EnumDecl {
    pub name: Ident,
    pub base: TypeName,
    pub metadata: Option<Metadata>,
    pub values: Vec<EnumValue>,
    pub range: PosRange,
}

/// One enum member, with its explicit value if written.
#[derive(Clone, PartialEq, Debug)]
pub struct EnumValue {
    pub name: Ident,
    pub value: Option<IntLit>,
    pub range: PosRange,
}

/// `union Any { ... }`
#[derive(Clone, PartialEq, Debug)]
pub struct UnionDecl {
    pub name: Ident,
    pub metadata: Option<Metadata>,
    pub values: Vec<UnionValue>,
    pub range: PosRange,
}

/// One union member: a type reference with an optional alias.
#[derive(Clone, PartialEq, Debug)]
pub struct UnionValue {
    pub alias: Option<Ident>,
    pub ty: QualIdent,
    pub range: PosRange,
}

/// `rpc_service Greeter { ... }`
#[derive(Clone, PartialEq, Debug)]
pub struct RpcDecl {
    pub name: Ident,
    pub methods: Vec<RpcMethod>,
    pub range: PosRange,
}

/// `Hello(HelloRequest): HelloReply;`
#[derive(Clone, PartialEq, Debug)]
pub struct RpcMethod {
    pub name: Ident,
    pub input: QualIdent,
    pub output: QualIdent,
    pub metadata: Option<Metadata>,
    pub range: PosRange,
}

/// A parenthesized metadata list attached to a declaration or field.
#[derive(Clone, PartialEq, Debug)]
pub struct Metadata {
    pub entries: Vec<MetadataEntry>,
    pub range: PosRange,
}

/// `key` or `key: value` inside metadata parentheses.
#[derive(Clone, PartialEq, Debug)]
pub struct MetadataEntry {
    pub key: Ident,
    pub value: Option<ValueNode>,
    pub range: PosRange,
}
