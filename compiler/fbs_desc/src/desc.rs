//! Descriptor types for a lowered schema file.
//!
//! Descriptors are the flat, namespace-annotated view of a file that the
//! linker works on. Type references start out as the spelling written in
//! source and are rewritten to fully-qualified `.a.b.Name` form during
//! linking. Every descriptor that can be the site of a link error carries
//! the source position of its declaration.

use rustc_hash::{FxHashMap, FxHashSet};

use fbs_ir::Position;

/// The kind of a pooled symbol, used in error messages and for the
/// "is this a type" check during resolution.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DescKind {
    Table,
    Struct,
    Field,
    Enum,
    EnumVal,
    Union,
    Rpc,
    Method,
}

impl DescKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DescKind::Table => "table",
            DescKind::Struct => "struct",
            DescKind::Field => "field",
            DescKind::Enum => "enum",
            DescKind::EnumVal => "enum value",
            DescKind::Union => "union",
            DescKind::Rpc => "rpc",
            DescKind::Method => "method",
        }
    }

    /// Whether a symbol of this kind can stand as a type reference.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            DescKind::Table
                | DescKind::Struct
                | DescKind::Enum
                | DescKind::EnumVal
                | DescKind::Union
        )
    }
}

/// A resolved reference to a type definition: the file that defines it and
/// its fully-qualified name without the leading dot.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeRef {
    pub file: String,
    pub fqn: String,
}

/// One lowered `.fbs` file.
///
/// `namespaces` always starts with `""` and grows as `namespace`
/// declarations are met; type declarations snapshot the last entry as their
/// own namespace. `dependencies` lists the files resolved for the includes,
/// in include order, once the entry point has parsed them.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SchemaDesc {
    pub name: String,
    pub namespaces: Vec<String>,
    pub root: String,
    pub file_ext: String,
    pub file_ident: String,
    pub attrs: Vec<String>,
    pub includes: Vec<String>,
    pub dependencies: Vec<String>,
    pub tables: Vec<TableDesc>,
    pub structs: Vec<StructDesc>,
    pub enums: Vec<EnumDesc>,
    pub unions: Vec<UnionDesc>,
    pub rpcs: Vec<RpcDesc>,
}

/// A `table` declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct TableDesc {
    pub namespace: String,
    pub name: String,
    pub fields: Vec<FieldDesc>,
    pub pos: Position,
}

/// A `struct` declaration. Same shape as a table; the two differ only in
/// the kind they expose to the linker.
#[derive(Clone, PartialEq, Debug)]
pub struct StructDesc {
    pub namespace: String,
    pub name: String,
    pub fields: Vec<FieldDesc>,
    pub pos: Position,
}

/// A field of a table or struct. `type_name` is either a built-in type
/// keyword (left alone by the linker) or a reference to rewrite.
#[derive(Clone, PartialEq, Debug)]
pub struct FieldDesc {
    pub name: String,
    pub type_name: String,
    /// `[typename]` declares a vector of typename.
    pub is_vector: bool,
    pub pos: Position,
}

/// An `enum` declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct EnumDesc {
    pub namespace: String,
    pub name: String,
    pub values: Vec<EnumValDesc>,
    pub pos: Position,
}

/// One enum member with its assigned number.
#[derive(Clone, PartialEq, Debug)]
pub struct EnumValDesc {
    pub name: String,
    pub number: i32,
    pub pos: Position,
}

/// A `union` declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct UnionDesc {
    pub namespace: String,
    pub name: String,
    pub values: Vec<UnionValDesc>,
    pub pos: Position,
}

/// One union member: a type name with an optional alias.
#[derive(Clone, PartialEq, Debug)]
pub struct UnionValDesc {
    pub name: Option<String>,
    pub type_name: String,
    pub pos: Position,
}

/// An `rpc_service` declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct RpcDesc {
    pub namespace: String,
    pub name: String,
    pub methods: Vec<MethodDesc>,
    pub pos: Position,
}

/// One rpc method. `input_type`/`output_type` hold the spelling from
/// source until the linker rewrites them to `.fqn` form and fills in the
/// resolved `input`/`output` references.
#[derive(Clone, PartialEq, Debug)]
pub struct MethodDesc {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub input: Option<TypeRef>,
    pub output: Option<TypeRef>,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub metadata: Option<MetadataDesc>,
    pub pos: Position,
    pub input_pos: Position,
    pub output_pos: Position,
}

/// Parenthesized metadata lowered to a key-value map. A key without a
/// value maps to `None`; duplicate keys keep the last value written.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MetadataDesc {
    pub kv: FxHashMap<String, Option<ScalarValue>>,
}

/// A metadata or default value after lowering.
#[derive(Clone, PartialEq, Debug)]
pub enum ScalarValue {
    Ident(String),
    Str(String),
    Bool(bool),
    Uint(u64),
    Int(i64),
    Float(f64),
}

/// Expands a namespace list into the set of all its dotted prefixes.
///
/// `["", "namespace1", "rpc.app.server"]` yields
/// `{"", "namespace1", "rpc", "rpc.app", "rpc.app.server"}`. The linker
/// uses this to tell "resolved to a namespace" apart from "not found".
pub fn all_namespaces(namespaces: &[String]) -> FxHashSet<String> {
    let mut all = FxHashSet::default();
    for ns in namespaces {
        for (i, b) in ns.char_indices() {
            if b == '.' {
                all.insert(ns[..i].to_owned());
            }
        }
        all.insert(ns.clone());
    }
    all
}

/// The `namespace + "."` prefix for a declaration, empty for the root
/// namespace.
pub fn ns_prefix(namespace: &str) -> String {
    if namespace.is_empty() {
        String::new()
    } else {
        format!("{namespace}.")
    }
}
