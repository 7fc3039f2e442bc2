//! Descriptors for the FBS schema language.
//!
//! [`lower`] turns one parsed [`fbs_ir::Schema`] into a [`SchemaDesc`]: the
//! flat view of a file that the linker checks and rewrites. The descriptor
//! types live in [`desc`], the lowering pass in [`lower`](mod@lower).

pub mod desc;
pub mod lower;

pub use desc::{
    all_namespaces, ns_prefix, DescKind, EnumDesc, EnumValDesc, FieldDesc, MetadataDesc,
    MethodDesc, RpcDesc, ScalarValue, SchemaDesc, StructDesc, TableDesc, TypeRef, UnionDesc,
    UnionValDesc,
};
pub use lower::lower;
