//! Single-pass lowering from the AST to descriptors.

use fbs_diagnostic::{ErrorKind, ErrorSink, ErrorWithPos};
use fbs_ir::{
    Decl, EnumDecl, EnumValue, Field, IntLit, Metadata, RpcDecl, RpcMethod, Schema, TypeDecl,
    TypeRefNode, UnionDecl, ValueNode,
};

use crate::desc::{
    EnumDesc, EnumValDesc, FieldDesc, MetadataDesc, MethodDesc, RpcDesc, ScalarValue, SchemaDesc,
    StructDesc, TableDesc, UnionDesc, UnionValDesc,
};

/// Metadata key that controls rpc method streaming.
pub const STREAMING: &str = "streaming";
/// `streaming: "client"` marks the request side as a stream.
pub const CLIENT_STREAMING: &str = "client";
/// `streaming: "server"` marks the response side as a stream.
pub const SERVER_STREAMING: &str = "server";
/// `streaming: "bidi"` marks both sides as streams.
pub const BIDI_STREAMING: &str = "bidi";

/// Lowers a parsed file to its descriptor.
///
/// The namespace in effect starts empty and follows `namespace`
/// declarations as the decl list is walked; each type declaration snapshots
/// the namespace current at its point in the file. An enum value outside
/// the i32 range is reported to `errors` (first error wins), lowered as 0,
/// and lowering continues so later declarations are still checked.
pub fn lower(file: &str, schema: &Schema, errors: &mut ErrorSink) -> SchemaDesc {
    Lowerer { file, errors }.schema(file, schema)
}

struct Lowerer<'a> {
    file: &'a str,
    errors: &'a mut ErrorSink,
}

impl Lowerer<'_> {
    fn schema(&mut self, name: &str, schema: &Schema) -> SchemaDesc {
        let mut fd = SchemaDesc {
            name: name.to_owned(),
            namespaces: vec![String::new()],
            ..SchemaDesc::default()
        };
        for incl in &schema.includes {
            fd.includes.push(incl.name.value.clone());
        }
        for decl in &schema.decls {
            match decl {
                Decl::Namespace(d) => fd.namespaces.push(d.name.value.clone()),
                Decl::Table(d) => fd.tables.push(table(&fd, d)),
                Decl::Struct(d) => fd.structs.push(strukt(&fd, d)),
                Decl::Enum(d) => {
                    let e = self.enumeration(&fd, d);
                    fd.enums.push(e);
                }
                Decl::Union(d) => fd.unions.push(union(&fd, d)),
                Decl::Rpc(d) => fd.rpcs.push(rpc(&fd, d)),
                Decl::Root(d) => fd.root = d.name.value.clone(),
                Decl::FileExtension(d) => fd.file_ext = d.value.value.clone(),
                Decl::FileIdentifier(d) => fd.file_ident = d.value.value.clone(),
                Decl::Attribute(d) => fd.attrs.push(d.value.value.clone()),
            }
        }
        fd
    }

    fn enumeration(&mut self, fd: &SchemaDesc, n: &EnumDecl) -> EnumDesc {
        let mut number: i32 = 0;
        let values = n
            .values
            .iter()
            .map(|v| self.enum_value(v, &mut number))
            .collect();
        EnumDesc {
            namespace: current_namespace(fd),
            name: n.name.name.clone(),
            values,
            pos: n.range.start,
        }
    }

    fn enum_value(&mut self, n: &EnumValue, number: &mut i32) -> EnumValDesc {
        if let Some(lit) = &n.value {
            match lit.as_i64_in(i64::from(i32::MIN), i64::from(i32::MAX)) {
                #[allow(clippy::cast_possible_truncation)]
                Some(v) => *number = v as i32,
                None => {
                    self.errors.report(ErrorWithPos::new(
                        self.file,
                        lit.range().start,
                        ErrorKind::ValueOutOfRange {
                            value: int_lit_text(lit),
                        },
                    ));
                    *number = 0;
                }
            }
        }
        let d = EnumValDesc {
            name: n.name.name.clone(),
            number: *number,
            pos: n.range.start,
        };
        *number = number.wrapping_add(1);
        d
    }
}

fn current_namespace(fd: &SchemaDesc) -> String {
    fd.namespaces.last().cloned().unwrap_or_default()
}

fn table(fd: &SchemaDesc, n: &TypeDecl) -> TableDesc {
    TableDesc {
        namespace: current_namespace(fd),
        name: n.name.name.clone(),
        fields: n.fields.iter().map(field).collect(),
        pos: n.range.start,
    }
}

fn strukt(fd: &SchemaDesc, n: &TypeDecl) -> StructDesc {
    StructDesc {
        namespace: current_namespace(fd),
        name: n.name.name.clone(),
        fields: n.fields.iter().map(field).collect(),
        pos: n.range.start,
    }
}

fn int_lit_text(lit: &IntLit) -> String {
    match lit {
        IntLit::Uint(n) => n.value.to_string(),
        IntLit::Signed(n) => {
            if n.negative {
                format!("-{}", n.value)
            } else {
                n.value.to_string()
            }
        }
    }
}

fn field(n: &Field) -> FieldDesc {
    let type_name = match &n.ty.ty {
        TypeRefNode::Scalar { keyword, .. } => keyword.as_str().to_owned(),
        TypeRefNode::Named(q) => q.value.clone(),
    };
    FieldDesc {
        name: n.name.name.clone(),
        type_name,
        is_vector: n.ty.vector,
        pos: n.range.start,
    }
}

fn union(fd: &SchemaDesc, n: &UnionDecl) -> UnionDesc {
    UnionDesc {
        namespace: current_namespace(fd),
        name: n.name.name.clone(),
        values: n
            .values
            .iter()
            .map(|v| UnionValDesc {
                name: v.alias.as_ref().map(|a| a.name.clone()),
                type_name: v.ty.value.clone(),
                pos: v.range.start,
            })
            .collect(),
        pos: n.range.start,
    }
}

fn rpc(fd: &SchemaDesc, n: &RpcDecl) -> RpcDesc {
    RpcDesc {
        namespace: current_namespace(fd),
        name: n.name.name.clone(),
        methods: n.methods.iter().map(method).collect(),
        pos: n.range.start,
    }
}

fn method(n: &RpcMethod) -> MethodDesc {
    let metadata = n.metadata.as_ref().map(metadata_desc);
    let mut d = MethodDesc {
        name: n.name.name.clone(),
        input_type: n.input.value.clone(),
        output_type: n.output.value.clone(),
        input: None,
        output: None,
        client_streaming: false,
        server_streaming: false,
        metadata,
        pos: n.range.start,
        input_pos: n.input.range.start,
        output_pos: n.output.range.start,
    };
    if let Some(md) = &d.metadata {
        if let Some(Some(ScalarValue::Str(v))) = md.kv.get(STREAMING) {
            match v.as_str() {
                CLIENT_STREAMING => d.client_streaming = true,
                SERVER_STREAMING => d.server_streaming = true,
                BIDI_STREAMING => {
                    d.client_streaming = true;
                    d.server_streaming = true;
                }
                _ => {}
            }
        }
    }
    d
}

fn metadata_desc(n: &Metadata) -> MetadataDesc {
    let mut d = MetadataDesc::default();
    for entry in &n.entries {
        d.kv.insert(
            entry.key.name.clone(),
            entry.value.as_ref().map(scalar_value),
        );
    }
    d
}

#[allow(clippy::cast_precision_loss)]
fn scalar_value(v: &ValueNode) -> ScalarValue {
    match v {
        ValueNode::Ident(n) => ScalarValue::Ident(n.name.clone()),
        ValueNode::CompoundIdent(q) => ScalarValue::Ident(q.value.clone()),
        ValueNode::Str(n) => ScalarValue::Str(n.value.clone()),
        ValueNode::Bool(n) => ScalarValue::Bool(n.value),
        ValueNode::Uint(n) => ScalarValue::Uint(n.value),
        ValueNode::SignedInt(n) => match v.as_i64() {
            Some(i) => ScalarValue::Int(i),
            // -(2^63)-1 and below only; keep the magnitude as a float.
            None => ScalarValue::Float(-(n.value as f64)),
        },
        ValueNode::Float(n) => ScalarValue::Float(n.value),
        ValueNode::SpecialFloat(n) => ScalarValue::Float(n.value),
        ValueNode::SignedFloat(n) => {
            ScalarValue::Float(if n.negative { -n.value } else { n.value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbs_parse::parse_schema;
    use pretty_assertions::assert_eq;

    fn lower_src(src: &str) -> (SchemaDesc, ErrorSink) {
        let schema = parse_schema("test.fbs", src).unwrap();
        let mut errors = ErrorSink::new();
        let fd = lower("test.fbs", &schema, &mut errors);
        (fd, errors)
    }

    #[test]
    fn test_simple_file() {
        let src = r#"
            include "other.fbs";
            namespace mynamespace;
            attribute "myattr";
            enum MyEnum : byte { Red, Green, Blue = 3 }
            union Any { MyTable1, MyTable2 }
            table MyTable1 { myfield1: int; myfield2: int; }
            struct MyEmptyStruct {}
            root_type MyTable1;
            file_identifier "FIDT";
            file_extension "fid";
        "#;
        let (fd, errors) = lower_src(src);
        assert!(!errors.has_error());
        assert_eq!(fd.name, "test.fbs");
        assert_eq!(fd.includes, ["other.fbs"]);
        assert_eq!(fd.namespaces, ["", "mynamespace"]);
        assert_eq!(fd.attrs, ["myattr"]);
        assert_eq!(fd.root, "MyTable1");
        assert_eq!(fd.file_ident, "FIDT");
        assert_eq!(fd.file_ext, "fid");

        let e = &fd.enums[0];
        assert_eq!(e.namespace, "mynamespace");
        assert_eq!(e.name, "MyEnum");
        let numbers: Vec<(&str, i32)> = e
            .values
            .iter()
            .map(|v| (v.name.as_str(), v.number))
            .collect();
        assert_eq!(numbers, [("Red", 0), ("Green", 1), ("Blue", 3)]);

        let u = &fd.unions[0];
        assert_eq!(u.name, "Any");
        assert_eq!(u.values[0].type_name, "MyTable1");
        assert_eq!(u.values[1].type_name, "MyTable2");
        assert_eq!(u.values[0].name, None);

        let t = &fd.tables[0];
        assert_eq!(t.namespace, "mynamespace");
        assert_eq!(t.fields[0].name, "myfield1");
        assert_eq!(t.fields[0].type_name, "int");
        assert!(!t.fields[0].is_vector);

        let s = &fd.structs[0];
        assert_eq!(s.name, "MyEmptyStruct");
        assert!(s.fields.is_empty());
    }

    #[test]
    fn test_namespace_snapshots() {
        let src = "
            namespace rpc.ns1;
            struct S1 {}
            namespace rpc.ns2;
            struct S2 {}
            table T1 { f: ns1.S1; }
        ";
        let (fd, errors) = lower_src(src);
        assert!(!errors.has_error());
        assert_eq!(fd.namespaces, ["", "rpc.ns1", "rpc.ns2"]);
        assert_eq!(fd.structs[0].namespace, "rpc.ns1");
        assert_eq!(fd.structs[1].namespace, "rpc.ns2");
        assert_eq!(fd.tables[0].namespace, "rpc.ns2");
        assert_eq!(fd.tables[0].fields[0].type_name, "ns1.S1");
    }

    #[test]
    fn test_enum_value_sequencing_after_explicit() {
        let (fd, errors) = lower_src("enum E : int { A = 5, B, C = -2, D }");
        assert!(!errors.has_error());
        let numbers: Vec<i32> = fd.enums[0].values.iter().map(|v| v.number).collect();
        assert_eq!(numbers, [5, 6, -2, -1]);
    }

    #[test]
    fn test_enum_value_out_of_range() {
        let (fd, errors) = lower_src("enum E : long { A = 2147483648, B }");
        let err = errors.first().unwrap();
        assert_eq!(
            err.to_string(),
            "test.fbs:1:21: value 2147483648 is out of range: [-2147483648,2147483647]"
        );
        // Lowering substitutes 0 and keeps counting.
        let numbers: Vec<i32> = fd.enums[0].values.iter().map(|v| v.number).collect();
        assert_eq!(numbers, [0, 1]);

        let (_, errors) = lower_src("enum E : long { A = -2147483649 }");
        assert_eq!(
            errors.first().unwrap().to_string(),
            "test.fbs:1:21: value -2147483649 is out of range: [-2147483648,2147483647]"
        );
    }

    #[test]
    fn test_vector_field_and_union_alias() {
        let (fd, errors) = lower_src(
            "table T { xs: [double]; }
             union U { alias: ns.Other }",
        );
        assert!(!errors.has_error());
        assert!(fd.tables[0].fields[0].is_vector);
        assert_eq!(fd.tables[0].fields[0].type_name, "double");
        assert_eq!(fd.unions[0].values[0].name.as_deref(), Some("alias"));
        assert_eq!(fd.unions[0].values[0].type_name, "ns.Other");
    }

    #[test]
    fn test_method_streaming_flags() {
        let src = r#"
            rpc_service Svc {
                M1(Req): Rsp;
                M2(Req): Rsp (streaming: "client");
                M3(Req): Rsp (streaming: "server");
                M4(Req): Rsp (streaming: "bidi");
                M5(Req): Rsp (streaming: "none");
            }
        "#;
        let (fd, errors) = lower_src(src);
        assert!(!errors.has_error());
        let flags: Vec<(bool, bool)> = fd.rpcs[0]
            .methods
            .iter()
            .map(|m| (m.client_streaming, m.server_streaming))
            .collect();
        assert_eq!(
            flags,
            [
                (false, false),
                (true, false),
                (false, true),
                (true, true),
                (false, false),
            ]
        );
        let m = &fd.rpcs[0].methods[0];
        assert_eq!(m.input_type, "Req");
        assert_eq!(m.output_type, "Rsp");
        assert_eq!(m.input, None);
        assert_eq!(m.output, None);
    }

    #[test]
    fn test_metadata_lowering() {
        let (fd, errors) = lower_src(
            r#"table T { f: int (id: 2, deprecated, priority: "high", ratio: -0.5); }"#,
        );
        assert!(!errors.has_error());
        // Field metadata is dropped from the descriptor; method metadata is
        // what survives, so exercise it there too.
        assert_eq!(fd.tables[0].fields[0].name, "f");

        let (fd, _) = lower_src(r#"rpc_service S { M(A): B (tag: rpc.v1, n: 3); }"#);
        let md = fd.rpcs[0].methods[0].metadata.as_ref().unwrap();
        assert_eq!(
            md.kv.get("tag"),
            Some(&Some(ScalarValue::Ident("rpc.v1".to_owned())))
        );
        assert_eq!(md.kv.get("n"), Some(&Some(ScalarValue::Uint(3))));
    }

    #[test]
    fn test_metadata_duplicate_key_last_wins() {
        let (fd, _) = lower_src(r#"rpc_service S { M(A): B (k: 1, k: 2); }"#);
        let md = fd.rpcs[0].methods[0].metadata.as_ref().unwrap();
        assert_eq!(md.kv.get("k"), Some(&Some(ScalarValue::Uint(2))));
    }

    #[test]
    fn test_empty_file() {
        let (fd, errors) = lower_src("");
        assert!(!errors.has_error());
        assert_eq!(fd.namespaces, [""]);
        assert!(fd.tables.is_empty());
    }
}
