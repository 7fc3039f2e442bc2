//! The `SchemaParser` entry point.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::{MemoryAccessor, SchemaParser};

use super::{parse, parse_err};

#[test]
fn test_missing_file() {
    assert_eq!(
        parse_err(&[], &["this_file_does_not_exist.fbs"]),
        "cannot find file this_file_does_not_exist.fbs"
    );
}

#[test]
fn test_missing_include() {
    assert_eq!(
        parse_err(&[("a.fbs", "include \"missing.fbs\";\n")], &["a.fbs"]),
        "cannot find file missing.fbs"
    );
}

#[test]
fn test_empty_file() {
    let fds = parse(&[("e.fbs", "")], &["e.fbs"]).unwrap();
    assert_eq!(fds.len(), 1);
    let fd = &fds[0];
    assert_eq!(fd.name, "e.fbs");
    assert_eq!(fd.namespaces, [""]);
    assert!(fd.tables.is_empty());
    assert!(fd.includes.is_empty());
}

#[test]
fn test_simple_file() {
    let src = r#"
        namespace mynamespace;
        attribute "myattr";
        enum MyEnum : byte { Red, Green, Blue = 3 }
        union Any { MyTable1, MyTable2 }
        table MyTable1 { myfield1: int; myfield2: int; }
        table MyTable2 { myfield1: short; }
        struct MyEmptyStruct {}
        rpc_service MyService1 {
            MyMethod1(MyTable1): MyTable2;
            MyMethod2(MyTable2): MyTable1 (streaming: "bidi");
        }
        root_type MyTable1;
        file_identifier "FIDT";
        file_extension "fid";
    "#;
    let fds = parse(&[("simple.fbs", src)], &["simple.fbs"]).unwrap();
    let fd = &fds[0];
    assert_eq!(fd.namespaces, ["", "mynamespace"]);
    assert_eq!(fd.attrs, ["myattr"]);
    assert_eq!(fd.root, "MyTable1");
    assert_eq!(fd.file_ident, "FIDT");
    assert_eq!(fd.file_ext, "fid");

    let rpc = &fd.rpcs[0];
    assert_eq!(rpc.namespace, "mynamespace");
    let m = &rpc.methods[0];
    assert_eq!(m.input_type, ".mynamespace.MyTable1");
    assert_eq!(m.output_type, ".mynamespace.MyTable2");
    assert!(!m.client_streaming);
    assert!(!m.server_streaming);
    let m = &rpc.methods[1];
    assert!(m.client_streaming);
    assert!(m.server_streaming);
}

#[test]
fn test_syntax_error_surfaces() {
    let err = parse_err(&[("bad.fbs", "table {}\n")], &["bad.fbs"]);
    assert!(err.contains("syntax error"), "got: {err}");
}

#[test]
fn test_error_in_included_file_surfaces() {
    let files = [
        ("a.fbs", "include \"bad.fbs\";\ntable T { f: int; }\n"),
        ("bad.fbs", "table {}\n"),
    ];
    let err = parse_err(&files, &["a.fbs"]);
    assert!(err.starts_with("bad.fbs:"), "got: {err}");
    assert!(err.contains("syntax error"), "got: {err}");
}

#[test]
fn test_nonrecursive_skips_includes() {
    let mut acc = MemoryAccessor::new();
    acc.add("a.fbs", "include \"bad.fbs\";\ntable T { f: int; }\n");
    acc.add("bad.fbs", "table {}\n");
    let mut p = SchemaParser::with_accessor(acc, Vec::new());
    p.set_recursive(false);
    let fds = p.parse_files(&["a.fbs"]).unwrap();
    assert_eq!(fds.len(), 1);
    assert_eq!(fds[0].includes, ["bad.fbs"]);
    assert!(fds[0].dependencies.is_empty());
}

#[test]
fn test_recursive_records_dependencies() {
    let files = [
        ("a.fbs", "include \"b.fbs\";\ninclude \"c.fbs\";\n"),
        ("b.fbs", "table TB {}\n"),
        ("c.fbs", "table TC {}\n"),
    ];
    let fds = parse(&files, &["a.fbs"]).unwrap();
    assert_eq!(fds[0].dependencies, ["b.fbs", "c.fbs"]);
}

#[test]
fn test_duplicate_requests_share_descriptor() {
    let fds = parse(&[("a.fbs", "table T {}\n")], &["a.fbs", "a.fbs"]).unwrap();
    assert_eq!(fds.len(), 2);
    assert!(Arc::ptr_eq(&fds[0], &fds[1]));
}

#[test]
fn test_diamond_include_parses_once() {
    let files = [
        ("a.fbs", "include \"b.fbs\";\ninclude \"c.fbs\";\ntable TA { f: TD; }\n"),
        ("b.fbs", "include \"d.fbs\";\n"),
        ("c.fbs", "include \"d.fbs\";\n"),
        ("d.fbs", "table TD {}\n"),
    ];
    let fds = parse(&files, &["a.fbs", "d.fbs"]).unwrap();
    assert_eq!(fds[0].dependencies, ["b.fbs", "c.fbs"]);
    assert_eq!(fds[0].tables[0].fields[0].type_name, ".TD");
    // The requested d.fbs is the same parse as the one reached through the
    // includes.
    assert_eq!(fds[1].name, "d.fbs");
    assert_eq!(fds[1].tables[0].name, "TD");
}

#[test]
fn test_include_paths_are_search_prefixes() {
    let mut acc = MemoryAccessor::new();
    acc.add("a.fbs", "include \"b.fbs\";\ntable T { f: TB; }\n");
    acc.add("sub/b.fbs", "table TB {}\n");
    let p = SchemaParser::with_accessor(acc, vec!["sub".to_owned()]);
    let fds = p.parse_files(&["a.fbs"]).unwrap();
    assert_eq!(fds[0].tables[0].fields[0].type_name, ".TB");
}

#[test]
fn test_requested_file_directory_is_searched() {
    let mut acc = MemoryAccessor::new();
    acc.add("dir/a.fbs", "include \"b.fbs\";\ntable T { f: TB; }\n");
    acc.add("dir/b.fbs", "table TB {}\n");
    let fds = SchemaParser::with_accessor(acc, Vec::new())
        .parse_files(&["dir/a.fbs"])
        .unwrap();
    assert_eq!(fds[0].name, "dir/a.fbs");
    assert_eq!(fds[0].tables[0].fields[0].type_name, ".TB");
}

#[test]
fn test_lexical_error_position() {
    let err = parse_err(&[("bad.fbs", "table T { f: int; } \"\\H\"\n")], &["bad.fbs"]);
    assert_eq!(err, "bad.fbs:1:21: invalid escape sequence: \\H");
}
