//! Linker and entry-point integration tests.
//!
//! Tests are organized into modules by category:
//! - `linker`: symbol pooling, duplicate detection, scope resolution
//! - `parser`: the `SchemaParser` entry point over an in-memory accessor

use std::sync::Arc;

use fbs_desc::SchemaDesc;
use fbs_diagnostic::{ErrorSink, ErrorWithPos};

use crate::{MemoryAccessor, SchemaParser};

mod parser;

/// Parses and links `names` against an in-memory file set.
fn parse(
    files: &[(&str, &str)],
    names: &[&str],
) -> Result<Vec<Arc<SchemaDesc>>, ErrorWithPos> {
    let mut acc = MemoryAccessor::new();
    for (name, src) in files {
        acc.add(name, src);
    }
    SchemaParser::with_accessor(acc, Vec::new()).parse_files(names)
}

/// Parses and lowers one file, panicking on any error.
fn lower_file(name: &str, src: &str) -> SchemaDesc {
    let schema = fbs_parse::parse_schema(name, src).unwrap();
    let mut errors = ErrorSink::new();
    let fd = fbs_desc::lower(name, &schema, &mut errors);
    errors.finish(fd).unwrap()
}

/// The error message produced by parsing and linking `files`.
fn parse_err(files: &[(&str, &str)], names: &[&str]) -> String {
    match parse(files, names) {
        Ok(_) => panic!("expected an error"),
        Err(err) => err.to_string(),
    }
}
