//! The front-end entry point: files in, linked descriptors out.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use fbs_desc::SchemaDesc;
use fbs_diagnostic::{ErrorKind, ErrorSink, ErrorWithPos};
use fbs_parse::parse_schema;

use crate::accessor::{FileAccessor, FsAccessor};
use crate::linker::link;

/// Parses `.fbs` files into linked schema descriptors.
///
/// Include directives are searched for under `include_paths`, the current
/// directory, and the directories of the requested files. With `recursive`
/// set (the default) included files are parsed too, depth-first in
/// declaration order, and recorded as dependencies of the including file.
pub struct SchemaParser<A = FsAccessor> {
    accessor: A,
    pub include_paths: Vec<String>,
    pub recursive: bool,
}

impl SchemaParser<FsAccessor> {
    /// A filesystem-backed parser with the given include paths.
    pub fn new(include_paths: impl IntoIterator<Item = String>) -> Self {
        SchemaParser::with_accessor(FsAccessor, include_paths)
    }
}

impl<A: FileAccessor> SchemaParser<A> {
    /// A parser reading through `accessor` instead of the filesystem.
    pub fn with_accessor(accessor: A, include_paths: impl IntoIterator<Item = String>) -> Self {
        SchemaParser {
            accessor,
            include_paths: include_paths.into_iter().collect(),
            recursive: true,
        }
    }

    /// Configures whether includes are parsed too.
    pub fn set_recursive(&mut self, recursive: bool) -> &mut Self {
        self.recursive = recursive;
        self
    }

    /// Parses and links `filenames`, returning one descriptor per requested
    /// name in request order. Duplicate names share the same `Arc`. The
    /// first error anywhere in the pipeline aborts the whole run.
    pub fn parse_files(&self, filenames: &[&str]) -> Result<Vec<Arc<SchemaDesc>>, ErrorWithPos> {
        let mut run = Run {
            accessor: &self.accessor,
            paths: extend_paths(&self.include_paths, filenames),
            recursive: self.recursive,
            results: FxHashMap::default(),
            order: Vec::new(),
        };
        for name in filenames {
            run.parse_file(name)?;
        }
        let files = run
            .order
            .iter()
            .filter_map(|name| run.results.remove(name))
            .collect();
        let linked = link(files)?;
        let mut out = Vec::with_capacity(filenames.len());
        for name in filenames {
            if let Some(fd) = linked.get(name) {
                out.push(fd);
            }
        }
        Ok(out)
    }
}

/// State for one `parse_files` invocation.
struct Run<'a, A> {
    accessor: &'a A,
    paths: Vec<String>,
    recursive: bool,
    results: FxHashMap<String, SchemaDesc>,
    order: Vec<String>,
}

impl<A: FileAccessor> Run<'_, A> {
    /// Parses one file and, recursively, its includes. A name already
    /// parsed this run is skipped, so a diamond include graph yields one
    /// descriptor per file.
    fn parse_file(&mut self, name: &str) -> Result<(), ErrorWithPos> {
        if self.results.contains_key(name) {
            return Ok(());
        }
        debug!(file = %name, "parsing");
        let src = self.open(name)?;
        let schema = parse_schema(name, &src)?;
        let mut errors = ErrorSink::new();
        let fd = fbs_desc::lower(name, &schema, &mut errors);
        let fd = errors.finish(fd)?;
        let includes = fd.includes.clone();
        self.results.insert(name.to_owned(), fd);
        self.order.push(name.to_owned());
        if self.recursive {
            for incl in includes {
                self.parse_file(&incl)?;
                if let Some(fd) = self.results.get_mut(name) {
                    fd.dependencies.push(incl);
                }
            }
        }
        Ok(())
    }

    /// Reads a file, trying every search path as a prefix.
    fn open(&self, name: &str) -> Result<String, ErrorWithPos> {
        for path in &self.paths {
            let joined = if path.is_empty() {
                name.to_owned()
            } else {
                Path::new(path).join(name).to_string_lossy().into_owned()
            };
            if let Some(src) = self.accessor.read(&joined) {
                return Ok(src);
            }
        }
        Err(ErrorWithPos::unpositioned(
            "",
            ErrorKind::FileNotFound {
                name: name.to_owned(),
            },
        ))
    }
}

/// The effective search paths: the configured include paths, the current
/// directory, and the directory part of each requested filename.
fn extend_paths(paths: &[String], filenames: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = paths.to_vec();
    out.push(String::new());
    for filename in filenames {
        if let Some(idx) = filename.rfind('/') {
            let prefix = &filename[..=idx];
            if !out.iter().any(|p| p == prefix) {
                out.push(prefix.to_owned());
            }
        }
    }
    let mut seen = rustc_hash::FxHashSet::default();
    out.retain(|p| seen.insert(p.clone()));
    out
}
