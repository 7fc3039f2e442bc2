//! File access behind a trait so tests can run without a filesystem.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

/// Opens schema files by name. The parser tries each search path as a
/// prefix, so implementations only see already-joined names.
pub trait FileAccessor {
    /// The file's contents, or `None` when it does not exist here.
    fn read(&self, name: &str) -> Option<String>;
}

/// The filesystem accessor used by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsAccessor;

impl FileAccessor for FsAccessor {
    fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(Path::new(name)).ok()
    }
}

/// An in-memory accessor: a map from filename to source text.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccessor {
    files: FxHashMap<String, String>,
}

impl MemoryAccessor {
    pub fn new() -> Self {
        MemoryAccessor::default()
    }

    /// Add one file, replacing any previous content under the same name.
    pub fn add(&mut self, name: &str, src: &str) -> &mut Self {
        self.files.insert(name.to_owned(), src.to_owned());
        self
    }
}

impl FileAccessor for MemoryAccessor {
    fn read(&self, name: &str) -> Option<String> {
        self.files.get(name).cloned()
    }
}
