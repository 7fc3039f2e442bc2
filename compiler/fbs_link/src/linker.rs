//! Two-phase linker over lowered schema descriptors.
//!
//! Phase one pools every symbol under its fully-qualified name and rejects
//! duplicates, first within each file and then across the whole file set.
//! Phase two resolves the type references in table/struct fields and rpc
//! method signatures against the pools, rewriting them to `.a.b.Name` form.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use fbs_desc::{
    all_namespaces, ns_prefix, DescKind, FieldDesc, SchemaDesc, TypeRef,
};
use fbs_diagnostic::{ErrorKind, ErrorWithPos, MethodDir};
use fbs_ir::{Keyword, Position};

/// Links a set of lowered files, given in parse order.
///
/// Returns the linked descriptors keyed by filename, or the first error.
pub fn link(files: Vec<SchemaDesc>) -> Result<LinkedSchemas, ErrorWithPos> {
    Linker::new(files)?.run()
}

/// The linker's output: one linked descriptor per file, plus which
/// includes went unused during resolution.
#[derive(Clone, Debug, Default)]
pub struct LinkedSchemas {
    schemas: FxHashMap<String, Arc<SchemaDesc>>,
    unused: FxHashMap<String, Vec<String>>,
}

impl LinkedSchemas {
    pub fn get(&self, name: &str) -> Option<Arc<SchemaDesc>> {
        self.schemas.get(name).cloned()
    }

    /// The includes of `name` that resolution never needed, in include
    /// order. Unused includes are reported, never an error.
    pub fn unused_includes(&self, name: &str) -> &[String] {
        self.unused.get(name).map_or(&[], Vec::as_slice)
    }
}

/// A pooled symbol.
#[derive(Copy, Clone, Debug)]
struct Symbol {
    kind: DescKind,
    pos: Position,
}

/// Per-file symbol pool and resolution context.
struct FilePool {
    symbols: FxHashMap<String, Symbol>,
    /// Every namespace the file declares, plus all dotted prefixes.
    namespaces: FxHashSet<String>,
    includes: Vec<String>,
    /// Scope prefixes for the unqualified-name walk, most specific first,
    /// `""` included.
    prefixes: Vec<String>,
}

/// What a name lookup landed on.
enum Found {
    Symbol { kind: DescKind, file: String },
    /// The name is a namespace prefix with no symbol defined there. This
    /// still stops the scope walk; the caller reports it as unresolved.
    Namespace,
}

struct Linker {
    order: Vec<String>,
    files: FxHashMap<String, SchemaDesc>,
    pools: FxHashMap<String, FilePool>,
    used: FxHashMap<String, FxHashSet<String>>,
}

impl Linker {
    /// Builds the per-file pools, failing on a duplicate within a file.
    fn new(files: Vec<SchemaDesc>) -> Result<Linker, ErrorWithPos> {
        let mut linker = Linker {
            order: files.iter().map(|fd| fd.name.clone()).collect(),
            files: FxHashMap::default(),
            pools: FxHashMap::default(),
            used: FxHashMap::default(),
        };
        for fd in files {
            let pool = build_pool(&fd)?;
            linker.pools.insert(fd.name.clone(), pool);
            linker.files.insert(fd.name.clone(), fd);
        }
        Ok(linker)
    }

    fn run(mut self) -> Result<LinkedSchemas, ErrorWithPos> {
        debug!(files = self.order.len(), "linking");
        self.check_cross_file_duplicates()?;
        self.resolve_references()?;
        let mut out = LinkedSchemas::default();
        for (name, fd) in self.files {
            let used = self.used.get(&name);
            let unused: Vec<String> = fd
                .includes
                .iter()
                .filter(|incl| !used.is_some_and(|u| u.contains(*incl)))
                .cloned()
                .collect();
            out.unused.insert(name.clone(), unused);
            out.schemas.insert(name, Arc::new(fd));
        }
        Ok(out)
    }

    /// Merges all pools, rejecting a symbol defined in two files. Keys are
    /// visited in sorted order per file so the reported collision does not
    /// depend on map iteration; the error points at the symbol in the
    /// lexicographically larger file and names the smaller one.
    fn check_cross_file_duplicates(&self) -> Result<(), ErrorWithPos> {
        let mut global: FxHashMap<&str, (&str, DescKind)> = FxHashMap::default();
        for name in &self.order {
            let Some(pool) = self.pools.get(name) else {
                continue;
            };
            let mut keys: Vec<&String> = pool.symbols.keys().collect();
            keys.sort_unstable();
            for fqn in keys {
                let sym = pool.symbols[fqn.as_str()];
                if let Some(&(first_file, first_kind)) = global.get(fqn.as_str()) {
                    return Err(self.duplicate_across_files(
                        fqn,
                        (first_file, first_kind),
                        (name.as_str(), sym.kind),
                    ));
                }
                global.insert(fqn.as_str(), (name.as_str(), sym.kind));
            }
        }
        Ok(())
    }

    fn duplicate_across_files(
        &self,
        fqn: &str,
        first: (&str, DescKind),
        second: (&str, DescKind),
    ) -> ErrorWithPos {
        let (first, second) = if second.0 < first.0 {
            (second, first)
        } else {
            (first, second)
        };
        let pos = self
            .pools
            .get(second.0)
            .and_then(|p| p.symbols.get(fqn))
            .map_or_else(Position::default, |s| s.pos);
        ErrorWithPos::new(
            second.0,
            pos,
            ErrorKind::DuplicateSymbol {
                symbol: fqn.to_owned(),
                existing_kind: first.1.as_str(),
                existing_file: Some(first.0.to_owned()),
            },
        )
    }

    fn resolve_references(&mut self) -> Result<(), ErrorWithPos> {
        for name in self.order.clone() {
            let Some(mut fd) = self.files.remove(&name) else {
                continue;
            };
            debug!(file = %name, "resolving references");
            let result = self.resolve_file(&name, &mut fd);
            self.files.insert(name, fd);
            result?;
        }
        Ok(())
    }

    fn resolve_file(&mut self, file: &str, fd: &mut SchemaDesc) -> Result<(), ErrorWithPos> {
        for table in &mut fd.tables {
            let prefix = format!("{}{}.", ns_prefix(&table.namespace), table.name);
            for field in &mut table.fields {
                self.resolve_field(file, &prefix, field)?;
            }
        }
        for s in &mut fd.structs {
            let prefix = format!("{}{}.", ns_prefix(&s.namespace), s.name);
            for field in &mut s.fields {
                self.resolve_field(file, &prefix, field)?;
            }
        }
        for rpc in &mut fd.rpcs {
            let svc = format!("{}{}", ns_prefix(&rpc.namespace), rpc.name);
            for m in &mut rpc.methods {
                let (ty, re) = self.resolve_method_type(
                    file,
                    &svc,
                    &m.name,
                    MethodDir::Request,
                    &m.input_type,
                    m.input_pos,
                )?;
                m.input_type = ty;
                m.input = Some(re);
                let (ty, re) = self.resolve_method_type(
                    file,
                    &svc,
                    &m.name,
                    MethodDir::Response,
                    &m.output_type,
                    m.output_pos,
                )?;
                m.output_type = ty;
                m.output = Some(re);
            }
        }
        Ok(())
    }

    fn resolve_field(
        &mut self,
        file: &str,
        prefix: &str,
        field: &mut FieldDesc,
    ) -> Result<(), ErrorWithPos> {
        // Built-in type names are not references.
        if Keyword::lookup(&field.type_name).is_some() {
            return Ok(());
        }
        let context = format!("field {prefix}{}", field.name);
        match self.resolve(file, &field.type_name) {
            None => Err(ErrorWithPos::new(
                file,
                field.pos,
                ErrorKind::UnknownType {
                    context,
                    dir: None,
                    name: field.type_name.clone(),
                },
            )),
            Some((fqn, Found::Namespace)) => Err(ErrorWithPos::new(
                file,
                field.pos,
                ErrorKind::MissingSymbol {
                    context,
                    dir: None,
                    name: field.type_name.clone(),
                    resolved: fqn,
                },
            )),
            Some((fqn, Found::Symbol { kind, .. })) => match kind {
                DescKind::Table | DescKind::Struct | DescKind::Enum | DescKind::Union => {
                    field.type_name = format!(".{fqn}");
                    Ok(())
                }
                _ => Err(ErrorWithPos::new(
                    file,
                    field.pos,
                    ErrorKind::InvalidFieldType {
                        context,
                        fqn,
                        actual: kind.as_str(),
                    },
                )),
            },
        }
    }

    fn resolve_method_type(
        &mut self,
        file: &str,
        svc: &str,
        method: &str,
        dir: MethodDir,
        type_name: &str,
        pos: Position,
    ) -> Result<(String, TypeRef), ErrorWithPos> {
        let context = format!("method {svc}.{method}");
        match self.resolve(file, type_name) {
            None => Err(ErrorWithPos::new(
                file,
                pos,
                ErrorKind::UnknownType {
                    context,
                    dir: Some(dir),
                    name: type_name.to_owned(),
                },
            )),
            Some((fqn, Found::Namespace)) => Err(ErrorWithPos::new(
                file,
                pos,
                ErrorKind::MissingSymbol {
                    context,
                    dir: Some(dir),
                    name: type_name.to_owned(),
                    resolved: fqn,
                },
            )),
            Some((fqn, Found::Symbol { kind, file: def })) => {
                if kind == DescKind::Table {
                    Ok((format!(".{fqn}"), TypeRef { file: def, fqn }))
                } else {
                    Err(ErrorWithPos::new(
                        file,
                        pos,
                        ErrorKind::InvalidMethodType {
                            context,
                            dir,
                            fqn,
                            actual: kind.as_str(),
                        },
                    ))
                }
            }
        }
    }

    /// Resolves a type reference as written in source. A leading dot means
    /// fully qualified; otherwise the file's scope prefixes are walked from
    /// the most specific namespace outwards, probing the first dotted
    /// segment and then the full name at each level. The walk stops at the
    /// first hit, type or not.
    fn resolve(&mut self, file: &str, name: &str) -> Option<(String, Found)> {
        if let Some(rest) = name.strip_prefix('.') {
            let hit = self.find_symbol(file, file, rest, &mut FxHashSet::default())?;
            return Some((rest.to_owned(), hit));
        }
        let first = match name.find('.') {
            Some(i) if i > 0 => &name[..i],
            _ => name,
        };
        let prefixes = self.pools.get(file)?.prefixes.clone();
        for prefix in &prefixes {
            let (probe, full) = if prefix.is_empty() {
                (name.to_owned(), name.to_owned())
            } else {
                (format!("{prefix}.{first}"), format!("{prefix}.{name}"))
            };
            let Some(hit) = self.find_symbol(file, file, &probe, &mut FxHashSet::default())
            else {
                continue;
            };
            if probe == full {
                return Some((full, hit));
            }
            if let Some(hit) = self.find_symbol(file, file, &full, &mut FxHashSet::default()) {
                return Some((full, hit));
            }
        }
        None
    }

    /// Looks `name` up in `file`'s pool, then depth-first through its
    /// includes. Includes that led to a hit are marked used for `entry`.
    fn find_symbol(
        &mut self,
        entry: &str,
        file: &str,
        name: &str,
        checked: &mut FxHashSet<String>,
    ) -> Option<Found> {
        if !checked.insert(file.to_owned()) {
            return None;
        }
        let pool = self.pools.get(file)?;
        if let Some(sym) = pool.symbols.get(name) {
            return Some(Found::Symbol {
                kind: sym.kind,
                file: file.to_owned(),
            });
        }
        if pool.namespaces.contains(name) {
            return Some(Found::Namespace);
        }
        let includes = pool.includes.clone();
        for incl in includes {
            // Absent under non-recursive parsing.
            if !self.pools.contains_key(&incl) {
                continue;
            }
            if let Some(found) = self.find_symbol(entry, &incl, name, checked) {
                self.mark_used(entry, &incl);
                return Some(found);
            }
        }
        None
    }

    fn mark_used(&mut self, entry: &str, include: &str) {
        self.used
            .entry(entry.to_owned())
            .or_default()
            .insert(include.to_owned());
    }
}

/// Pools one file's symbols, rejecting in-file duplicates.
fn build_pool(fd: &SchemaDesc) -> Result<FilePool, ErrorWithPos> {
    let mut pool = FilePool {
        symbols: FxHashMap::default(),
        namespaces: all_namespaces(&fd.namespaces),
        includes: fd.includes.clone(),
        prefixes: create_prefixes(&fd.namespaces),
    };
    for (fqn, kind, pos) in collect_symbols(fd) {
        if let Some(existing) = pool.symbols.get(&fqn) {
            return Err(ErrorWithPos::new(
                &fd.name,
                pos,
                ErrorKind::DuplicateSymbol {
                    symbol: fqn,
                    existing_kind: existing.kind.as_str(),
                    existing_file: None,
                },
            ));
        }
        pool.symbols.insert(fqn, Symbol { kind, pos });
    }
    Ok(pool)
}

/// Every pooled symbol of a file in declaration order: types under their
/// namespace, fields under their type, enum values at the enum's namespace
/// scope, methods under their service.
fn collect_symbols(fd: &SchemaDesc) -> Vec<(String, DescKind, Position)> {
    let mut out = Vec::new();
    for t in &fd.tables {
        let fqn = format!("{}{}", ns_prefix(&t.namespace), t.name);
        out.push((fqn.clone(), DescKind::Table, t.pos));
        for f in &t.fields {
            out.push((format!("{fqn}.{}", f.name), DescKind::Field, f.pos));
        }
    }
    for s in &fd.structs {
        let fqn = format!("{}{}", ns_prefix(&s.namespace), s.name);
        out.push((fqn.clone(), DescKind::Struct, s.pos));
        for f in &s.fields {
            out.push((format!("{fqn}.{}", f.name), DescKind::Field, f.pos));
        }
    }
    for e in &fd.enums {
        let prefix = ns_prefix(&e.namespace);
        out.push((format!("{prefix}{}", e.name), DescKind::Enum, e.pos));
        for v in &e.values {
            out.push((format!("{prefix}{}", v.name), DescKind::EnumVal, v.pos));
        }
    }
    for u in &fd.unions {
        out.push((format!("{}{}", ns_prefix(&u.namespace), u.name), DescKind::Union, u.pos));
    }
    for r in &fd.rpcs {
        let fqn = format!("{}{}", ns_prefix(&r.namespace), r.name);
        out.push((fqn.clone(), DescKind::Rpc, r.pos));
        for m in &r.methods {
            out.push((format!("{fqn}.{}", m.name), DescKind::Method, m.pos));
        }
    }
    out
}

/// The scope prefixes for unqualified lookup: the declared namespaces in
/// reverse declaration order, each followed by its dotted ancestors, all
/// deduplicated. The leading `""` entry of the namespace list lands last.
fn create_prefixes(namespaces: &[String]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut prefixes = Vec::new();
    for ns in namespaces.iter().rev() {
        if seen.insert(ns.clone()) {
            prefixes.push(ns.clone());
        }
        for (i, c) in ns.char_indices().rev() {
            if c == '.' {
                let ancestor = &ns[..i];
                if seen.insert(ancestor.to_owned()) {
                    prefixes.push(ancestor.to_owned());
                }
            }
        }
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_prefixes() {
        let nss = vec![
            String::new(),
            "namespace2".to_owned(),
            "rpc.app.server".to_owned(),
        ];
        assert_eq!(
            create_prefixes(&nss),
            ["rpc.app.server", "rpc.app", "rpc", "namespace2", ""]
        );
    }

    #[test]
    fn test_create_prefixes_dedups() {
        let nss = vec![
            String::new(),
            "rpc.app".to_owned(),
            "rpc.app.server".to_owned(),
        ];
        assert_eq!(create_prefixes(&nss), ["rpc.app.server", "rpc.app", "rpc", ""]);
    }
}
