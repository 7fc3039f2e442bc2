//! Linking and the schema-parsing entry point for the FBS front end.
//!
//! [`SchemaParser`] drives the whole pipeline: open files, lex, parse,
//! lower, then [`link`] everything into descriptors with all type
//! references rewritten to fully-qualified `.a.b.Name` form.

mod accessor;
mod linker;
mod parser;

pub use accessor::{FileAccessor, FsAccessor, MemoryAccessor};
pub use linker::{link, LinkedSchemas};
pub use parser::SchemaParser;

#[cfg(test)]
mod tests;
