//! Error values for every stage of the schema front end.
//!
//! All stages report through [`ErrorWithPos`]: the filename, an optional
//! source position and a closed [`ErrorKind`]. Rendering is
//! `"<file>:<line>:<col>: <message>"`, falling back to `"<file>: <message>"`
//! when no position applies (e.g. a missing include file).

mod error;
mod sink;

pub use error::{ErrorKind, ErrorWithPos, MethodDir};
pub use sink::ErrorSink;
