//! First-error-wins collection.

use crate::error::ErrorWithPos;

/// Collects errors from a pass that keeps going after the first failure.
///
/// Only the first reported error is kept; later reports are dropped. This
/// matches the front end's contract that a failing parse surfaces exactly
/// one error.
#[derive(Clone, Debug, Default)]
pub struct ErrorSink {
    first: Option<ErrorWithPos>,
}

impl ErrorSink {
    pub fn new() -> Self {
        ErrorSink::default()
    }

    /// Record `err` unless an earlier error is already held.
    pub fn report(&mut self, err: ErrorWithPos) {
        if self.first.is_none() {
            self.first = Some(err);
        }
    }

    pub fn has_error(&self) -> bool {
        self.first.is_some()
    }

    pub fn first(&self) -> Option<&ErrorWithPos> {
        self.first.as_ref()
    }

    /// Consume the sink, yielding the first error if any was reported.
    pub fn take(self) -> Option<ErrorWithPos> {
        self.first
    }

    /// `Ok(value)` if nothing was reported, the first error otherwise.
    pub fn finish<T>(self, value: T) -> Result<T, ErrorWithPos> {
        match self.first {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }
}
