//! Failures gathered while parsing a blob.
//!
//! Messages in a blob are independent, so one failing message does not stop
//! the next. Each failure is filed under the position of its message and the
//! lot becomes a single [`ParseError`] at the end.

use log::debug;

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    failures: Vec<(usize, Diagnostic)>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// File the diagnostic that stopped message `message` of the blob.
    ///
    /// Warnings do not fail a message and are dropped here.
    pub fn emit(&mut self, message: usize, diagnostic: Diagnostic) {
        if !diagnostic.severity().is_error() {
            return;
        }
        debug!(message = message, code:? = diagnostic.code(); "Message failed");
        self.failures.push((message, diagnostic));
    }

    /// `Err` with every filed failure, or `Ok` if every message parsed.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ParseError::from_failures(self.failures))
        }
    }
}
