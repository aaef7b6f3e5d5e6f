//! Failures of [`parse`](crate::parse) and [`parse_all`](crate::parse_all).
//!
//! A message stops at its first structural problem, so it fails with exactly
//! one diagnostic. A blob keeps going past a failing message, and the error
//! remembers which messages of the blob failed.

use std::fmt;

use crate::error::Diagnostic;

/// One or more messages that could not be parsed.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
    /// Position in the blob of the message each diagnostic belongs to.
    messages: Vec<usize>,
}

impl ParseError {
    /// Failures of a blob, as `(message index, diagnostic)` pairs in blob order.
    pub fn from_failures(failures: impl IntoIterator<Item = (usize, Diagnostic)>) -> Self {
        let (messages, diagnostics) = failures.into_iter().unzip();
        Self {
            diagnostics,
            messages,
        }
    }

    /// One diagnostic per failing message.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Zero-based positions of the failing messages in the blob.
    pub fn failed_messages(&self) -> &[usize] {
        &self.messages
    }

    /// Each diagnostic with the position of its message.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &Diagnostic)> {
        self.messages.iter().copied().zip(&self.diagnostics)
    }

    /// `true` when the failure cannot be told apart from a single-message
    /// parse: one diagnostic, belonging to the first message.
    pub fn is_single(&self) -> bool {
        self.messages == [0]
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((message, first)) = self.failures().next() else {
            return Ok(());
        };
        if self.is_single() {
            return write!(f, "{first}");
        }
        write!(f, "message {}: {first}", message + 1)?;
        if self.diagnostics.len() > 1 {
            write!(f, " (+{} more failed)", self.diagnostics.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::from_failures([(0, diagnostic)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_single_message() {
        let err = ParseError::from(
            Diagnostic::error("header line is too short").with_code(ErrorCode::E001),
        );

        assert!(err.is_single());
        assert_eq!(err.failed_messages(), &[0]);
        assert_eq!(err.to_string(), "error[E001]: header line is too short");
    }

    #[test]
    fn test_blob_failures_name_their_message() {
        let err = ParseError::from_failures([
            (1, Diagnostic::error("unknown element code `ZZZ`").with_code(ErrorCode::E100)),
            (4, Diagnostic::error("unknown element code `QQQ`").with_code(ErrorCode::E100)),
        ]);

        assert!(!err.is_single());
        assert_eq!(err.failed_messages(), &[1, 4]);
        assert_eq!(
            err.to_string(),
            "message 2: error[E100]: unknown element code `ZZZ` (+1 more failed)"
        );
    }

    #[test]
    fn test_later_message_alone_is_not_single() {
        let err = ParseError::from_failures([(2, Diagnostic::error("no ancestor"))]);

        assert_eq!(err.to_string(), "message 3: error: no ancestor");
        let (message, diagnostic) = err.failures().next().unwrap();
        assert_eq!(message, 2);
        assert_eq!(diagnostic.message(), "no ancestor");
    }
}
