//! How bad a diagnostic is.

use std::fmt;

/// Whether a diagnostic stopped a message or only marked a repaired value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The message (or the segment being built) was rejected.
    Error,

    /// A mapping value did not fit its field and was replaced by the
    /// diagnostic text; the segment was still built.
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}
