//! Error codes for the hl7tree diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Framing and header errors
//! - `E1xx` - Element construction errors
//! - `E2xx` - Structure and binding errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Framing Errors (E0xx)
    // =========================================================================
    /// Malformed header.
    ///
    /// The header line ends before all five delimiters are declared.
    E001,

    // =========================================================================
    // Element Errors (E1xx)
    // =========================================================================
    /// Unknown element code.
    ///
    /// The code of a line has no layout in the schema catalog.
    E100,

    /// Unknown level.
    ///
    /// The code of a line has no positive level in the level table.
    E101,

    /// Segment code mismatch.
    ///
    /// A mapping used to build an element names a different element code.
    E102,

    // =========================================================================
    // Structure Errors (E2xx)
    // =========================================================================
    /// Structure mismatch.
    ///
    /// Walking up the ancestors of the previous element to place a shallower
    /// one ran past the message root.
    E200,

    /// Mapping shape mismatch.
    ///
    /// A composite field was given a scalar, or a leaf field a mapping.
    E201,

    /// Unknown field path.
    ///
    /// A field path does not name a node of the segment layout.
    E202,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed header",
            ErrorCode::E100 => "unknown element code",
            ErrorCode::E101 => "unknown level",
            ErrorCode::E102 => "segment code mismatch",
            ErrorCode::E200 => "structure mismatch",
            ErrorCode::E201 => "mapping shape mismatch",
            ErrorCode::E202 => "unknown field path",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "malformed header");
        assert_eq!(ErrorCode::E101.description(), "unknown level");
        assert_eq!(ErrorCode::E200.description(), "structure mismatch");
    }
}
