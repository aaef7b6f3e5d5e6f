//! Per-message delimiter tuple.
//!
//! Every message declares its own delimiters in the header line, directly
//! after the header code:
//!
//! ```text
//! MSH|^~\&|SENDER|...
//!    ^^^^^
//!    field, component, subcomponent, repetition, escape
//! ```
//!
//! The tuple is positional: the character at depth `n` joins the children of
//! every field node sitting `n` levels below a segment root. Two messages in
//! the same blob may declare different delimiters, so a [`Delimiters`] value
//! is resolved per message and passed explicitly to everything that builds
//! or serializes nodes.

use std::fmt;

use thiserror::Error;

/// The code every header line starts with.
pub const HEADER_CODE: &str = "MSH";

/// Number of delimiter characters declared by a header line.
pub const DELIMITER_COUNT: usize = 5;

/// Character offset of the first delimiter inside the header line.
const FIRST_DELIMITER_OFFSET: usize = 3;

/// Minimum header length in characters: the code plus all five delimiters.
pub const MIN_HEADER_LEN: usize = FIRST_DELIMITER_OFFSET + DELIMITER_COUNT;

/// Errors raised while reading delimiters from a header line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelimiterError {
    #[error("header line has {found} characters, at least {} are required", MIN_HEADER_LEN)]
    TooShort { found: usize },

    #[error("header line does not start with `{}`", HEADER_CODE)]
    NotAHeader,
}

/// The ordered delimiter tuple `[field, component, subcomponent, repetition, escape]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiters([char; DELIMITER_COUNT]);

impl Delimiters {
    /// Creates a delimiter tuple from its five characters, in depth order.
    pub fn new(chars: [char; DELIMITER_COUNT]) -> Self {
        Self(chars)
    }

    /// Reads the delimiter tuple from a header line.
    ///
    /// # Errors
    ///
    /// Returns [`DelimiterError::NotAHeader`] if the line does not begin with
    /// [`HEADER_CODE`], or [`DelimiterError::TooShort`] if it ends before all
    /// five delimiters were declared.
    ///
    /// # Examples
    ///
    /// ```
    /// use hl7tree_core::delimiters::Delimiters;
    ///
    /// let delimiters = Delimiters::from_header("MSH|^~\\&|LAB").unwrap();
    /// assert_eq!(delimiters.field(), '|');
    /// assert_eq!(delimiters.component(), '^');
    /// assert_eq!(delimiters.escape(), '&');
    /// ```
    pub fn from_header(line: &str) -> Result<Self, DelimiterError> {
        if !line.starts_with(HEADER_CODE) {
            return Err(DelimiterError::NotAHeader);
        }

        let mut declared = line.chars().skip(FIRST_DELIMITER_OFFSET);
        let mut chars = [' '; DELIMITER_COUNT];
        for slot in &mut chars {
            *slot = declared.next().ok_or_else(|| DelimiterError::TooShort {
                found: line.chars().count(),
            })?;
        }

        Ok(Self(chars))
    }

    /// Returns the delimiter joining the children of nodes at `depth`.
    ///
    /// Depths past the escape character fall back to the escape character;
    /// catalogs are validated so that no composite sits that deep.
    pub fn at(&self, depth: usize) -> char {
        self.0[depth.min(DELIMITER_COUNT - 1)]
    }

    /// The field separator (depth 0).
    pub fn field(&self) -> char {
        self.0[0]
    }

    /// The component separator (depth 1).
    pub fn component(&self) -> char {
        self.0[1]
    }

    /// The subcomponent separator (depth 2).
    pub fn subcomponent(&self) -> char {
        self.0[2]
    }

    /// The repetition separator (depth 3).
    pub fn repetition(&self) -> char {
        self.0[3]
    }

    /// The escape character (depth 4).
    pub fn escape(&self) -> char {
        self.0[4]
    }

    /// All five characters in depth order.
    pub fn as_array(&self) -> [char; DELIMITER_COUNT] {
        self.0
    }
}

impl Default for Delimiters {
    /// The delimiters assumed until a header line declares others.
    fn default() -> Self {
        Self(['|', '^', '&', '~', '\\'])
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0 {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}
