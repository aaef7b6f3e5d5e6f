//! Error types for hl7tree operations.
//!
//! This module provides the main error type [`Hl7TreeError`] which wraps
//! the error conditions that can occur while loading tables and processing
//! messages.

use std::io;

use thiserror::Error;

use hl7tree_core::schema::SchemaError;
use hl7tree_parser::{Diagnostic, ParseError};

/// The main error type for hl7tree operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the diagnostics so that
/// their spans can be rendered as source snippets.
#[derive(Debug, Error)]
pub enum Hl7TreeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Field(Diagnostic),
}

impl Hl7TreeError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

impl From<Diagnostic> for Hl7TreeError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Field(diagnostic)
    }
}
