//! Error and diagnostic system for the hl7tree parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans pointing into the source text
//! - Severity levels
//! - Diagnostic collector for accumulating errors across messages
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! for returning from [`parse`](crate::parse) and [`parse_all`](crate::parse_all).
//!
//! # Example
//!
//! ```
//! # use hl7tree_parser::error::{Diagnostic, ErrorCode};
//! # use hl7tree_parser::Span;
//!
//! let diag = Diagnostic::error("unknown element code `ZZZ`")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(40..52), "no layout for this code")
//!     .with_help("add the code to the schema catalog");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
