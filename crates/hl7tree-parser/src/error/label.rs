//! Labeled source spans for diagnostic messages.
//!
//! A label associates a message with a span in the source text,
//! providing context for where an error or warning occurred.

use crate::span::Span;

/// A labeled span in the source text.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the offending line or header.
/// - **Secondary labels** provide additional context, such as the line an
///   element would have been attached below.
///
/// # Example
///
/// ```text
/// error[E200]: `ORC` at level 1 has no ancestor at that level
///   |
/// 2 | OBX|1|NM|001347^Iron^L
///   | ---------------------- previous element, level 3
/// 3 | ORC|RE|123
///   | ^^^^^^^^^^ cannot be placed
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
