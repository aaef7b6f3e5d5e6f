//! Threading flat lines into an element tree.
//!
//! Lines arrive in message order and carry no explicit nesting. Each code has
//! a level in the level table; comparing the level of a new element with the
//! level of the previous one decides where it goes:
//!
//! - same level: a sibling of the previous element
//! - deeper: a child of the previous element
//! - shallower by `n`: walk `n` parents up from the previous element and
//!   become a sibling of the element reached
//!
//! Annotation lines are not placed at all; they are bound to the previous
//! element.

use std::cmp::Ordering;

use log::{debug, trace};

use hl7tree_core::delimiters::{Delimiters, HEADER_CODE};

use crate::{
    ParseContext,
    element::{Annotation, Segment, line_code},
    error::{Diagnostic, ErrorCode},
    message::{ElementId, Message},
    span::Span,
};

/// Builds one [`Message`] from its lines.
pub struct HierarchyBuilder<'a> {
    ctx: &'a ParseContext<'a>,
    message: Message,
    delimiters: Delimiters,
    header_seen: bool,
    last: ElementId,
    last_level: u32,
}

impl<'a> HierarchyBuilder<'a> {
    /// Start a message. `raw_text` is kept on the finished message.
    pub fn new(ctx: &'a ParseContext<'a>, raw_text: &str, terminator: char) -> Self {
        Self {
            ctx,
            message: Message::new(raw_text, terminator),
            delimiters: Delimiters::default(),
            header_seen: false,
            last: ElementId::ROOT,
            last_level: 0,
        }
    }

    /// Parse one line and place it.
    ///
    /// Header lines declare the delimiters used for themselves and every line
    /// after them.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::E001`] for a header line too short to declare its delimiters
    /// - [`ErrorCode::E100`] for a code without a layout
    /// - [`ErrorCode::E101`] for a code without a level
    /// - [`ErrorCode::E200`] for a line that cannot be placed
    pub fn push_line(&mut self, line: &str, span: Span) -> Result<(), Diagnostic> {
        if line.starts_with(HEADER_CODE) {
            self.resolve_delimiters(line, span)?;
        }

        let code = line_code(line, &self.delimiters);
        if self.ctx.levels().is_annotation(code) {
            self.push_annotation(line);
            return Ok(());
        }

        let segment = Segment::from_line(line, &self.delimiters, self.ctx.catalog())
            .map_err(|diagnostic| diagnostic.with_label(span, "no layout for this code"))?;
        self.push_segment(segment, span).map(|_| ())
    }

    /// Place an already built segment.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::E101`] if the code has no level, [`ErrorCode::E200`] if
    /// the level walk runs past the root.
    pub fn push_segment(&mut self, segment: Segment, span: Span) -> Result<ElementId, Diagnostic> {
        let code = segment.code().to_string();
        let level = self.ctx.levels().level_of(&code).ok_or_else(|| {
            Diagnostic::error(format!("unknown level for element code `{code}`"))
                .with_code(ErrorCode::E101)
                .with_label(span, "no level for this code")
                .with_help("add the code to the level table")
        })?;

        let parent = match level.cmp(&self.last_level) {
            Ordering::Equal => self.message.parent_of(self.last),
            Ordering::Greater => Some(self.last),
            Ordering::Less => (0..self.last_level - level)
                .try_fold(self.last, |id, _| self.message.parent_of(id))
                .and_then(|ancestor| self.message.parent_of(ancestor)),
        };

        let Some(parent) = parent else {
            return Err(self.structure_mismatch(&code, level, span));
        };

        trace!(code = code.as_str(), level = level, parent = parent.index(); "Placing element");
        let id = self.message.add_child(parent, segment, level, span);
        self.last = id;
        self.last_level = level;
        Ok(id)
    }

    /// Hand over the finished message.
    pub fn finish(self) -> Message {
        debug!(elements = self.message.len(); "Finished message");
        self.message
    }

    fn resolve_delimiters(&mut self, line: &str, span: Span) -> Result<(), Diagnostic> {
        let delimiters = Delimiters::from_header(line).map_err(|err| {
            Diagnostic::error(format!("malformed header: {err}"))
                .with_code(ErrorCode::E001)
                .with_label(span, "header line")
                .with_help("the header must declare five delimiter characters")
        })?;

        debug!(delimiters = delimiters.to_string(); "Resolved delimiters");
        self.delimiters = delimiters;
        if !self.header_seen {
            self.message.set_delimiters(delimiters);
            self.header_seen = true;
        }
        Ok(())
    }

    fn push_annotation(&mut self, line: &str) {
        // Annotations without a layout are still kept verbatim
        let segment = Segment::from_line(line, &self.delimiters, self.ctx.catalog()).ok();
        trace!(attached_to = self.last.index(); "Binding annotation");
        self.message
            .add_annotation(self.last, Annotation::new(line, segment));
    }

    fn structure_mismatch(&self, code: &str, level: u32, span: Span) -> Diagnostic {
        let mut diagnostic = Diagnostic::error(format!(
            "`{code}` at level {level} has no ancestor to attach to"
        ))
        .with_code(ErrorCode::E200)
        .with_label(span, "cannot be placed");

        if let Some(previous) = self.message.get(self.last).filter(|element| !element.is_root()) {
            diagnostic = diagnostic.with_secondary_label(
                previous.span(),
                format!("previous element `{}`, level {}", previous.code(), self.last_level),
            );
        }

        diagnostic.with_help("check that the line order matches the level table")
    }
}
