//! Line framing: cutting a message into its segment lines.

use std::borrow::Cow;

use log::{debug, trace};

use hl7tree_core::control::{CR, FS, LF, VT};

use crate::span::Span;

/// How raw text is cut into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingOptions {
    segment_terminator: char,
    fall_back_to_lf: bool,
    strip_vertical_tab: bool,
}

impl FramingOptions {
    /// Creates framing options.
    ///
    /// # Arguments
    ///
    /// * `segment_terminator` - Character ending each segment line
    /// * `fall_back_to_lf` - Split on line feeds when the terminator yields a single line
    /// * `strip_vertical_tab` - Drop every vertical tab from each line
    pub fn new(segment_terminator: char, fall_back_to_lf: bool, strip_vertical_tab: bool) -> Self {
        Self {
            segment_terminator,
            fall_back_to_lf,
            strip_vertical_tab,
        }
    }

    pub fn segment_terminator(&self) -> char {
        self.segment_terminator
    }

    pub fn fall_back_to_lf(&self) -> bool {
        self.fall_back_to_lf
    }

    pub fn strip_vertical_tab(&self) -> bool {
        self.strip_vertical_tab
    }
}

impl Default for FramingOptions {
    fn default() -> Self {
        Self::new(CR, true, true)
    }
}

/// One segment line and where it sits in the source.
///
/// The text is borrowed from the source unless vertical tabs had to be
/// removed from inside it. The span always covers the source slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    text: Cow<'a, str>,
    span: Span,
}

impl Line<'_> {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// The lines of one message and the terminator that separated them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framed<'a> {
    lines: Vec<Line<'a>>,
    terminator: char,
}

impl<'a> Framed<'a> {
    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    /// The terminator actually used to split, reused when serializing.
    pub fn terminator(&self) -> char {
        self.terminator
    }
}

/// Cut `source` into lines.
///
/// `base` is the offset of `source` inside the text the caller handed in, so
/// that spans stay absolute when a blob is parsed message by message.
///
/// Carriage returns and line feeds around each line are trimmed. When
/// enabled, vertical tabs are removed wherever they occur in a line. Lines
/// left empty, and file separator trailers, are skipped.
pub fn frame_lines<'a>(source: &'a str, base: usize, options: &FramingOptions) -> Framed<'a> {
    let mut terminator = options.segment_terminator;
    let mut pieces = split_with_offsets(source, terminator);

    if pieces.len() == 1 && options.fall_back_to_lf && terminator != LF {
        let fallback = split_with_offsets(source, LF);
        if fallback.len() > 1 {
            debug!(lines = fallback.len(); "No segment terminator found, framing on line feeds");
            terminator = LF;
            pieces = fallback;
        }
    }

    let strip_vt = options.strip_vertical_tab;
    let is_edge = |ch: char| ch == CR || ch == LF || (strip_vt && ch == VT);

    let lines = pieces
        .into_iter()
        .filter_map(|(offset, piece)| {
            let trimmed_start = piece.trim_start_matches(is_edge);
            let start = offset + (piece.len() - trimmed_start.len());
            let raw = trimmed_start.trim_end_matches(is_edge);
            let span = Span::new(base + start..base + start + raw.len());

            let text = if strip_vt && raw.contains(VT) {
                trace!(span:? = span; "Removing vertical tabs inside a line");
                Cow::Owned(raw.replace(VT, ""))
            } else {
                Cow::Borrowed(raw)
            };

            if text.is_empty() || text.chars().all(|ch| ch == FS) {
                return None;
            }

            Some(Line { text, span })
        })
        .collect();

    Framed { lines, terminator }
}

fn split_with_offsets(source: &str, separator: char) -> Vec<(usize, &str)> {
    let mut offset = 0;
    source
        .split(separator)
        .map(|piece| {
            let start = offset;
            offset += piece.len() + separator.len_utf8();
            (start, piece)
        })
        .collect()
}
