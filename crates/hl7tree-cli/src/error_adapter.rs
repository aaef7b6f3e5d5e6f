//! Rendering of hl7tree failures through miette.
//!
//! Parse failures carry spans into the input file and are shown as source
//! snippets. In a blob each failing message gets its own report, titled with
//! its position. Every error code gets a hint when the diagnostic brings none
//! of its own.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use hl7tree::{Hl7TreeError, Severity, schema::SchemaError};
use hl7tree_parser::{Diagnostic, ErrorCode, Span};

/// Hint for a code, grouped by the phase the code belongs to.
fn code_hint(code: ErrorCode) -> &'static str {
    match code {
        // E0xx: the header line
        ErrorCode::E001 => {
            "the header must start with `MSH` followed by the field delimiter and \
             the four encoding characters, e.g. `MSH|^~\\&`"
        }
        // E1xx: building one element
        ErrorCode::E100 => "add a layout for this code to the catalog file, or fix the line",
        ErrorCode::E101 => "give this code a positive level in the `levels` table",
        ErrorCode::E102 => "drop the `segment` entry from the mapping or build the segment it names",
        // E2xx: placing elements and binding values
        ErrorCode::E200 => {
            "the line is shallower than every open element it could attach to; \
             check the order of the lines or the level table"
        }
        ErrorCode::E201 => "composite fields take a mapping of subfields, leaves take one value",
        ErrorCode::E202 => "field paths are dot-separated field codes, e.g. `obs_id.label`",
    }
}

/// One parser diagnostic with the input it points into.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    src: Option<&'a str>,
    /// One-based position in a blob, when the input held several messages.
    message: Option<usize>,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self {
            diag,
            src: Some(src),
            message: None,
        }
    }

    /// A diagnostic raised outside parsing, e.g. while binding a mapping.
    pub fn detached(diag: &'a Diagnostic) -> Self {
        Self {
            diag,
            src: None,
            message: None,
        }
    }

    pub fn in_message(mut self, index: usize) -> Self {
        self.message = Some(index + 1);
        self
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message {
            Some(n) => write!(f, "message {n}: {}", self.diag.message()),
            None => f.write_str(self.diag.message()),
        }
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|code| Box::new(format!("hl7tree::{code}")) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diag.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = self
            .diag
            .help()
            .or_else(|| self.diag.code().map(code_hint))?;
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() || self.src.is_none() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Failures around parsing: reading files and loading tables.
pub struct ErrorAdapter<'a>(pub &'a Hl7TreeError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            Hl7TreeError::Io(_) => "hl7tree::io",
            Hl7TreeError::Schema(_) => "hl7tree::schema",
            Hl7TreeError::Parse { .. } | Hl7TreeError::Field(_) => return None,
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            Hl7TreeError::Schema(SchemaError::InvalidCode(_)) => {
                "element codes in the catalog file are three characters, e.g. `OBX`"
            }
            Hl7TreeError::Schema(SchemaError::InvalidLevel { .. }) => {
                "levels start at 1 for elements directly under the message"
            }
            Hl7TreeError::Schema(SchemaError::TooDeep { .. }) => {
                "a layout cannot nest deeper than the delimiters a header declares"
            }
            Hl7TreeError::Schema(_) => "check the catalog file named in the configuration",
            Hl7TreeError::Io(_) => "check the input path and the `[schema] catalog` entry",
            Hl7TreeError::Parse { .. } | Hl7TreeError::Field(_) => return None,
        };
        Some(Box::new(help))
    }
}

/// A failure ready for miette's report handler.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// Points into the input.
    Diagnostic(DiagnosticAdapter<'a>),
    /// Has no location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(_) => None,
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// One report per failing message for parse errors, one report otherwise.
pub fn to_reportables(err: &Hl7TreeError) -> Vec<Reportable<'_>> {
    match err {
        Hl7TreeError::Parse { err: parse_err, src } if parse_err.is_single() => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        Hl7TreeError::Parse { err: parse_err, src } => parse_err
            .failures()
            .map(|(index, d)| {
                Reportable::Diagnostic(DiagnosticAdapter::new(d, src).in_message(index))
            })
            .collect(),
        Hl7TreeError::Field(diag) => vec![Reportable::Diagnostic(DiagnosticAdapter::detached(diag))],
        Hl7TreeError::Io(_) | Hl7TreeError::Schema(_) => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use hl7tree_parser::ParseError;

    use super::*;

    #[test]
    fn test_single_message_failure() {
        let diag = Diagnostic::error("unknown element code `ZZZ`")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(9..14), "no layout for this code");
        let err = Hl7TreeError::new_parse_error(ParseError::from(diag), "MSH|^~\\&\rZZZ|1");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        let Reportable::Diagnostic(d) = &reportables[0] else {
            panic!("Expected Diagnostic");
        };
        assert_eq!(d.to_string(), "unknown element code `ZZZ`");
        assert_eq!(d.code().unwrap().to_string(), "hl7tree::E100");
        assert_eq!(d.help().unwrap().to_string(), code_hint(ErrorCode::E100));
        assert!(d.source_code().is_some());
    }

    #[test]
    fn test_own_help_wins_over_code_hint() {
        let diag = Diagnostic::error("header line is too short")
            .with_code(ErrorCode::E001)
            .with_help("the header declares only three delimiters");

        let adapter = DiagnosticAdapter::new(&diag, "MSH|^~");

        assert_eq!(
            adapter.help().unwrap().to_string(),
            "the header declares only three delimiters"
        );
    }

    #[test]
    fn test_blob_failures_are_numbered() {
        let err = Hl7TreeError::new_parse_error(
            ParseError::from_failures([
                (
                    1,
                    Diagnostic::error("unknown element code `ZZZ`")
                        .with_code(ErrorCode::E100)
                        .with_label(Span::new(16..21), "no layout for this code"),
                ),
                (
                    2,
                    Diagnostic::error("`ORC` at level 1 has no ancestor to attach to")
                        .with_code(ErrorCode::E200)
                        .with_label(Span::new(31..37), "cannot be placed"),
                ),
            ]),
            "MSH|^~\\&\rPID|1\nMSH|^~\\&\rZZZ|1\nMSH|^~\\&\rORC|RE",
        );

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "message 2: unknown element code `ZZZ`");
        assert!(reportables[1].to_string().starts_with("message 3: "));
        assert_eq!(reportables[1].help().unwrap().to_string(), code_hint(ErrorCode::E200));
    }

    #[test]
    fn test_schema_error_help_follows_variant() {
        let err = Hl7TreeError::Schema(SchemaError::InvalidCode("XY".to_string()));

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        let Reportable::Error(e) = &reportables[0] else {
            panic!("Expected Error");
        };
        assert!(e.to_string().starts_with("Schema error:"));
        assert_eq!(e.code().unwrap().to_string(), "hl7tree::schema");
        assert!(e.help().unwrap().to_string().contains("three characters"));
    }

    #[test]
    fn test_degraded_mapping_value_is_a_warning() {
        let diag = Diagnostic::warning("in `OBX`: field `obs_id` expects a mapping, found text")
            .with_code(ErrorCode::E201);

        let adapter = DiagnosticAdapter::detached(&diag);

        assert_eq!(adapter.severity(), Some(miette::Severity::Warning));
        assert!(adapter.source_code().is_none());
        assert_eq!(adapter.help().unwrap().to_string(), code_hint(ErrorCode::E201));
    }

    #[test]
    fn test_field_error_has_no_snippet() {
        let err = Hl7TreeError::from(
            Diagnostic::error("field `segment` must be a mapping")
                .with_code(ErrorCode::E201)
                .with_label(Span::new(0..3), "unused"),
        );

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert!(matches!(reportables[0], Reportable::Diagnostic(_)));
        assert!(reportables[0].labels().is_none());
        assert!(reportables[0].source_code().is_none());
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("`ORC` at level 1 has no ancestor to attach to")
            .with_label(Span::new(0..5), "cannot be placed")
            .with_secondary_label(Span::new(10..15), "previous element");

        let adapter = DiagnosticAdapter::new(&diag, "some source code");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("cannot be placed"));
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }
}
