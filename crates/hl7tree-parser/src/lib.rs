//! # hl7tree Parser
//!
//! Structural parser for line-oriented, multiply-delimited clinical messages.
//! It turns raw text into a [`Message`]: a tree of segments placed by their
//! nesting level, each holding a schema-typed field tree, and turns the tree
//! back into text.
//!
//! Serialization writes every field position a layout declares. Pass
//! [`TextLayout::AsParsed`] to keep the trailing positions as wide as they
//! were in the source, which reproduces parsed text byte for byte.
//!
//! ## Usage
//!
//! ```
//! # use hl7tree_parser::{parse, ParseContext, ParseError, TextLayout};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "MSH|^~\\&|LAB||||||ORU^R01\rORC|RE\rOBR|1\rOBX|1|NM|001347^Iron^L||476";
//!
//!     let message = parse(source, &ParseContext::builtin())?;
//!     let obx = message.find("OBX").unwrap();
//!     assert_eq!(obx.parent().unwrap().code(), "OBR");
//!     assert_eq!(message.to_text_with(TextLayout::AsParsed), source);
//!     Ok(())
//! }
//! ```

pub mod element;
pub mod error;
pub mod field;
pub mod framing;
pub mod hierarchy;
pub mod message;
pub mod split;

mod span;

pub use element::{Annotation, Annotations, Segment};
pub use error::{Diagnostic, ErrorCode, ParseError, Severity};
pub use field::{FieldNode, TextLayout};
pub use framing::FramingOptions;
pub use message::{ElementData, ElementId, ElementKind, ElementRef, Message};
pub use span::Span;

use log::{debug, info};

use hl7tree_core::{builtin, levels::LevelTable, schema::SchemaCatalog};

use error::DiagnosticCollector;
use hierarchy::HierarchyBuilder;

/// The tables and framing options a parse runs against.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    catalog: &'a SchemaCatalog,
    levels: &'a LevelTable,
    framing: FramingOptions,
}

impl ParseContext<'static> {
    /// A context over the built-in catalog and level table.
    pub fn builtin() -> Self {
        Self::new(builtin::catalog(), builtin::levels())
    }
}

impl<'a> ParseContext<'a> {
    /// A context over the given tables with default framing.
    pub fn new(catalog: &'a SchemaCatalog, levels: &'a LevelTable) -> Self {
        Self {
            catalog,
            levels,
            framing: FramingOptions::default(),
        }
    }

    pub fn with_framing(mut self, framing: FramingOptions) -> Self {
        self.framing = framing;
        self
    }

    pub fn catalog(&self) -> &'a SchemaCatalog {
        self.catalog
    }

    pub fn levels(&self) -> &'a LevelTable {
        self.levels
    }

    pub fn framing(&self) -> &FramingOptions {
        &self.framing
    }
}

/// Parse source text holding one message.
///
/// # Errors
///
/// Returns a [`ParseError`] holding the diagnostic of the first line that
/// could not be parsed or placed. See [`ErrorCode`] for the categories.
pub fn parse(source: &str, ctx: &ParseContext<'_>) -> Result<Message, ParseError> {
    let message = parse_record(source, 0, ctx)?;
    info!(elements = message.len(); "Parsed message");
    Ok(message)
}

/// Parse a blob of concatenated messages.
///
/// The blob is split at header lines and every part is parsed on its own. A
/// failing message does not stop the others from being parsed.
///
/// # Errors
///
/// Returns a [`ParseError`] holding one diagnostic per failing message.
/// Spans point into `source`.
pub fn parse_all(source: &str, ctx: &ParseContext<'_>) -> Result<Vec<Message>, ParseError> {
    let records = split::split_records(source);
    debug!(records = records.len(); "Split source into records");

    let mut collector = DiagnosticCollector::new();
    let mut messages = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match parse_record(record.text, record.offset, ctx) {
            Ok(message) => messages.push(message),
            Err(diagnostic) => collector.emit(index, diagnostic),
        }
    }
    collector.finish()?;

    info!(messages = messages.len(); "Parsed all messages");
    Ok(messages)
}

fn parse_record(text: &str, offset: usize, ctx: &ParseContext<'_>) -> Result<Message, Diagnostic> {
    let framed = framing::frame_lines(text, offset, ctx.framing());

    let mut builder = HierarchyBuilder::new(ctx, text, framed.terminator());
    for line in framed.lines() {
        builder.push_line(line.text(), line.span())?;
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use hl7tree_core::{
        delimiters::Delimiters,
        schema::SchemaSpec,
        value::{FieldData, SemanticType},
    };

    use super::*;

    const ORU: &str = "MSH|^~\\&|LAB|FAC|EMR|FAC|201210170000||ORU^R01|MSG0001|P|2.3\r\
                       PID|1||555-44-4444||DOE^JANE^A\r\
                       ORC|RE|ORD448811^EMR|R-511^LAB||CM||||201210170000\r\
                       OBR|1|ORD448811^EMR|R-511^LAB|IRON^Iron panel\r\
                       OBX|1|NM|001347^Iron^L||476|ug/dL|35-155|H|||F\r\
                       NTE|1||Specimen slightly hemolyzed\r\
                       OBX|2|NM|001348^TIBC^L||350|ug/dL|250-450|N|||F\r\
                       ORC|RE|ORD448812^EMR|R-512^LAB||CM||||201210170000\r\
                       OBR|1|ORD448812^EMR|R-512^LAB|FERR^Ferritin";

    #[test]
    fn test_round_trip() {
        let message = parse(ORU, &ParseContext::builtin()).unwrap();
        assert_eq!(message.to_text_with(TextLayout::AsParsed), ORU);
    }

    #[test]
    fn test_padded_text_writes_every_position() {
        let message = parse(ORU, &ParseContext::builtin()).unwrap();
        let text = message.to_text();
        let nte = text.split('\r').find(|line| line.starts_with("NTE")).unwrap();
        let obr = text.split('\r').last().unwrap();

        assert_eq!(nte, "NTE|1||Specimen slightly hemolyzed");
        assert!(obr.starts_with("OBR|1|ORD448812^EMR|R-512^LAB|FERR^Ferritin^|"));
        assert_eq!(obr.matches('|').count(), 25);
        assert_eq!(parse(&text, &ParseContext::builtin()).unwrap().to_text(), text);
    }

    #[test]
    fn test_hierarchy() {
        let message = parse(ORU, &ParseContext::builtin()).unwrap();
        let root = message.root();

        assert_eq!(root.children_with_code("ORC").count(), 2);
        let obr = root.child("ORC").unwrap().child("OBR").unwrap();
        assert_eq!(obr.children_with_code("OBX").count(), 2);
        assert_eq!(message.len(), 8);
    }

    #[test]
    fn test_order_transaction_time() {
        let message = parse(ORU, &ParseContext::builtin()).unwrap();
        let orc = message.root().nth_child_with_code("ORC", 1).unwrap();

        assert_eq!(
            orc.segment().unwrap().field("trans_date_time").unwrap().to_text(),
            "201210170000"
        );
    }

    #[test]
    fn test_observation_note() {
        let message = parse(ORU, &ParseContext::builtin()).unwrap();
        let obx = message.find("OBX").unwrap();

        assert_eq!(obx.note().as_deref(), Some("NTE|1||Specimen slightly hemolyzed"));
        assert_eq!(
            obx.annotations().unwrap().comments(),
            vec!["Specimen slightly hemolyzed"]
        );
    }

    #[test]
    fn test_header_codes() {
        let message = parse(ORU, &ParseContext::builtin()).unwrap();

        assert_eq!(message.message_code(), Some("ORU"));
        assert_eq!(message.event_code(), Some("R01"));
    }

    #[test]
    fn test_label_assignment_changes_one_position() {
        let mut message = parse(ORU, &ParseContext::builtin()).unwrap();
        let id = message.find("OBX").unwrap().id();

        message
            .segment_mut(id)
            .unwrap()
            .set_value("obs_id.label", "Serum iron")
            .unwrap();

        let expected = ORU.replace("001347^Iron^L", "001347^Serum iron^L");
        assert_eq!(message.to_text_with(TextLayout::AsParsed), expected);
    }

    #[test]
    fn test_mapping_assignment() {
        let mut message = parse(ORU, &ParseContext::builtin()).unwrap();
        let id = message.find("OBX").unwrap().id();

        let data = FieldData::map([
            ("obs_results", FieldData::from("480")),
            ("obs_id", FieldData::map([("label", FieldData::from("Fe"))])),
        ]);
        message.segment_mut(id).unwrap().set_mapping(&data).unwrap();

        let obx = message.get(id).unwrap().segment().unwrap();
        assert_eq!(
            obx.to_text_with(TextLayout::AsParsed),
            "OBX|1|NM|001347^Fe^L||480|ug/dL|35-155|H|||F"
        );
        assert_eq!(
            obx.to_text(),
            "OBX|1|NM|001347^Fe^L||480|ug/dL|35-155|H|||F||||"
        );
    }

    #[test]
    fn test_line_feed_framing() {
        let source = ORU.replace('\r', "\n");
        let message = parse(&source, &ParseContext::builtin()).unwrap();

        assert_eq!(message.terminator(), '\n');
        assert_eq!(message.to_text_with(TextLayout::AsParsed), source);
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = SchemaCatalog::new([
            SchemaSpec::composite(
                "MSH",
                vec![SchemaSpec::leaf("segment", SemanticType::String)],
            ),
            SchemaSpec::composite(
                "XYZ",
                vec![
                    SchemaSpec::leaf("segment", SemanticType::String),
                    SchemaSpec::leaf("id", SemanticType::Number),
                    SchemaSpec::composite(
                        "parts",
                        vec![
                            SchemaSpec::leaf("a", SemanticType::String),
                            SchemaSpec::leaf("b", SemanticType::String),
                            SchemaSpec::leaf("c", SemanticType::String),
                        ],
                    ),
                ],
            ),
        ])
        .unwrap();
        let levels = LevelTable::from_levels([("MSH", 1), ("XYZ", 1)]).unwrap();
        let ctx = ParseContext::new(&catalog, &levels);

        let message = parse("MSH|^&~\\\rXYZ|1|A^B^C", &ctx).unwrap();
        assert_eq!(message.delimiters(), Delimiters::new(['|', '^', '&', '~', '\\']));

        let parts = message
            .find("XYZ")
            .unwrap()
            .segment()
            .unwrap()
            .field("parts")
            .unwrap();
        let texts: Vec<String> = parts.children().iter().map(FieldNode::to_text).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert_eq!(parts.to_text(), "A^B^C");
    }

    #[test]
    fn test_error_points_at_line() {
        let source = "MSH|^~\\&\rZZZ|1";
        let err = parse(source, &ParseContext::builtin()).unwrap_err();

        let diagnostic = &err.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::E100));
        let span = diagnostic.labels()[0].span();
        assert_eq!(&source[span.start()..span.end()], "ZZZ|1");
    }

    #[test]
    fn test_parse_all_collects_failures() {
        let source = "MSH|^~\\&\rPID|1\nMSH|^~\\&\rZZZ|1\nMSH|^~\\&\rQQQ|1";
        let err = parse_all(source, &ParseContext::builtin()).unwrap_err();

        assert_eq!(err.failed_messages(), &[1, 2]);
        let span = err.diagnostics()[1].labels()[0].span();
        assert_eq!(&source[span.start()..span.end()], "QQQ|1");
    }

    #[test]
    fn test_parse_all_messages_are_independent() {
        let source = "MSH|^~\\&|A\rPID|1\nMSH|#~\\&|B\rPID|2";
        let mut messages = parse_all(source, &ParseContext::builtin()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].delimiters().component(), '#');

        let id = messages[0].find("PID").unwrap().id();
        messages[0].segment_mut(id).unwrap().set_value("set_id", 9.0).unwrap();
        let second = messages[1].find("PID").unwrap().segment().unwrap();
        assert_eq!(second.to_text_with(TextLayout::AsParsed), "PID|2");
    }
}
