//! hl7tree - Parse clinical messages into schema-typed segment trees.
//!
//! Messages are line-oriented and multiply delimited. Parsing resolves the
//! delimiters declared by the header line, rebuilds the implicit hierarchy of
//! the lines from their nesting levels and fills a schema-typed field tree
//! for every line. The tree serializes back to wire text, either with every
//! field position written or, with [`TextLayout::AsParsed`], as it came in.

pub mod config;

mod error;

pub use hl7tree_core::{builtin, control, delimiters, levels, schema, value};
pub use hl7tree_parser::{
    Annotation, Annotations, Diagnostic, ElementData, ElementId, ElementKind, ElementRef,
    ErrorCode, FieldNode, FramingOptions, Message, ParseError, Segment, Severity, Span,
    TextLayout,
};

pub use error::Hl7TreeError;

use std::borrow::Cow;

use log::{debug, info, trace, warn};

use hl7tree_parser::ParseContext;

use config::AppConfig;
use delimiters::Delimiters;
use levels::LevelTable;
use schema::SchemaCatalog;
use value::FieldData;

/// Parser front end holding configuration and schema tables.
///
/// # Examples
///
/// ```rust
/// use hl7tree::{MessageParser, TextLayout, config::{AppConfig, OutputConfig}};
///
/// let source = "MSH|^~\\&|LAB||||||ORU^R01\rPID|1||555-44-4444||DOE^JANE";
///
/// let config = AppConfig::default().with_output(OutputConfig::new(TextLayout::AsParsed));
/// let parser = MessageParser::new(config);
/// let message = parser.parse(source).expect("Failed to parse");
///
/// let pid = message.find("PID").unwrap().segment().unwrap();
/// assert_eq!(pid.field_path("pat_name.given_name").unwrap().to_text(), "JANE");
/// assert_eq!(parser.serialize(&message), source);
/// ```
#[derive(Debug, Clone)]
pub struct MessageParser {
    config: AppConfig,
    catalog: Cow<'static, SchemaCatalog>,
    levels: Cow<'static, LevelTable>,
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl MessageParser {
    /// Create a parser over the built-in catalog and level table.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including framing settings
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            catalog: Cow::Borrowed(builtin::catalog()),
            levels: Cow::Borrowed(builtin::levels()),
        }
    }

    /// Replace the schema tables.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hl7tree::{MessageParser, levels::LevelTable, schema::{SchemaCatalog, SchemaSpec}};
    /// use hl7tree::value::SemanticType;
    ///
    /// let leaf = |code: &str| SchemaSpec::leaf(code, SemanticType::String);
    /// let catalog = SchemaCatalog::new([
    ///     SchemaSpec::composite("MSH", vec![leaf("segment"), leaf("encoding_chars")]),
    ///     SchemaSpec::composite("ZPI", vec![leaf("segment"), leaf("note")]),
    /// ])
    /// .unwrap();
    /// let levels = LevelTable::from_levels([("MSH", 1), ("ZPI", 1)]).unwrap();
    ///
    /// let parser = MessageParser::default().with_tables(catalog, levels);
    /// assert!(parser.parse("MSH|^~\\&\rZPI|hello").is_ok());
    /// ```
    pub fn with_tables(mut self, catalog: SchemaCatalog, levels: LevelTable) -> Self {
        debug!(segments = catalog.len(); "Using custom schema tables");
        self.catalog = Cow::Owned(catalog);
        self.levels = Cow::Owned(levels);
        self
    }

    /// The configuration this parser runs with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse text holding one message.
    ///
    /// # Errors
    ///
    /// Returns `Hl7TreeError::Parse` for lines that cannot be parsed or placed.
    pub fn parse(&self, source: &str) -> Result<Message, Hl7TreeError> {
        info!("Parsing message");

        let message = hl7tree_parser::parse(source, &self.context())
            .map_err(|err| Hl7TreeError::new_parse_error(err, source))?;

        trace!(tree = message.format_tree(); "Parsed message");
        Ok(message)
    }

    /// Parse a blob of concatenated messages.
    ///
    /// # Errors
    ///
    /// Returns `Hl7TreeError::Parse` holding one diagnostic per failing
    /// message.
    pub fn parse_all(&self, source: &str) -> Result<Vec<Message>, Hl7TreeError> {
        info!("Parsing messages");

        let messages = hl7tree_parser::parse_all(source, &self.context())
            .map_err(|err| Hl7TreeError::new_parse_error(err, source))?;

        debug!(messages = messages.len(); "Messages parsed successfully");
        Ok(messages)
    }

    /// Serialize a message back to wire text in the configured layout.
    pub fn serialize(&self, message: &Message) -> String {
        message.to_text_with(self.config.output().layout())
    }

    /// Serialize several messages, each followed by its segment terminator.
    pub fn serialize_all(&self, messages: &[Message]) -> String {
        messages
            .iter()
            .map(|message| {
                let mut text = self.serialize(message);
                text.push(message.terminator());
                text
            })
            .collect()
    }

    /// Build one segment from nested data, using the default delimiters.
    ///
    /// Values that do not fit their field are replaced by the diagnostic text
    /// and returned as [`Severity::Warning`] diagnostics next to the segment.
    ///
    /// # Errors
    ///
    /// Returns `Hl7TreeError::Field` for an unknown code, a mapping that names
    /// another segment, or data that is not a mapping.
    pub fn segment_from_mapping(
        &self,
        code: &str,
        data: &FieldData,
    ) -> Result<(Segment, Vec<Diagnostic>), Hl7TreeError> {
        let (segment, warnings) =
            Segment::from_mapping(code, data, &Delimiters::default(), &self.catalog)?;
        if !warnings.is_empty() {
            warn!(code = code, warnings = warnings.len(); "Segment built with degraded fields");
        }
        Ok((segment, warnings))
    }

    fn context(&self) -> ParseContext<'_> {
        ParseContext::new(&self.catalog, &self.levels)
            .with_framing(self.config.framing().options())
    }
}
