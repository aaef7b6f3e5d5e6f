//! Segments and the annotations attached to them.

use log::trace;

use hl7tree_core::{
    delimiters::Delimiters,
    schema::{SchemaCatalog, SchemaSpec},
    value::{FieldData, FieldValue},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    field::{FieldNode, TextLayout},
};

/// One parsed segment line: its code and its field tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    code: String,
    root: FieldNode,
}

impl Segment {
    /// Parse one raw line.
    ///
    /// The code is the text before the first field delimiter, or the whole
    /// line if there is none.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorCode::E100`] diagnostic if the catalog has no layout
    /// for the code.
    pub fn from_line(
        line: &str,
        delimiters: &Delimiters,
        catalog: &SchemaCatalog,
    ) -> Result<Self, Diagnostic> {
        let code = line_code(line, delimiters);
        let spec = lookup(code, catalog)?;

        let mut root = FieldNode::build(spec, delimiters, 0);
        root.fill_from_text(line);
        trace!(code = code; "Parsed segment line");

        Ok(Self {
            code: code.to_string(),
            root,
        })
    }

    /// Build a segment from nested data.
    ///
    /// The first field of every layout holds the segment code and is set from
    /// `code` whatever the data says. Values that do not fit their field are
    /// replaced and reported as warnings next to the segment.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::E100`] if the catalog has no layout for `code`
    /// - [`ErrorCode::E102`] if the data carries a different code in its first field
    /// - [`ErrorCode::E201`] if `data` is not a mapping
    pub fn from_mapping(
        code: &str,
        data: &FieldData,
        delimiters: &Delimiters,
        catalog: &SchemaCatalog,
    ) -> Result<(Self, Vec<Diagnostic>), Diagnostic> {
        let spec = lookup(code, catalog)?;

        let mut segment = Self {
            code: code.to_string(),
            root: FieldNode::build(spec, delimiters, 0),
        };
        let warnings = segment.set_mapping(data)?;
        Ok((segment, warnings))
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The root of the field tree.
    pub fn root(&self) -> &FieldNode {
        &self.root
    }

    /// The top-level field with the given code.
    pub fn field(&self, code: &str) -> Option<&FieldNode> {
        self.root.child(code)
    }

    /// The field at a dot-separated path, e.g. `obs_id.label`.
    pub fn field_path(&self, path: &str) -> Option<&FieldNode> {
        self.root.path(path)
    }

    /// Assign the leaf at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::E202`] if the path names no field, or
    /// [`ErrorCode::E201`] if it names a composite.
    pub fn set_value(
        &mut self,
        path: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), Diagnostic> {
        let Some(node) = self.root.path_mut(path) else {
            return Err(Diagnostic::error(format!(
                "`{}` has no field `{path}`",
                self.code
            ))
            .with_code(ErrorCode::E202));
        };
        node.set_value(value)
    }

    /// Assign values from nested data, see [`FieldNode::from_mapping`].
    ///
    /// # Errors
    ///
    /// Same as [`Segment::from_mapping`], except that the layout is known.
    pub fn set_mapping(&mut self, data: &FieldData) -> Result<Vec<Diagnostic>, Diagnostic> {
        let named = self
            .root
            .children()
            .first()
            .and_then(|code_field| data.get(code_field.code()))
            .and_then(FieldData::as_value)
            .and_then(FieldValue::as_text);
        if let Some(found) = named.filter(|found| *found != self.code) {
            return Err(Diagnostic::error(format!(
                "mapping for `{}` names segment `{found}`",
                self.code
            ))
            .with_code(ErrorCode::E102));
        }

        let warnings = self.root.from_mapping(data)?;
        self.stamp_code();
        Ok(warnings)
    }

    /// The segment as one wire line, every field position written.
    pub fn to_text(&self) -> String {
        self.root.to_text()
    }

    pub fn to_text_with(&self, layout: TextLayout) -> String {
        self.root.to_text_with(layout)
    }

    /// The segment as nested data keyed by field code.
    pub fn to_mapping(&self) -> FieldData {
        self.root.to_mapping()
    }

    fn stamp_code(&mut self) {
        let Some(first_code) = self.root.children().first().map(|f| f.code().to_string()) else {
            return;
        };
        if let Some(node) = self.root.child_mut(&first_code) {
            // Fails only for a composite, which cannot hold the code anyway
            let _ = node.set_value(self.code.as_str());
        }
    }
}

/// One raw annotation line.
///
/// Annotations are kept verbatim. When the catalog knows the annotation code
/// the line is also parsed, which gives access to its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    raw: String,
    segment: Option<Segment>,
}

impl Annotation {
    pub fn new(raw: impl Into<String>, segment: Option<Segment>) -> Self {
        Self {
            raw: raw.into(),
            segment,
        }
    }

    /// The line as it appeared in the message.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed line, if the catalog has a layout for it.
    pub fn segment(&self) -> Option<&Segment> {
        self.segment.as_ref()
    }
}

/// Annotation lines bound to one element, in message order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    lines: Vec<Annotation>,
}

impl Annotations {
    pub fn push(&mut self, annotation: Annotation) {
        self.lines.push(annotation);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.lines.iter()
    }

    /// The raw lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Annotation::raw)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The `comment` field of every parsed annotation.
    pub fn comments(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(Annotation::segment)
            .filter_map(|segment| segment.field("comment"))
            .map(FieldNode::to_text)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Annotations {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// The code of a raw line.
pub(crate) fn line_code<'a>(line: &'a str, delimiters: &Delimiters) -> &'a str {
    line.split(delimiters.field()).next().unwrap_or(line)
}

fn lookup<'c>(code: &str, catalog: &'c SchemaCatalog) -> Result<&'c SchemaSpec, Diagnostic> {
    catalog.lookup(code).ok_or_else(|| {
        Diagnostic::error(format!("unknown element code `{code}`"))
            .with_code(ErrorCode::E100)
            .with_help("add a layout for this code to the schema catalog")
    })
}
