//! Schema-driven field trees.
//!
//! A [`FieldNode`] is instantiated from a [`SchemaSpec`] for one segment line.
//! Leaves hold a typed [`FieldValue`]; composites hold a fixed, schema-ordered
//! list of children joined on the wire by one delimiter.
//!
//! The shape of a tree never changes after [`FieldNode::build`]: filling it
//! from text or from a mapping only replaces leaf values.

use std::fmt::{self, Write as _};

use log::{trace, warn};
use serde::Deserialize;

use hl7tree_core::{
    delimiters::Delimiters,
    schema::SchemaSpec,
    value::{FieldData, FieldValue, SemanticType},
};

use crate::error::{Diagnostic, ErrorCode};

/// How composites write their trailing positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLayout {
    /// Every child the schema declares.
    #[default]
    Padded,
    /// As many children as the source text had, and never fewer than needed
    /// to reach the last non-empty one. Text parsed and not changed since is
    /// written back byte for byte.
    AsParsed,
}

/// One node of a field tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    code: String,
    semantic_type: SemanticType,
    delimiter: char,
    kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
enum FieldKind {
    Leaf {
        value: FieldValue,
        /// Wire text kept when the value would not format back to it.
        source: Option<String>,
    },
    Composite {
        children: Vec<FieldNode>,
        /// Number of children present in the last text this node was filled
        /// from, used by [`TextLayout::AsParsed`].
        width: usize,
    },
}

impl FieldNode {
    /// Instantiate an empty tree for `spec`.
    ///
    /// `depth` selects the delimiter joining this node's children; each level
    /// of nesting moves one position along the delimiter tuple. The spec is
    /// only read, so one catalog serves any number of messages.
    pub fn build(spec: &SchemaSpec, delimiters: &Delimiters, depth: usize) -> Self {
        let kind = if spec.is_leaf() {
            FieldKind::Leaf {
                value: FieldValue::Null,
                source: None,
            }
        } else {
            FieldKind::Composite {
                children: spec
                    .children()
                    .iter()
                    .map(|child| Self::build(child, delimiters, depth + 1))
                    .collect(),
                width: 0,
            }
        };

        Self {
            code: spec.code().to_string(),
            semantic_type: spec.semantic_type(),
            delimiter: delimiters.at(depth),
            kind,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    /// The delimiter joining this node's children.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, FieldKind::Leaf { .. })
    }

    /// The leaf value, or `None` for composites.
    pub fn value(&self) -> Option<&FieldValue> {
        match &self.kind {
            FieldKind::Leaf { value, .. } => Some(value),
            FieldKind::Composite { .. } => None,
        }
    }

    /// Children in schema order. Leaves have none.
    pub fn children(&self) -> &[FieldNode] {
        match &self.kind {
            FieldKind::Leaf { .. } => &[],
            FieldKind::Composite { children, .. } => children,
        }
    }

    /// The child with the given code.
    pub fn child(&self, code: &str) -> Option<&FieldNode> {
        self.children().iter().find(|child| child.code == code)
    }

    /// Mutable access to the child with the given code.
    pub fn child_mut(&mut self, code: &str) -> Option<&mut FieldNode> {
        match &mut self.kind {
            FieldKind::Leaf { .. } => None,
            FieldKind::Composite { children, .. } => {
                children.iter_mut().find(|child| child.code == code)
            }
        }
    }

    /// Follow a dot-separated path of child codes, e.g. `obs_id.label`.
    ///
    /// An empty path names this node.
    pub fn path(&self, path: &str) -> Option<&FieldNode> {
        path.split('.')
            .filter(|code| !code.is_empty())
            .try_fold(self, |node, code| node.child(code))
    }

    /// Mutable variant of [`FieldNode::path`].
    pub fn path_mut(&mut self, path: &str) -> Option<&mut FieldNode> {
        path.split('.')
            .filter(|code| !code.is_empty())
            .try_fold(self, |node, code| node.child_mut(code))
    }

    /// Fill the tree from wire text.
    ///
    /// Leaves coerce the text to their semantic type. Composites split on
    /// their delimiter and hand the parts to their children by position;
    /// missing parts count as empty text and surplus parts are dropped.
    pub fn fill_from_text(&mut self, text: &str) {
        match &mut self.kind {
            FieldKind::Leaf { value, source } => {
                *value = FieldValue::coerce(self.semantic_type, text);
                *source = (value.to_text() != text).then(|| text.to_string());
            }
            FieldKind::Composite { children, width } => {
                let mut parts = text.split(self.delimiter);
                let mut count = 0;
                for child in children.iter_mut() {
                    let part = parts.next();
                    if part.is_some() {
                        count += 1;
                    }
                    child.fill_from_text(part.unwrap_or_default());
                }
                *width = count;

                let dropped = parts.count();
                if dropped > 0 {
                    trace!(field = self.code.as_str(), dropped = dropped; "Dropping surplus subfields");
                }
            }
        }
    }

    /// Serialize the tree back to wire text, every schema position included.
    ///
    /// A leaf that was filled from text and not changed since writes that
    /// text unchanged. A composite joins all of its children, so positions
    /// the source left out come back as empty positions.
    pub fn to_text(&self) -> String {
        self.to_text_with(TextLayout::Padded)
    }

    /// Serialize the tree with the given [`TextLayout`].
    pub fn to_text_with(&self, layout: TextLayout) -> String {
        match &self.kind {
            FieldKind::Leaf { value, source } => match source {
                Some(text) => text.clone(),
                None => value.to_text(),
            },
            FieldKind::Composite { children, width } => {
                let texts: Vec<String> = children
                    .iter()
                    .map(|child| child.to_text_with(layout))
                    .collect();
                let end = match layout {
                    TextLayout::Padded => texts.len(),
                    TextLayout::AsParsed => texts
                        .iter()
                        .rposition(|text| !text.is_empty())
                        .map_or(0, |last| last + 1)
                        .max(*width)
                        .min(texts.len()),
                };

                texts[..end].join(self.delimiter.to_string().as_str())
            }
        }
    }

    /// View the tree as nested data keyed by child code.
    pub fn to_mapping(&self) -> FieldData {
        match &self.kind {
            FieldKind::Leaf { value, .. } => FieldData::Value(value.clone()),
            FieldKind::Composite { children, .. } => FieldData::Map(
                children
                    .iter()
                    .map(|child| (child.code.clone(), child.to_mapping()))
                    .collect(),
            ),
        }
    }

    /// Assign values from nested data.
    ///
    /// Leaves take the value as given, without coercion. Composites hand
    /// each child the entry under its code; children without an entry keep
    /// their value and an explicit null clears a whole subtree. A child whose
    /// entry has the wrong shape gets a diagnostic string as its value
    /// instead of failing the assignment, and a warning is returned for it.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorCode::E201`] diagnostic when this node itself is
    /// given the wrong shape: a composite given a scalar, or a leaf given a
    /// mapping.
    pub fn from_mapping(&mut self, data: &FieldData) -> Result<Vec<Diagnostic>, Diagnostic> {
        if matches!(data, FieldData::Value(FieldValue::Null)) {
            self.clear();
            return Ok(Vec::new());
        }

        match (&mut self.kind, data) {
            (FieldKind::Leaf { value, source }, FieldData::Value(new_value)) => {
                *value = new_value.clone();
                *source = None;
                Ok(Vec::new())
            }
            (FieldKind::Composite { children, .. }, FieldData::Map(entries)) => {
                let mut warnings = Vec::new();
                for child in children.iter_mut() {
                    let Some(entry) = entries.get(child.code.as_str()) else {
                        continue;
                    };
                    match child.from_mapping(entry) {
                        Ok(nested) => warnings.extend(nested),
                        Err(diagnostic) => {
                            warn!(
                                field = child.code.as_str(),
                                error = diagnostic.message();
                                "Replacing malformed mapping value with a diagnostic"
                            );
                            child.degrade(&diagnostic.to_string());
                            warnings.push(degraded(&self.code, diagnostic));
                        }
                    }
                }
                Ok(warnings)
            }
            (FieldKind::Leaf { .. }, data) => Err(shape_mismatch(&self.code, "a value", data)),
            (FieldKind::Composite { .. }, data) => {
                Err(shape_mismatch(&self.code, "a mapping", data))
            }
        }
    }

    /// Assign one leaf value.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorCode::E201`] diagnostic when this node is a composite.
    pub fn set_value(&mut self, new_value: impl Into<FieldValue>) -> Result<(), Diagnostic> {
        match &mut self.kind {
            FieldKind::Leaf { value, source } => {
                *value = new_value.into();
                *source = None;
                Ok(())
            }
            FieldKind::Composite { .. } => Err(Diagnostic::error(format!(
                "field `{}` is a composite and cannot hold a single value",
                self.code
            ))
            .with_code(ErrorCode::E201)
            .with_help("assign one of its subfields, or a mapping")),
        }
    }

    /// Set every leaf below this node to null.
    pub fn clear(&mut self) {
        match &mut self.kind {
            FieldKind::Leaf { value, source } => {
                *value = FieldValue::Null;
                *source = None;
            }
            FieldKind::Composite { children, .. } => {
                children.iter_mut().for_each(FieldNode::clear);
            }
        }
    }

    /// Render the tree as indented `code: value` lines.
    pub fn format_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    pub(crate) fn write_tree(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        // Writing to a String cannot fail
        let _ = match &self.kind {
            FieldKind::Leaf { value, .. } if value.is_null() => writeln!(out, "{pad}{}", self.code),
            FieldKind::Leaf { .. } => writeln!(out, "{pad}{}: {}", self.code, self.to_text()),
            FieldKind::Composite { children, .. } => {
                let result = writeln!(out, "{pad}{}", self.code);
                for child in children {
                    child.write_tree(out, indent + 1);
                }
                result
            }
        };
    }

    /// Replace the contents with a diagnostic message.
    ///
    /// Composites are cleared and the message goes into their first leaf.
    fn degrade(&mut self, message: &str) {
        self.clear();
        self.set_first_leaf(message);
    }

    fn set_first_leaf(&mut self, message: &str) {
        match &mut self.kind {
            FieldKind::Leaf { value, .. } => *value = FieldValue::Text(message.to_string()),
            FieldKind::Composite { children, .. } => {
                if let Some(first) = children.first_mut() {
                    first.set_first_leaf(message);
                }
            }
        }
    }
}

impl fmt::Display for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn degraded(parent: &str, cause: Diagnostic) -> Diagnostic {
    let mut warning = Diagnostic::warning(format!(
        "in `{parent}`: {}; the field now holds this error text",
        cause.message()
    ));
    if let Some(code) = cause.code() {
        warning = warning.with_code(code);
    }
    warning
}

fn shape_mismatch(code: &str, expected: &str, found: &FieldData) -> Diagnostic {
    Diagnostic::error(format!(
        "field `{code}` expects {expected}, found {}",
        found.kind()
    ))
    .with_code(ErrorCode::E201)
}
