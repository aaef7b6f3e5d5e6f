//! Segment layouts keyed by element code.
//!
//! A [`SchemaSpec`] describes one node of a segment's field tree: its code,
//! its [`SemanticType`] and, for composite nodes, the ordered specs of its
//! children. The [`SchemaCatalog`] maps three-character element codes to the
//! spec of the segment root.
//!
//! Specs are immutable prototypes. Field trees are instantiated by borrowing
//! a spec and carrying delimiter and depth alongside it; nothing ever writes
//! into a catalog after it has been validated.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use crate::{delimiters::DELIMITER_COUNT, levels::LevelTable, value::SemanticType};

/// Length of every element code.
pub const CODE_LEN: usize = 3;

/// Errors raised while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("element code `{0}` must be exactly three characters")]
    InvalidCode(String),

    #[error("element code `{0}` is defined more than once")]
    DuplicateSegment(String),

    #[error("field `{field}` appears more than once under `{parent}`")]
    DuplicateField { parent: String, field: String },

    #[error("field `{field}` in `{segment}` is nested deeper than the {} declared delimiters", DELIMITER_COUNT)]
    TooDeep { segment: String, field: String },

    #[error("level for `{code}` must be between 1 and {}, found {level}", u32::MAX)]
    InvalidLevel { code: String, level: i64 },
}

/// One node of a segment layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaSpec {
    code: String,

    #[serde(rename = "type", default)]
    semantic_type: SemanticType,

    #[serde(rename = "fields", default)]
    children: Vec<SchemaSpec>,
}

impl SchemaSpec {
    /// Creates a leaf spec of the given type.
    pub fn leaf(code: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            code: code.into(),
            semantic_type,
            children: Vec::new(),
        }
    }

    /// Creates a composite spec whose children are joined by one delimiter level.
    pub fn composite(code: impl Into<String>, children: Vec<SchemaSpec>) -> Self {
        Self {
            code: code.into(),
            semantic_type: SemanticType::String,
            children,
        }
    }

    /// The code of this node, unique among its siblings.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The semantic type of this node. Only meaningful for leaves.
    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    /// Ordered child specs; empty for leaves.
    pub fn children(&self) -> &[SchemaSpec] {
        &self.children
    }

    /// Returns `true` if this spec has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Checks sibling uniqueness and nesting depth below this node.
    fn validate(&self, segment: &str, depth: usize) -> Result<(), SchemaError> {
        if self.is_leaf() {
            return Ok(());
        }
        if depth >= DELIMITER_COUNT {
            return Err(SchemaError::TooDeep {
                segment: segment.to_string(),
                field: self.code.clone(),
            });
        }

        let mut seen = HashSet::new();
        for child in &self.children {
            if !seen.insert(child.code.as_str()) {
                return Err(SchemaError::DuplicateField {
                    parent: self.code.clone(),
                    field: child.code.clone(),
                });
            }
            child.validate(segment, depth + 1)?;
        }
        Ok(())
    }
}

/// Maps element codes to segment layouts.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    segments: HashMap<String, SchemaSpec>,
}

impl SchemaCatalog {
    /// Builds a catalog from segment root specs.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if a code is not three characters long, a
    /// segment is defined twice, sibling fields share a code, or a composite
    /// is nested deeper than there are delimiters to join it.
    pub fn new(segments: impl IntoIterator<Item = SchemaSpec>) -> Result<Self, SchemaError> {
        let mut catalog = HashMap::new();
        for spec in segments {
            if spec.code.chars().count() != CODE_LEN {
                return Err(SchemaError::InvalidCode(spec.code));
            }
            spec.validate(&spec.code, 0)?;
            if catalog.contains_key(&spec.code) {
                return Err(SchemaError::DuplicateSegment(spec.code));
            }
            catalog.insert(spec.code.clone(), spec);
        }

        log::debug!(segments = catalog.len(); "Schema catalog assembled");
        Ok(Self { segments: catalog })
    }

    /// Returns the layout of the segment with the given code.
    pub fn lookup(&self, code: &str) -> Option<&SchemaSpec> {
        self.segments.get(code)
    }

    /// Returns `true` if the catalog knows the given code.
    pub fn contains(&self, code: &str) -> bool {
        self.segments.contains_key(code)
    }

    /// Number of segment layouts.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the catalog holds no layouts.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterates over the known element codes in no particular order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(String::as_str)
    }
}

/// On-disk form of a user catalog: segment layouts plus their levels.
///
/// ```toml
/// annotation = "NTE"
///
/// [levels]
/// XYZ = 1
///
/// [[segments]]
/// code = "XYZ"
/// fields = [
///     { code = "segment" },
///     { code = "id", type = "number" },
///     { code = "parts", fields = [{ code = "a" }, { code = "b" }] },
/// ]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    /// Code of annotation lines; defaults to the built-in one.
    #[serde(default)]
    annotation: Option<String>,

    /// Nesting level per element code.
    #[serde(default)]
    levels: HashMap<String, i64>,

    /// Segment layouts.
    #[serde(default)]
    segments: Vec<SchemaSpec>,
}

impl CatalogFile {
    /// Validates the file contents into a catalog and a level table.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for malformed layouts or non-positive levels.
    pub fn into_tables(self) -> Result<(SchemaCatalog, LevelTable), SchemaError> {
        let catalog = SchemaCatalog::new(self.segments)?;
        let mut levels = match self.annotation {
            Some(code) => LevelTable::with_annotation(code),
            None => LevelTable::default(),
        };
        for (code, level) in self.levels {
            levels.insert(code, level)?;
        }
        Ok((catalog, levels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(code: &str, children: Vec<SchemaSpec>) -> SchemaSpec {
        SchemaSpec::composite(code, children)
    }

    fn leaf(code: &str) -> SchemaSpec {
        SchemaSpec::leaf(code, SemanticType::String)
    }

    #[test]
    fn test_lookup() {
        let catalog =
            SchemaCatalog::new([segment("XYZ", vec![leaf("segment"), leaf("id")])]).unwrap();

        let spec = catalog.lookup("XYZ").unwrap();
        assert_eq!(spec.children().len(), 2);
        assert!(catalog.lookup("ABC").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_rejects_bad_code() {
        let err = SchemaCatalog::new([segment("XY", vec![leaf("segment")])]).unwrap_err();
        assert_eq!(err, SchemaError::InvalidCode("XY".to_string()));
    }

    #[test]
    fn test_rejects_duplicate_segment() {
        let err = SchemaCatalog::new([
            segment("XYZ", vec![leaf("segment")]),
            segment("XYZ", vec![leaf("segment")]),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateSegment("XYZ".to_string()));
    }

    #[test]
    fn test_rejects_duplicate_sibling() {
        let err =
            SchemaCatalog::new([segment("XYZ", vec![leaf("segment"), leaf("segment")])])
                .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_rejects_too_deep() {
        // Root at depth 0 plus five nested composites needs a sixth delimiter.
        let mut spec = segment("deep", vec![leaf("x")]);
        for depth in 0..4 {
            spec = segment(&format!("level{depth}"), vec![spec]);
        }
        let err = SchemaCatalog::new([segment("XYZ", vec![spec])]).unwrap_err();
        assert!(matches!(err, SchemaError::TooDeep { .. }));
    }

    #[test]
    fn test_accepts_max_depth() {
        let mut spec = segment("deep", vec![leaf("x")]);
        for depth in 0..3 {
            spec = segment(&format!("level{depth}"), vec![spec]);
        }
        assert!(SchemaCatalog::new([segment("XYZ", vec![spec])]).is_ok());
    }
}
