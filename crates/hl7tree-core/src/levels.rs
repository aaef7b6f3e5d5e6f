//! Static element code to nesting level table.
//!
//! Messages carry no explicit nesting. Each element code has a level, and the
//! hierarchy builder derives parent/child links by comparing the level of
//! each line with the level of the line before it. Annotation lines are
//! exempt: they attach to the preceding element whatever their position.

use std::collections::HashMap;

use crate::schema::SchemaError;

/// The code of annotation lines in the built-in tables.
pub const ANNOTATION_CODE: &str = "NTE";

/// Nesting level per element code.
#[derive(Debug, Clone)]
pub struct LevelTable {
    levels: HashMap<String, u32>,
    annotation_code: String,
}

impl LevelTable {
    /// Creates an empty table with a custom annotation code.
    pub fn with_annotation(annotation_code: impl Into<String>) -> Self {
        Self {
            levels: HashMap::new(),
            annotation_code: annotation_code.into(),
        }
    }

    /// Creates a table from `(code, level)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidLevel`] if a level is not positive or
    /// does not fit in a `u32`.
    pub fn from_levels<K, I>(levels: I) -> Result<Self, SchemaError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, i64)>,
    {
        let mut table = Self::default();
        for (code, level) in levels {
            table.insert(code, level)?;
        }
        Ok(table)
    }

    /// Adds or replaces the level of one code.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidLevel`] unless `1 <= level <= u32::MAX`.
    pub fn insert(&mut self, code: impl Into<String>, level: i64) -> Result<(), SchemaError> {
        let code = code.into();
        let Some(stored) = u32::try_from(level).ok().filter(|level| *level > 0) else {
            return Err(SchemaError::InvalidLevel { code, level });
        };
        self.levels.insert(code, stored);
        Ok(())
    }

    /// Returns the level of `code`, or `None` if the table has no level for it.
    ///
    /// The annotation code never has a level.
    pub fn level_of(&self, code: &str) -> Option<u32> {
        if self.is_annotation(code) {
            return None;
        }
        self.levels.get(code).copied()
    }

    /// Returns `true` if lines with this code are annotations.
    pub fn is_annotation(&self, code: &str) -> bool {
        self.annotation_code == code
    }

    /// The code of annotation lines.
    pub fn annotation_code(&self) -> &str {
        &self.annotation_code
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::with_annotation(ANNOTATION_CODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_lookup() {
        let table = LevelTable::from_levels([("ORC", 1), ("OBR", 2), ("OBX", 3)]).unwrap();

        assert_eq!(table.level_of("ORC"), Some(1));
        assert_eq!(table.level_of("OBX"), Some(3));
        assert_eq!(table.level_of("ZZZ"), None);
    }

    #[test]
    fn test_annotation_has_no_level() {
        let mut table = LevelTable::default();
        table.insert("NTE", 4).unwrap();

        assert!(table.is_annotation("NTE"));
        assert_eq!(table.level_of("NTE"), None);
    }

    #[test]
    fn test_rejects_non_positive_level() {
        let err = LevelTable::from_levels([("PID", 0)]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidLevel {
                code: "PID".to_string(),
                level: 0
            }
        );
    }

    #[test]
    fn test_rejects_level_beyond_u32() {
        let too_deep = i64::from(u32::MAX) + 1;

        let err = LevelTable::from_levels([("OBX", too_deep)]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidLevel {
                code: "OBX".to_string(),
                level: too_deep
            }
        );

        let table = LevelTable::from_levels([("OBX", i64::from(u32::MAX))]).unwrap();
        assert_eq!(table.level_of("OBX"), Some(u32::MAX));
    }

    #[test]
    fn test_failed_insert_keeps_previous_level() {
        let mut table = LevelTable::from_levels([("OBX", 3)]).unwrap();

        assert!(table.insert("OBX", -2).is_err());
        assert_eq!(table.level_of("OBX"), Some(3));
    }

    #[test]
    fn test_custom_annotation_code() {
        let table = LevelTable::with_annotation("ZNT");
        assert!(table.is_annotation("ZNT"));
        assert!(!table.is_annotation("NTE"));
    }
}
