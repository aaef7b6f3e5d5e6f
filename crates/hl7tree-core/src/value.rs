//! Semantic types, typed leaf values and nested mappings.
//!
//! Leaf field nodes hold a [`FieldValue`] coerced from text according to the
//! [`SemanticType`] their schema declares. Whole segments can be viewed as a
//! [`FieldData`] tree: an ordered mapping from child code to either a nested
//! mapping or a leaf value.
//!
//! Coercion never fails. Text that does not fit its semantic type becomes
//! [`FieldValue::Null`] and the rest of the segment is unaffected.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Accepted date layout.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Accepted timestamp layouts, tried in order; the first match wins.
pub const TIMESTAMP_FORMATS: [&str; 3] = ["%Y%m%d%H%M", "%Y%m%d%H%M%S", "%Y%m%d %H:%M:%S"];

const MINUTE_FORMAT: &str = "%Y%m%d%H%M";
const SECOND_FORMAT: &str = "%Y%m%d%H%M%S";

/// The semantic type a schema assigns to a leaf field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    #[default]
    String,
    Number,
    Date,
    Timestamp,
}

impl SemanticType {
    /// Returns the lowercase name used in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::String => "string",
            SemanticType::Number => "number",
            SemanticType::Date => "date",
            SemanticType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed scalar held by a leaf field node.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// Coerces wire text into a value of the given semantic type.
    ///
    /// Empty text is null for every type. Numbers, dates and timestamps that
    /// fail to parse are null as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use hl7tree_core::value::{FieldValue, SemanticType};
    ///
    /// assert_eq!(FieldValue::coerce(SemanticType::Number, "476"), FieldValue::Number(476.0));
    /// assert_eq!(FieldValue::coerce(SemanticType::Number, "H"), FieldValue::Null);
    /// assert_eq!(FieldValue::coerce(SemanticType::String, ""), FieldValue::Null);
    /// ```
    pub fn coerce(semantic_type: SemanticType, text: &str) -> Self {
        if text.is_empty() {
            return FieldValue::Null;
        }

        match semantic_type {
            SemanticType::String => FieldValue::Text(text.to_string()),
            SemanticType::Number => text
                .trim()
                .parse::<f64>()
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Null),
            SemanticType::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Null),
            SemanticType::Timestamp => TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(FieldValue::Timestamp)
                .unwrap_or(FieldValue::Null),
        }
    }

    /// Formats the value back into wire text. Null formats as an empty string.
    ///
    /// Timestamps are written to the minute unless they carry seconds.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Date(date) => date.format(DATE_FORMAT).to_string(),
            FieldValue::Timestamp(timestamp) => {
                let format = if timestamp.second() == 0 {
                    MINUTE_FORMAT
                } else {
                    SECOND_FORMAT
                };
                timestamp.format(format).to_string()
            }
        }
    }

    /// Returns `true` for [`FieldValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the text if this is a [`FieldValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the number if this is a [`FieldValue::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the date if this is a [`FieldValue::Date`].
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a [`FieldValue::Timestamp`].
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Timestamp(timestamp) => Some(*timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Number(number) => serializer.serialize_f64(*number),
            FieldValue::Date(date) => date.serialize(serializer),
            FieldValue::Timestamp(timestamp) => timestamp.serialize(serializer),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<f64> for FieldValue {
    fn from(number: f64) -> Self {
        FieldValue::Number(number)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(date: NaiveDate) -> Self {
        FieldValue::Date(date)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(timestamp: NaiveDateTime) -> Self {
        FieldValue::Timestamp(timestamp)
    }
}

/// A plain, schema-shaped view of a field tree.
///
/// Composite nodes map to [`FieldData::Map`] keyed by child code in schema
/// order; leaves map to [`FieldData::Value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldData {
    Value(FieldValue),
    Map(IndexMap<String, FieldData>),
}

impl FieldData {
    /// A null leaf value.
    pub fn null() -> Self {
        FieldData::Value(FieldValue::Null)
    }

    /// Builds a mapping from `(code, data)` pairs, keeping their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use hl7tree_core::value::FieldData;
    ///
    /// let data = FieldData::map([
    ///     ("family_name", FieldData::from("DOE")),
    ///     ("given_name", FieldData::from("JANE")),
    /// ]);
    /// assert_eq!(data.get("given_name"), Some(&FieldData::from("JANE")));
    /// ```
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldData)>,
    {
        FieldData::Map(
            entries
                .into_iter()
                .map(|(code, data)| (code.into(), data))
                .collect(),
        )
    }

    /// Looks up a child entry of a mapping. Leaf values have no children.
    pub fn get(&self, code: &str) -> Option<&FieldData> {
        match self {
            FieldData::Map(map) => map.get(code),
            FieldData::Value(_) => None,
        }
    }

    /// Returns the leaf value, if this is one.
    pub fn as_value(&self) -> Option<&FieldValue> {
        match self {
            FieldData::Value(value) => Some(value),
            FieldData::Map(_) => None,
        }
    }

    /// Returns the mapping, if this is one.
    pub fn as_map(&self) -> Option<&IndexMap<String, FieldData>> {
        match self {
            FieldData::Map(map) => Some(map),
            FieldData::Value(_) => None,
        }
    }

    /// Short description of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldData::Map(_) => "mapping",
            FieldData::Value(FieldValue::Null) => "null",
            FieldData::Value(FieldValue::Text(_)) => "text",
            FieldData::Value(FieldValue::Number(_)) => "number",
            FieldData::Value(FieldValue::Date(_)) => "date",
            FieldData::Value(FieldValue::Timestamp(_)) => "timestamp",
        }
    }
}

impl From<FieldValue> for FieldData {
    fn from(value: FieldValue) -> Self {
        FieldData::Value(value)
    }
}

macro_rules! field_data_from_scalar {
    ($($scalar:ty),* $(,)?) => {
        $(
            impl From<$scalar> for FieldData {
                fn from(value: $scalar) -> Self {
                    FieldData::Value(FieldValue::from(value))
                }
            }
        )*
    };
}

field_data_from_scalar!(&str, String, f64, NaiveDate, NaiveDateTime);

impl From<IndexMap<String, FieldData>> for FieldData {
    fn from(map: IndexMap<String, FieldData>) -> Self {
        FieldData::Map(map)
    }
}
