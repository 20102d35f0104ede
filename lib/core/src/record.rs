use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered mapping of filename to record, in dataset order.
pub type Records = IndexMap<String, Record>;

/// Separator between the folder and the rest of a filename
pub const FOLDER_SEPARATOR: char = '/';

/// A single attribute value of a record.
///
/// The schema expects strings, booleans and lists of strings. Numbers and
/// any other JSON value are tolerated so a slightly off dataset still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<String>),
    Other(Value),
}

impl AttributeValue {
    /// Scalar rendering of the value, `None` for lists and non-scalar JSON
    pub fn as_scalar(&self) -> Option<String> {
        match self {
            AttributeValue::Flag(b) => Some(b.to_string()),
            AttributeValue::Number(n) => Some(n.to_string()),
            AttributeValue::Text(s) => Some(s.clone()),
            AttributeValue::List(_) | AttributeValue::Other(_) => None,
        }
    }

    /// Whether a scalar carries no information (empty string, `false`, zero, null)
    pub fn is_blank(&self) -> bool {
        match self {
            AttributeValue::Flag(b) => !b,
            AttributeValue::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
            AttributeValue::Text(s) => s.is_empty(),
            AttributeValue::List(_) => false,
            AttributeValue::Other(v) => v.is_null(),
        }
    }

    /// Render the value as plain text, joining lists with spaces
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::List(items) => items.join(" "),
            other => other.as_scalar().unwrap_or_default(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Flag(b)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(items: Vec<String>) -> Self {
        AttributeValue::List(items)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(items: Vec<&str>) -> Self {
        AttributeValue::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Metadata for one catalog entry. Field order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    attributes: IndexMap<String, AttributeValue>,
}

impl Record {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<AttributeValue>) -> Option<AttributeValue> {
        self.attributes.insert(field.to_string(), value.into())
    }

    #[inline]
    pub fn get(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }

    /// Text of a field for document building, empty when absent
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(AttributeValue::to_text).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The full attribute set serialized as JSON and lowercased.
    /// This is the haystack both search modes work against.
    pub fn search_text(&self) -> String {
        serde_json::to_string(&self.attributes)
            .map(|s| s.to_lowercase())
            .unwrap_or_default()
    }
}

/// Folder of a filename: the segment before the first separator
#[inline]
pub fn folder_of(filename: &str) -> Option<&str> {
    filename.split_once(FOLDER_SEPARATOR).map(|(folder, _)| folder)
}
