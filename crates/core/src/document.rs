//! Nested data documents exchanged through YAML.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sheetconf_sheet::CellValue;
use std::sync::OnceLock;

/// One data row as a field-name keyed map, in column order.
pub type Document = IndexMap<String, DocValue>;

/// A value inside a [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<DocValue>),
    Map(Document),
}

impl DocValue {
    /// Get a short name for this value's shape, for warnings.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DocValue::Null => "null",
            DocValue::Bool(_) => "bool",
            DocValue::Int(_) => "integer",
            DocValue::Float(_) => "float",
            DocValue::String(_) => "string",
            DocValue::List(_) => "list",
            DocValue::Map(_) => "map",
        }
    }

    /// Convert a scalar to a cell value. Lists and maps have no cell form.
    pub fn to_cell(&self) -> Option<CellValue> {
        match self {
            DocValue::Null => Some(CellValue::Null),
            DocValue::Bool(b) => Some(CellValue::Bool(*b)),
            DocValue::Int(i) => Some(CellValue::Int(*i)),
            DocValue::Float(f) => Some(CellValue::Float(*f)),
            DocValue::String(s) => Some(CellValue::String(s.clone())),
            DocValue::List(_) | DocValue::Map(_) => None,
        }
    }
}

impl From<&str> for DocValue {
    fn from(s: &str) -> Self {
        DocValue::String(s.to_string())
    }
}

impl From<i64> for DocValue {
    fn from(i: i64) -> Self {
        DocValue::Int(i)
    }
}

impl From<Document> for DocValue {
    fn from(doc: Document) -> Self {
        DocValue::Map(doc)
    }
}

/// The per-sheet data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    pub sheet_name: String,
    #[serde(default)]
    pub data: Vec<Document>,
}

fn integer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+$").expect("valid regex"))
}

fn float_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+\.\d+$").expect("valid regex"))
}

/// Infer a typed value from a cell's text.
///
/// Integers and decimals become numbers, `true`/`false` (any case) become
/// booleans, and everything else stays a string. Integers too large for
/// `i64` stay strings so no digits are lost.
pub fn sniff(text: &str) -> DocValue {
    let text = text.trim();
    if integer_regex().is_match(text) {
        if let Ok(i) = text.parse::<i64>() {
            return DocValue::Int(i);
        }
    } else if float_regex().is_match(text) {
        if let Ok(f) = text.parse::<f64>() {
            return DocValue::Float(f);
        }
    } else if text.eq_ignore_ascii_case("true") {
        return DocValue::Bool(true);
    } else if text.eq_ignore_ascii_case("false") {
        return DocValue::Bool(false);
    }
    DocValue::String(text.to_string())
}
