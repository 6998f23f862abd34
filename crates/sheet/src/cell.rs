use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a cell value in a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is null or renders as whitespace only
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Get the value as the string a reader of the cell would see.
    ///
    /// Integral floats render without a fractional part (`42.0` -> `"42"`),
    /// which is how spreadsheet files hand back integers.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_renders_integral_float_without_fraction() {
        assert_eq!(CellValue::Float(42.0).as_str(), "42");
        assert_eq!(CellValue::Float(-3.5).as_str(), "-3.5");
        assert_eq!(CellValue::Int(7).as_str(), "7");
        assert_eq!(CellValue::Null.as_str(), "");
        assert_eq!(CellValue::Bool(true).as_str(), "true");
    }

    #[test]
    fn test_is_blank() {
        assert!(CellValue::Null.is_blank());
        assert!(CellValue::String("   ".to_string()).is_blank());
        assert!(!CellValue::String("x".to_string()).is_blank());
        assert!(!CellValue::Int(0).is_blank());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::from(3), CellValue::Int(3));
        assert_eq!(CellValue::from(2.5), CellValue::Float(2.5));
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
        assert_eq!(CellValue::from("a"), CellValue::String("a".to_string()));
    }
}
