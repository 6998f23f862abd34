//! Error types for sheetconf.

use crate::checker::{format_findings, Finding};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Result type for sheetconf operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting workbooks.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Malformed struct or repeated-struct header.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Unsupported data type token in a header.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// The rendered schema text failed the syntax checker.
    #[error("Proto syntax validation failed for {file}:\n{}", format_findings(.findings))]
    Validation { file: String, findings: Vec<Finding> },

    /// No worksheet name ends with the qualifying suffix.
    #[error("No valid {suffix} sheets found in Excel file")]
    NoQualifyingSheets { suffix: String },

    /// A qualifying sheet is too short to hold its header block.
    #[error("Sheet {sheet} has less than {required} rows")]
    InsufficientRows { sheet: String, required: usize },

    /// Template sheet names must be upper-case words ending with the suffix.
    #[error("Invalid sheet name: {0} (must be uppercase letters and underscores, ending with _CONF)")]
    InvalidSheetName(String),

    /// The external schema compiler rejected a file or could not be run.
    #[error("protoc validation failed: {0}")]
    Protoc(String),

    /// Spreadsheet container error.
    #[error("Sheet error: {0}")]
    Sheet(#[from] sheetconf_sheet::SheetError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What was wrong with a count cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureErrorKind {
    /// Member count on a `struct` marker.
    MemberCount,
    /// Repeat count on a `repeated` marker followed by `struct`.
    RepeatCount,
    /// Member count on the `struct` marker inside a repeated group.
    RepeatedMemberCount,
    /// Repeat count whose groups do not fit in the header.
    RegionOverflow,
}

/// A count cell in the header that is not a positive integer, or a repeat
/// count too large for the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureError {
    pub sheet: String,
    /// 1-based column of the offending cell.
    pub column: usize,
    pub field: String,
    pub value: String,
    pub kind: StructureErrorKind,
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sheet [{}] column {} [{}]: ", self.sheet, self.column, self.field)?;
        let what = match self.kind {
            StructureErrorKind::MemberCount => "struct member count",
            StructureErrorKind::RepeatCount => "repeated count",
            StructureErrorKind::RepeatedMemberCount => "repeated struct member count",
            StructureErrorKind::RegionOverflow => {
                return write!(
                    f,
                    "repeated count '{}' spans more columns than the header has",
                    self.value
                );
            }
        };
        write!(f, "{what} must be a positive integer, got '{}'", self.value)
    }
}

impl std::error::Error for StructureError {}

/// Why a data type token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeErrorKind {
    Empty,
    /// `enum.` with nothing after the dot.
    MissingEnumName,
    /// `enum.X` where X is not an identifier.
    InvalidEnumName,
    Unsupported,
}

/// A header data type token outside the supported grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub sheet: String,
    /// 1-based column of the offending cell.
    pub column: usize,
    pub field: String,
    pub token: String,
    pub kind: TypeErrorKind,
}

pub(crate) const SUPPORTED_TYPES_HELP: &str = "Supported types:\n\
    - integer: int32, int64, uint32, uint64, sint32, sint64, fixed32, fixed64, sfixed32, sfixed64\n\
    - floating point: float, double\n\
    - other: bool, string, bytes\n\
    - enum: enum.{TypeName}\n\
    - time: DateTime, TimeDuration";

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sheet [{}] column {} [{}]: ", self.sheet, self.column, self.field)?;
        match self.kind {
            TypeErrorKind::Empty => f.write_str("data type must not be empty")?,
            TypeErrorKind::MissingEnumName => write!(
                f,
                "enum type must be written as enum.{{TypeName}}, got '{}'",
                self.token
            )?,
            TypeErrorKind::InvalidEnumName => write!(
                f,
                "enum type name must be a valid identifier, got '{}'",
                self.token
            )?,
            TypeErrorKind::Unsupported => write!(f, "unsupported data type '{}'", self.token)?,
        }
        write!(f, "\n\n{SUPPORTED_TYPES_HELP}")
    }
}

impl std::error::Error for TypeError {}

impl ConvertError {
    /// Create a validation failure for a rendered schema file.
    pub fn validation(file: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self::Validation {
            file: file.into(),
            findings,
        }
    }

    /// Create an insufficient-rows error.
    pub fn insufficient_rows(sheet: impl Into<String>, required: usize) -> Self {
        Self::InsufficientRows {
            sheet: sheet.into(),
            required,
        }
    }
}

/// Attach the offending path to an I/O error.
pub(crate) fn io_context(path: &Path, err: std::io::Error) -> ConvertError {
    ConvertError::Io(std::io::Error::new(
        err.kind(),
        format!("{}: {err}", path.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_error_names_the_cell() {
        let err = StructureError {
            sheet: "ITEM_CONF".to_string(),
            column: 4,
            field: "rewards".to_string(),
            value: "abc".to_string(),
            kind: StructureErrorKind::RepeatCount,
        };
        let msg = err.to_string();
        assert!(msg.contains("ITEM_CONF"));
        assert!(msg.contains("column 4"));
        assert!(msg.contains("[rewards]"));
        assert!(msg.contains("'abc'"));
    }

    #[test]
    fn test_type_error_lists_supported_categories() {
        let err = TypeError {
            sheet: "ITEM_CONF".to_string(),
            column: 2,
            field: "name".to_string(),
            token: "varchar".to_string(),
            kind: TypeErrorKind::Unsupported,
        };
        let msg = ConvertError::from(err).to_string();
        assert!(msg.contains("unsupported data type 'varchar'"));
        assert!(msg.contains("enum.{TypeName}"));
        assert!(msg.contains("DateTime, TimeDuration"));
    }
}
