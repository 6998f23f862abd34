//! Data type grammar for header cells.
//!
//! A data type token is one of the protobuf scalar names (case-insensitive),
//! `enum.{TypeName}`, or one of the time types `DateTime` / `TimeDuration`.

use crate::error::{TypeError, TypeErrorKind};
use regex::Regex;
use std::fmt;

/// Protobuf scalar types accepted in a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub const ALL: [ScalarType; 15] = [
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::Uint32,
        ScalarType::Uint64,
        ScalarType::Sint32,
        ScalarType::Sint64,
        ScalarType::Fixed32,
        ScalarType::Fixed64,
        ScalarType::Sfixed32,
        ScalarType::Sfixed64,
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Bytes,
    ];

    /// Get the protobuf spelling of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }

    /// Look up a scalar type by name, ignoring case.
    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

/// A data type token resolved to what the schema should reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Scalar(ScalarType),
    /// `enum.Quality` resolves to `Enum("Quality")`.
    Enum(String),
    DateTime,
    TimeDuration,
}

impl ResolvedType {
    /// Get the type name as written in a field line.
    pub fn proto_name(&self) -> &str {
        match self {
            ResolvedType::Scalar(scalar) => scalar.as_str(),
            ResolvedType::Enum(name) => name,
            ResolvedType::DateTime => "DateTime",
            ResolvedType::TimeDuration => "TimeDuration",
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proto_name())
    }
}

const ENUM_PREFIX: &str = "enum.";

fn enum_name_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

fn is_decimal(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a data type token, rejecting anything outside the grammar.
///
/// A token made only of decimal digits is a count cell that leaked into a
/// scalar position and resolves to `int32`.
pub fn resolve_type(token: &str) -> Result<ResolvedType, TypeErrorKind> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TypeErrorKind::Empty);
    }

    if let Some(name) = token.strip_prefix(ENUM_PREFIX) {
        if name.is_empty() {
            return Err(TypeErrorKind::MissingEnumName);
        }
        if !enum_name_regex().is_match(name) {
            return Err(TypeErrorKind::InvalidEnumName);
        }
        return Ok(ResolvedType::Enum(name.to_string()));
    }

    match token {
        "DateTime" => return Ok(ResolvedType::DateTime),
        "TimeDuration" => return Ok(ResolvedType::TimeDuration),
        _ => {}
    }

    if let Some(scalar) = ScalarType::from_token(token) {
        return Ok(ResolvedType::Scalar(scalar));
    }
    if is_decimal(token) {
        return Ok(ResolvedType::Scalar(ScalarType::Int32));
    }
    Err(TypeErrorKind::Unsupported)
}

/// Resolve the data type cell of a header column, naming the cell on failure.
///
/// `column` is 1-based. The error's `Display` lists every supported type.
pub fn validate_data_type(
    token: &str,
    sheet: &str,
    column: usize,
    field: &str,
) -> Result<ResolvedType, TypeError> {
    resolve_type(token).map_err(|kind| TypeError {
        sheet: sheet.to_string(),
        column,
        field: field.to_string(),
        token: token.to_string(),
        kind,
    })
}

/// Map a data type token to a schema type name, if it is valid.
pub fn normalize_type(token: &str) -> Option<String> {
    resolve_type(token).ok().map(|t| t.proto_name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_are_case_insensitive() {
        assert_eq!(
            resolve_type("UINT32"),
            Ok(ResolvedType::Scalar(ScalarType::Uint32))
        );
        assert_eq!(normalize_type("String").as_deref(), Some("string"));
        assert_eq!(normalize_type(" double ").as_deref(), Some("double"));
        for scalar in ScalarType::ALL {
            assert_eq!(ScalarType::from_token(scalar.as_str()), Some(scalar));
        }
    }

    #[test]
    fn test_enum_types() {
        assert_eq!(
            resolve_type("enum.Quality"),
            Ok(ResolvedType::Enum("Quality".to_string()))
        );
        assert_eq!(normalize_type("enum.item_kind").as_deref(), Some("item_kind"));
        assert_eq!(resolve_type("enum."), Err(TypeErrorKind::MissingEnumName));
        assert_eq!(
            resolve_type("enum.Bad-Name"),
            Err(TypeErrorKind::InvalidEnumName)
        );
        assert_eq!(resolve_type("enum.2nd"), Err(TypeErrorKind::InvalidEnumName));
    }

    #[test]
    fn test_time_types_are_exact() {
        assert_eq!(resolve_type("DateTime"), Ok(ResolvedType::DateTime));
        assert_eq!(resolve_type("TimeDuration"), Ok(ResolvedType::TimeDuration));
        assert_eq!(resolve_type("datetime"), Err(TypeErrorKind::Unsupported));
    }

    #[test]
    fn test_decimal_tokens_map_to_int32() {
        assert_eq!(normalize_type("3").as_deref(), Some("int32"));
        assert_eq!(resolve_type("-3"), Err(TypeErrorKind::Unsupported));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(resolve_type(""), Err(TypeErrorKind::Empty));
        assert_eq!(resolve_type("   "), Err(TypeErrorKind::Empty));
        assert_eq!(resolve_type("varchar"), Err(TypeErrorKind::Unsupported));
        assert_eq!(resolve_type("int"), Err(TypeErrorKind::Unsupported));
        assert!(normalize_type("map<string,int32>").is_none());
    }

    #[test]
    fn test_validate_names_the_cell() {
        assert_eq!(
            validate_data_type("sfixed64", "ITEM_CONF", 3, "weight"),
            Ok(ResolvedType::Scalar(ScalarType::Sfixed64))
        );

        let err = validate_data_type("varchar", "ITEM_CONF", 2, "name").unwrap_err();
        assert_eq!(err.sheet, "ITEM_CONF");
        assert_eq!(err.column, 2);
        assert_eq!(err.field, "name");
        assert_eq!(err.token, "varchar");
        assert_eq!(err.kind, TypeErrorKind::Unsupported);
        let msg = err.to_string();
        assert!(msg.contains("unsupported data type 'varchar'"));
        assert!(msg.contains("enum.{TypeName}"));
        assert!(msg.contains("DateTime, TimeDuration"));
    }
}
