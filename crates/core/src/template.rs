//! Header metadata vocabulary and new-workbook templates.

use crate::error::{ConvertError, Result};
use crate::header::{HEADER_ROW_COUNT, SHEET_NAME_SUFFIX};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Empty data rows written below a fresh header.
pub const TEMPLATE_BLANK_ROWS: usize = 5;

/// Which consumer a field is exported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Client,
    Server,
    Editor,
    #[default]
    Both,
}

impl ExportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportType::Client => "client",
            ExportType::Server => "server",
            ExportType::Editor => "editor",
            ExportType::Both => "both",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized constraint cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Required,
    #[default]
    Optional,
    Repeated,
    OptionalStruct,
    RequiredStruct,
}

impl Constraint {
    pub fn as_str(self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Optional => "optional",
            Constraint::Repeated => "repeated",
            Constraint::OptionalStruct => "optional_struct",
            Constraint::RequiredStruct => "required_struct",
        }
    }
}

/// Normalize an export-target cell. Unknown values mean both sides.
pub fn normalize_export_type(value: &str) -> ExportType {
    match value.trim().to_lowercase().as_str() {
        "c" | "cli" | "client" => ExportType::Client,
        "s" | "svr" | "server" => ExportType::Server,
        "e" | "edt" | "editor" => ExportType::Editor,
        _ => ExportType::Both,
    }
}

/// Normalize a constraint cell, accepting single-letter shorthands. Unknown
/// values mean optional.
pub fn normalize_constraint(value: &str) -> Constraint {
    match value.trim().to_lowercase().as_str() {
        "r" | "required" => Constraint::Required,
        "m" | "repeated" => Constraint::Repeated,
        "os" | "optional_struct" => Constraint::OptionalStruct,
        "rs" | "required_struct" => Constraint::RequiredStruct,
        _ => Constraint::Optional,
    }
}

fn sheet_name_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z_]+_CONF$").expect("valid regex"))
}

/// Check that a new sheet name is upper-case words ending with `_CONF`.
pub fn validate_sheet_name(name: &str) -> bool {
    sheet_name_regex().is_match(name)
}

/// One column of a new header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderColumn {
    pub constraint: String,
    pub data_type: String,
    pub name: String,
    #[serde(default)]
    pub export_type: String,
    #[serde(default)]
    pub description: String,
}

impl HeaderColumn {
    pub fn new(constraint: &str, data_type: &str, name: &str, description: &str) -> Self {
        Self {
            constraint: constraint.to_string(),
            data_type: data_type.to_string(),
            name: name.to_string(),
            export_type: "b".to_string(),
            description: description.to_string(),
        }
    }
}

/// Layout of a new configuration sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTemplate {
    pub sheet_name: String,
    pub columns: Vec<HeaderColumn>,
}

impl SheetTemplate {
    /// Get the five header rows for this template.
    pub fn header_rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![Vec::with_capacity(self.columns.len()); HEADER_ROW_COUNT];
        for column in &self.columns {
            rows[0].push(column.constraint.clone());
            rows[1].push(column.data_type.clone());
            rows[2].push(column.name.clone());
            rows[3].push(column.export_type.clone());
            rows[4].push(column.description.clone());
        }
        rows
    }
}

impl Default for SheetTemplate {
    fn default() -> Self {
        default_template()
    }
}

/// Get the starter layout for a new workbook.
pub fn default_template() -> SheetTemplate {
    SheetTemplate {
        sheet_name: format!("EXAMPLE{SHEET_NAME_SUFFIX}"),
        columns: vec![
            HeaderColumn::new("required", "uint32", "id", "Unique identifier"),
            HeaderColumn::new("optional", "string", "name", "Display name"),
            HeaderColumn::new("optional", "int32", "level", "Level requirement"),
            HeaderColumn::new("optional", "string", "description", "Description text"),
        ],
    }
}

/// Write a new workbook holding one sheet with a styled header block.
///
/// # Errors
///
/// Returns `InvalidSheetName` if the template's sheet name is not upper-case
/// words ending with `_CONF`, or an error if the workbook cannot be written.
pub fn create_template_workbook(path: impl AsRef<Path>, template: &SheetTemplate) -> Result<()> {
    if !validate_sheet_name(&template.sheet_name) {
        return Err(ConvertError::InvalidSheetName(template.sheet_name.clone()));
    }
    sheetconf_sheet::write_header_template(
        path.as_ref(),
        &template.sheet_name,
        &template.header_rows(),
        TEMPLATE_BLANK_ROWS,
    )?;
    tracing::info!(
        path = %path.as_ref().display(),
        sheet = %template.sheet_name,
        "created template workbook"
    );
    Ok(())
}
