//! The header block at the top of every qualifying sheet.
//!
//! Row 1 holds constraints, row 2 data types (or counts), row 3 field names,
//! row 4 export targets and row 5 free-text descriptions. Data starts at row 6.

use crate::error::{ConvertError, Result, StructureError, StructureErrorKind};
use sheetconf_sheet::Sheet;

/// Sheets are converted only when their name ends with this suffix.
pub const SHEET_NAME_SUFFIX: &str = "_CONF";
/// Number of header rows above the first data row.
pub const HEADER_ROW_COUNT: usize = 5;
/// 1-based row number of the first data row.
pub const DATA_ROW_START: usize = 6;
/// Extension of per-sheet data documents.
pub const YAML_EXTENSION: &str = ".yaml";
/// Suffix of generated schema file names.
pub const PROTO_SUFFIX: &str = "_conf.proto";

/// Constraint or data type cell that marks a filler column.
pub const SKIP_MARKER: &str = "*";
const STRUCT_MARKER: &str = "struct";
const REPEATED_MARKER: &str = "repeated";

/// Whether a worksheet takes part in conversion.
pub fn is_config_sheet(name: &str) -> bool {
    name.ends_with(SHEET_NAME_SUFFIX)
}

/// The four machine-read header rows of one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRows {
    sheet: String,
    constraints: Vec<String>,
    data_types: Vec<String>,
    names: Vec<String>,
    export_types: Vec<String>,
}

/// How a single header column is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnClass {
    /// Empty name, or `*` as constraint or data type.
    Skip,
    Scalar,
    RepeatedScalar,
    Struct { member_count: usize },
    /// A `repeated` column immediately followed by a `struct` column.
    RepeatedStruct {
        repeat_count: usize,
        member_count: usize,
    },
}

impl HeaderRows {
    pub fn new(
        sheet: impl Into<String>,
        constraints: Vec<String>,
        data_types: Vec<String>,
        names: Vec<String>,
        export_types: Vec<String>,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            constraints,
            data_types,
            names,
            export_types,
        }
    }

    /// Read the header block of a sheet.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientRows` if the sheet has fewer than
    /// [`HEADER_ROW_COUNT`] rows.
    pub fn from_sheet(sheet: &Sheet) -> Result<Self> {
        if sheet.row_count() < HEADER_ROW_COUNT {
            return Err(ConvertError::insufficient_rows(
                sheet.name(),
                HEADER_ROW_COUNT,
            ));
        }
        Ok(Self::new(
            sheet.name(),
            sheet.string_row(0),
            sheet.string_row(1),
            sheet.string_row(2),
            sheet.string_row(3),
        ))
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet
    }

    /// Get the number of columns, taken from the longest header row.
    pub fn width(&self) -> usize {
        [
            &self.constraints,
            &self.data_types,
            &self.names,
            &self.export_types,
        ]
        .iter()
        .map(|row| row.len())
        .max()
        .unwrap_or(0)
    }

    pub fn constraint(&self, col: usize) -> &str {
        cell(&self.constraints, col)
    }

    pub fn data_type(&self, col: usize) -> &str {
        cell(&self.data_types, col)
    }

    pub fn name(&self, col: usize) -> &str {
        cell(&self.names, col)
    }

    pub fn export_type(&self, col: usize) -> &str {
        cell(&self.export_types, col)
    }

    /// Classify the column at `col`, validating any count cells it carries.
    pub(crate) fn classify(&self, col: usize) -> std::result::Result<ColumnClass, StructureError> {
        let constraint = self.constraint(col);
        if self.name(col).is_empty()
            || constraint == SKIP_MARKER
            || self.data_type(col) == SKIP_MARKER
        {
            return Ok(ColumnClass::Skip);
        }

        if constraint.eq_ignore_ascii_case(STRUCT_MARKER) {
            let member_count = self.count(col, StructureErrorKind::MemberCount)?;
            return Ok(ColumnClass::Struct { member_count });
        }

        if constraint.eq_ignore_ascii_case(REPEATED_MARKER) {
            if self.constraint(col + 1).eq_ignore_ascii_case(STRUCT_MARKER) {
                let repeat_count = self.count(col, StructureErrorKind::RepeatCount)?;
                let member_count =
                    self.count(col + 1, StructureErrorKind::RepeatedMemberCount)?;
                return Ok(ColumnClass::RepeatedStruct {
                    repeat_count,
                    member_count,
                });
            }
            return Ok(ColumnClass::RepeatedScalar);
        }

        Ok(ColumnClass::Scalar)
    }

    /// Get the column after a repeated-struct region whose groups start at
    /// `group_start`, where `col` holds the `repeated` marker.
    ///
    /// The region must end within the header. A group of width zero still
    /// cannot repeat more often than the header is wide.
    pub(crate) fn repeated_region_end(
        &self,
        col: usize,
        group_start: usize,
        group_width: usize,
        repeat_count: usize,
    ) -> std::result::Result<usize, StructureError> {
        let end = repeat_count
            .checked_mul(group_width)
            .and_then(|span| span.checked_add(group_start));
        match end {
            Some(end) if end <= self.width() && repeat_count <= self.width() => Ok(end),
            _ => Err(self.structure_error(col, StructureErrorKind::RegionOverflow)),
        }
    }

    fn structure_error(&self, col: usize, kind: StructureErrorKind) -> StructureError {
        StructureError {
            sheet: self.sheet.clone(),
            column: col + 1,
            field: self.name(col).to_string(),
            value: self.data_type(col).to_string(),
            kind,
        }
    }

    fn count(
        &self,
        col: usize,
        kind: StructureErrorKind,
    ) -> std::result::Result<usize, StructureError> {
        match self.data_type(col).parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(self.structure_error(col, kind)),
        }
    }
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", |s| s.trim())
}
