//! Conversion between one spreadsheet data row and one [`Document`].
//!
//! Both directions locate cells by the descriptor's header column. Members of
//! the g-th group of a repeated struct sit `g * group_width` columns to the
//! right of the first group, so nested repeats shift by the sum of their
//! ancestors' offsets.

use crate::columns::{ColumnDescriptor, ColumnKind, StructInfo};
use crate::document::{sniff, DocValue, Document};
use sheetconf_sheet::CellValue;
use std::fmt;

/// A document value that did not fit the column layout.
///
/// The affected region is skipped (or truncated) and the rest of the row is
/// still written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeWarning {
    Mismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    Truncated {
        field: String,
        capacity: usize,
        supplied: usize,
    },
}

impl fmt::Display for ShapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeWarning::Mismatch {
                field,
                expected,
                found,
            } => write!(f, "field '{field}': expected {expected}, found {found}; skipped"),
            ShapeWarning::Truncated {
                field,
                capacity,
                supplied,
            } => write!(
                f,
                "field '{field}': {supplied} values supplied but only {capacity} fit; extra values dropped"
            ),
        }
    }
}

fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

// ===== Row -> Document =====

/// Decode a data row (cell text per column) into a document.
///
/// Scalars are sniffed into numbers, booleans or strings. A repeated scalar
/// becomes a one-element list, or an empty list when its cell is empty.
pub fn row_to_document(row: &[String], columns: &[ColumnDescriptor]) -> Document {
    read_fields(row, columns, 0)
}

fn cell_text(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", String::as_str)
}

fn read_fields(row: &[String], columns: &[ColumnDescriptor], shift: usize) -> Document {
    columns
        .iter()
        .map(|column| (column.name.clone(), read_value(row, column, shift)))
        .collect()
}

fn read_value(row: &[String], column: &ColumnDescriptor, shift: usize) -> DocValue {
    let at = column.index + shift;
    match &column.kind {
        ColumnKind::Scalar => sniff(cell_text(row, at)),
        ColumnKind::RepeatedScalar => {
            let text = cell_text(row, at).trim();
            if text.is_empty() {
                DocValue::List(Vec::new())
            } else {
                DocValue::List(vec![sniff(text)])
            }
        }
        ColumnKind::Struct(info) => DocValue::Map(read_fields(row, &info.members, shift)),
        ColumnKind::RepeatedStruct(info) => DocValue::List(
            (0..info.repeat_count)
                .map(|g| DocValue::Map(read_fields(row, &info.members, shift + g * info.group_width)))
                .collect(),
        ),
    }
}

// ===== Document -> Row =====

/// Encode a document into `row`, writing only the cells its columns cover.
///
/// Fields missing from the document leave their cells untouched. Groups of a
/// repeated struct beyond the supplied list are blanked.
pub fn document_to_row(
    document: &Document,
    columns: &[ColumnDescriptor],
    row: &mut Vec<CellValue>,
) -> Vec<ShapeWarning> {
    let mut writer = RowWriter {
        row,
        warnings: Vec::new(),
    };
    writer.fields(document, columns, 0, "");
    writer.warnings
}

struct RowWriter<'a> {
    row: &'a mut Vec<CellValue>,
    warnings: Vec<ShapeWarning>,
}

impl RowWriter<'_> {
    fn put(&mut self, col: usize, value: CellValue) {
        if col >= self.row.len() {
            self.row.resize(col + 1, CellValue::Null);
        }
        self.row[col] = value;
    }

    fn blank(&mut self, start: usize, width: usize) {
        for cell in self.row.iter_mut().skip(start).take(width) {
            *cell = CellValue::Null;
        }
    }

    fn warn(&mut self, warning: ShapeWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn mismatch(&mut self, field: String, expected: &'static str, found: &DocValue) {
        self.warn(ShapeWarning::Mismatch {
            field,
            expected,
            found: found.kind_name(),
        });
    }

    fn fields(&mut self, document: &Document, columns: &[ColumnDescriptor], shift: usize, prefix: &str) {
        for column in columns {
            if let Some(value) = document.get(&column.name) {
                self.value(value, column, shift, child_path(prefix, &column.name));
            }
        }
    }

    fn value(&mut self, value: &DocValue, column: &ColumnDescriptor, shift: usize, path: String) {
        let at = column.index + shift;
        match &column.kind {
            ColumnKind::Scalar => match value.to_cell() {
                Some(cell) => self.put(at, cell),
                None => self.mismatch(path, "scalar", value),
            },
            ColumnKind::RepeatedScalar => match value {
                DocValue::List(items) => {
                    let first = items.first().and_then(DocValue::to_cell);
                    self.put(at, first.unwrap_or(CellValue::Null));
                    if items.len() > 1 {
                        self.warn(ShapeWarning::Truncated {
                            field: path,
                            capacity: 1,
                            supplied: items.len(),
                        });
                    }
                }
                other => self.mismatch(path, "list", other),
            },
            ColumnKind::Struct(info) => match value {
                DocValue::Map(members) => self.fields(members, &info.members, shift, &path),
                other => self.mismatch(path, "map", other),
            },
            ColumnKind::RepeatedStruct(info) => match value {
                DocValue::List(items) => self.groups(items, column.index + 2, info, shift, &path),
                other => self.mismatch(path, "list", other),
            },
        }
    }

    fn groups(&mut self, items: &[DocValue], start: usize, info: &StructInfo, shift: usize, path: &str) {
        for g in 0..info.repeat_count {
            let group_shift = shift + g * info.group_width;
            let group_path = format!("{path}[{g}]");
            match items.get(g) {
                Some(DocValue::Map(members)) => {
                    self.fields(members, &info.members, group_shift, &group_path);
                }
                Some(other) => {
                    self.mismatch(group_path, "map", other);
                    self.blank(start + group_shift, info.group_width);
                }
                None => self.blank(start + group_shift, info.group_width),
            }
        }
        if items.len() > info.repeat_count {
            self.warn(ShapeWarning::Truncated {
                field: path.to_string(),
                capacity: info.repeat_count,
                supplied: items.len(),
            });
        }
    }
}
