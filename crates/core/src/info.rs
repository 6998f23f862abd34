//! Summary statistics for a workbook.

use crate::error::Result;
use serde::Serialize;
use sheetconf_sheet::{Book, Sheet};
use std::path::Path;

/// Per-sheet statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetInfo {
    pub name: String,
    pub row_count: usize,
    pub col_count: usize,
    /// Non-null cells.
    pub cell_count: usize,
    pub has_data: bool,
}

impl SheetInfo {
    fn from_sheet(name: &str, sheet: &Sheet) -> Self {
        let cell_count = sheet
            .rows()
            .map(|row| row.iter().filter(|cell| !cell.is_null()).count())
            .sum();
        Self {
            name: name.to_string(),
            row_count: sheet.row_count(),
            col_count: sheet.col_count(),
            cell_count,
            has_data: cell_count > 0,
        }
    }
}

/// Workbook-level statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbookInfo {
    pub file_path: String,
    pub file_name: String,
    pub sheet_count: usize,
    pub sheet_names: Vec<String>,
    pub sheet_details: Vec<SheetInfo>,
    /// Sum of every sheet's rows.
    pub total_rows: usize,
    /// Widest sheet's column count.
    pub total_cols: usize,
}

impl WorkbookInfo {
    pub fn from_book(path: &Path, book: &Book) -> Self {
        let sheet_details: Vec<SheetInfo> = book
            .sheets()
            .map(|(name, sheet)| SheetInfo::from_sheet(name, sheet))
            .collect();
        Self {
            file_path: path.display().to_string(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            sheet_count: book.sheet_count(),
            sheet_names: sheet_details.iter().map(|s| s.name.clone()).collect(),
            total_rows: sheet_details.iter().map(|s| s.row_count).sum(),
            total_cols: sheet_details.iter().map(|s| s.col_count).max().unwrap_or(0),
            sheet_details,
        }
    }

    /// Read a workbook and summarize it.
    pub fn from_xlsx(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let book = Book::from_xlsx(path)?;
        Ok(Self::from_book(path, &book))
    }

    /// Render a human-readable report.
    pub fn format(&self) -> String {
        let mut out = String::from("=== Excel File Information ===\n");
        out.push_str(&format!("File: {}\n", self.file_name));
        out.push_str(&format!("Path: {}\n", self.file_path));
        out.push_str(&format!("Total Sheets: {}\n", self.sheet_count));
        out.push_str(&format!("Total Rows: {}\n", self.total_rows));
        out.push_str(&format!("Total Columns: {}\n\n", self.total_cols));

        out.push_str("=== Sheet Details ===\n");
        for (i, sheet) in self.sheet_details.iter().enumerate() {
            out.push_str(&format!("{}. Sheet: {}\n", i + 1, sheet.name));
            out.push_str(&format!(
                "   Rows: {}, Columns: {}, Cells: {}\n",
                sheet.row_count, sheet.col_count, sheet.cell_count
            ));
            out.push_str(&format!("   Has Data: {}\n", sheet.has_data));
        }
        out
    }

    /// Emit the summary through `tracing`.
    pub fn log(&self) {
        tracing::info!(
            file = %self.file_name,
            sheets = self.sheet_count,
            total_rows = self.total_rows,
            total_cols = self.total_cols,
            "workbook info"
        );
        for sheet in &self.sheet_details {
            tracing::info!(
                sheet = %sheet.name,
                rows = sheet.row_count,
                cols = sheet.col_count,
                cells = sheet.cell_count,
                "sheet info"
            );
        }
    }
}
