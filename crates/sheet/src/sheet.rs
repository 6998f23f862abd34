use crate::cell::CellValue;

/// A sheet representing a 2D grid of cells (row-major storage).
///
/// Rows may be ragged: spreadsheet files drop trailing empty cells, so a row
/// is only as long as its last populated cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
        }
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns (length of the longest row)
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.iter().map(Vec::len).max().unwrap_or(0)
    }

    // ===== Cell Access =====

    /// Set a cell value by row and column index (0-based), growing the grid
    /// as needed.
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) {
        if self.data.len() <= row {
            self.data.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.data[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Null);
        }
        cells[col] = value.into();
    }

    // ===== Row Operations =====

    /// Get a row rendered as trimmed strings. Missing rows read as empty.
    #[must_use]
    pub fn string_row(&self, index: usize) -> Vec<String> {
        self.data
            .get(index)
            .map(|row| row.iter().map(|cell| cell.as_str().trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Drop every row at index `len` and beyond
    pub fn truncate_rows(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Get rows iterator
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get internal data reference
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable internal data reference
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
