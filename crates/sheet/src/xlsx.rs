use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const TEMPLATE_COLUMN_WIDTH: f64 = 20.0;

fn xlsx_error(e: impl std::fmt::Display) -> SheetError {
    SheetError::Xlsx(e.to_string())
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Materialize a calamine range as a grid anchored at A1.
///
/// calamine trims the used range to the first populated cell, so a sheet whose
/// column A is empty would otherwise shift every column left by one.
fn range_to_grid(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut data: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Null; start_col as usize];
        cells.extend(row.iter().map(data_to_cell_value));
        while matches!(cells.last(), Some(CellValue::Null)) {
            cells.pop();
        }
        data.push(cells);
    }
    data
}

fn cell_coords(row_idx: usize, col_idx: usize) -> Result<(u32, u16)> {
    let row_num = u32::try_from(row_idx).map_err(|_| xlsx_error("Row index overflow"))?;
    let col_num = u16::try_from(col_idx).map_err(|_| xlsx_error("Column index overflow"))?;
    Ok((row_num, col_num))
}

/// Write sheet data to a worksheet
fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    worksheet.set_name(sheet.name()).map_err(xlsx_error)?;

    for (row_idx, row) in sheet.data().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (row_num, col_num) = cell_coords(row_idx, col_idx)?;

            match cell {
                CellValue::Null => {} // Leave empty
                CellValue::Bool(b) => {
                    worksheet
                        .write_boolean(row_num, col_num, *b)
                        .map_err(xlsx_error)?;
                }
                CellValue::Int(i) => {
                    // Note: Excel stores all numbers as f64, so integers > 2^53
                    // may lose precision
                    worksheet
                        .write_number(row_num, col_num, *i as f64)
                        .map_err(xlsx_error)?;
                }
                CellValue::Float(f) => {
                    worksheet
                        .write_number(row_num, col_num, *f)
                        .map_err(xlsx_error)?;
                }
                CellValue::String(s) => {
                    worksheet
                        .write_string(row_num, col_num, s)
                        .map_err(xlsx_error)?;
                }
            }
        }
    }

    Ok(())
}

impl Book {
    /// Load a book from an Excel file (all sheets)
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(|e: XlsxError| xlsx_error(e))?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut book = Book::new();

        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e: XlsxError| xlsx_error(e))?;

            let mut sheet = Sheet::with_name(&sheet_name);
            *sheet.data_mut() = range_to_grid(&range);
            book.add_sheet(&sheet_name, sheet)?;
        }

        Ok(book)
    }

    /// Save the book to an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();

        for (_, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            write_sheet(worksheet, sheet)?;
        }

        workbook.save(path.as_ref()).map_err(xlsx_error)?;
        Ok(())
    }
}

/// Write a new workbook holding a single sheet whose leading rows are a
/// styled header block.
///
/// Header rows get a bold grey style, every header column is 20 wide, the
/// header block is frozen, and `blank_rows` bordered empty rows follow it.
///
/// # Errors
///
/// Returns error if the workbook cannot be built or saved.
pub fn write_header_template<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
    header_rows: &[Vec<String>],
    blank_rows: usize,
) -> Result<()> {
    let border_color = Color::Black;
    let header_format = Format::new()
        .set_bold()
        .set_font_size(11)
        .set_background_color(Color::RGB(0x00E0_E0E0))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);
    let data_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(xlsx_error)?;

    let col_count = header_rows.iter().map(Vec::len).max().unwrap_or(0);
    for (row_idx, row) in header_rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (row_num, col_num) = cell_coords(row_idx, col_idx)?;
            worksheet
                .write_string_with_format(row_num, col_num, value, &header_format)
                .map_err(xlsx_error)?;
        }
    }

    for col_idx in 0..col_count {
        let (_, col_num) = cell_coords(0, col_idx)?;
        worksheet
            .set_column_width(col_num, TEMPLATE_COLUMN_WIDTH)
            .map_err(xlsx_error)?;
    }

    let (header_end, _) = cell_coords(header_rows.len(), 0)?;
    worksheet
        .set_freeze_panes(header_end, 0)
        .map_err(xlsx_error)?;

    for row_idx in header_rows.len()..header_rows.len() + blank_rows {
        for col_idx in 0..col_count {
            let (row_num, col_num) = cell_coords(row_idx, col_idx)?;
            worksheet
                .write_blank(row_num, col_num, &data_format)
                .map_err(xlsx_error)?;
        }
    }

    workbook.save(path.as_ref()).map_err(xlsx_error)?;
    Ok(())
}
