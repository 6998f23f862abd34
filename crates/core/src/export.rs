//! Workbook-level export of schema files and data files.

use crate::checker::check_proto_syntax;
use crate::codec::row_to_document;
use crate::columns::parse_columns;
use crate::document::SheetData;
use crate::error::{io_context, ConvertError, Result};
use crate::header::{
    is_config_sheet, HeaderRows, DATA_ROW_START, HEADER_ROW_COUNT, SHEET_NAME_SUFFIX,
    YAML_EXTENSION,
};
use crate::protoc::check_with_protoc;
use crate::schema::{generate_message, proto_file_name, render_proto_file, Message};
use sheetconf_sheet::{Book, CellValue, Sheet};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for schema export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Also run `protoc` on every written file. Failures only warn.
    pub run_protoc: bool,
}

/// Files written by [`export_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub proto_files: Vec<PathBuf>,
    pub yaml_files: Vec<PathBuf>,
}

/// Get the data file name for a sheet: `ITEM_CONF` becomes `item_conf.yaml`.
pub fn yaml_file_name(sheet_name: &str) -> String {
    sheet_name.to_lowercase() + YAML_EXTENSION
}

fn config_sheets(book: &Book) -> Vec<(&str, &Sheet)> {
    book.sheets()
        .filter(|(name, _)| {
            let keep = is_config_sheet(name);
            if !keep {
                tracing::debug!(sheet = name, "skipping sheet without {SHEET_NAME_SUFFIX} suffix");
            }
            keep
        })
        .collect()
}

fn no_qualifying_sheets() -> ConvertError {
    ConvertError::NoQualifyingSheets {
        suffix: SHEET_NAME_SUFFIX.to_string(),
    }
}

// ===== Schema Export =====

/// Generate one message per qualifying sheet, in workbook order.
///
/// # Errors
///
/// Fails on the first sheet with a short header, a bad count or an
/// unsupported type, and when no sheet qualifies.
pub fn generate_messages(book: &Book) -> Result<Vec<Message>> {
    let sheets = config_sheets(book);
    if sheets.is_empty() {
        return Err(no_qualifying_sheets());
    }
    sheets
        .into_iter()
        .map(|(_, sheet)| generate_message(&HeaderRows::from_sheet(sheet)?))
        .collect()
}

/// Render a message and run the syntax checker over the result.
///
/// Returns the file name and the schema text.
pub fn render_checked(message: &Message) -> Result<(String, String)> {
    let file_name = proto_file_name(&message.name);
    let text = render_proto_file(message);
    let findings = check_proto_syntax(&text);
    if !findings.is_empty() {
        return Err(ConvertError::validation(file_name, findings));
    }
    Ok((file_name, text))
}

/// Write a schema file per qualifying sheet of a workbook into `output_dir`.
///
/// Nothing is written unless every sheet generates and validates.
pub fn export_protobuf(
    xlsx_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: ExportOptions,
) -> Result<Vec<PathBuf>> {
    let xlsx_path = xlsx_path.as_ref();
    let output_dir = output_dir.as_ref();
    tracing::info!(file = %xlsx_path.display(), "exporting proto schemas");

    let book = Book::from_xlsx(xlsx_path)?;
    let rendered = generate_messages(&book)?
        .iter()
        .map(render_checked)
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(output_dir).map_err(|e| io_context(output_dir, e))?;
    let mut written = Vec::with_capacity(rendered.len());
    for (file_name, text) in rendered {
        let path = output_dir.join(&file_name);
        fs::write(&path, text).map_err(|e| io_context(&path, e))?;
        tracing::info!(path = %path.display(), "wrote proto file");

        if options.run_protoc {
            if let Err(e) = check_with_protoc(&path) {
                tracing::warn!(path = %path.display(), "{e}");
            }
        }
        written.push(path);
    }
    Ok(written)
}

// ===== Data Export =====

fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_blank)
}

/// Decode every non-blank data row of a sheet.
///
/// # Errors
///
/// Returns `InsufficientRows` when the sheet has no row below its header.
pub fn sheet_to_data(sheet: &Sheet) -> Result<SheetData> {
    if sheet.row_count() < DATA_ROW_START {
        return Err(ConvertError::insufficient_rows(sheet.name(), DATA_ROW_START));
    }
    let header = HeaderRows::from_sheet(sheet)?;
    let columns = parse_columns(&header)?;

    let data = sheet
        .rows()
        .enumerate()
        .skip(HEADER_ROW_COUNT)
        .filter(|(_, row)| !is_blank_row(row))
        .map(|(i, _)| row_to_document(&sheet.string_row(i), &columns))
        .collect();

    Ok(SheetData {
        sheet_name: sheet.name().to_string(),
        data,
    })
}

/// Decode every qualifying sheet of a workbook.
pub fn book_to_data(book: &Book) -> Result<Vec<SheetData>> {
    let sheets = config_sheets(book);
    if sheets.is_empty() {
        return Err(no_qualifying_sheets());
    }
    sheets
        .into_iter()
        .map(|(_, sheet)| sheet_to_data(sheet))
        .collect()
}

/// Write a data file per qualifying sheet of a workbook into `output_dir`.
pub fn export_yaml(xlsx_path: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let xlsx_path = xlsx_path.as_ref();
    let output_dir = output_dir.as_ref();
    tracing::info!(file = %xlsx_path.display(), "exporting yaml data");

    let book = Book::from_xlsx(xlsx_path)?;
    let sheets = book_to_data(&book)?;

    fs::create_dir_all(output_dir).map_err(|e| io_context(output_dir, e))?;
    let mut written = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let path = output_dir.join(yaml_file_name(&sheet.sheet_name));
        let text = serde_yaml::to_string(&sheet)?;
        fs::write(&path, text).map_err(|e| io_context(&path, e))?;
        tracing::info!(path = %path.display(), rows = sheet.data.len(), "wrote yaml file");
        written.push(path);
    }
    Ok(written)
}

/// Export schemas, then data. A schema failure stops before any data export.
pub fn export_all(
    xlsx_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: ExportOptions,
) -> Result<ExportSummary> {
    let proto_files = export_protobuf(xlsx_path.as_ref(), output_dir.as_ref(), options)?;
    let yaml_files = export_yaml(xlsx_path.as_ref(), output_dir.as_ref())?;
    Ok(ExportSummary {
        proto_files,
        yaml_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocValue;

    fn item_sheet() -> Sheet {
        Sheet::from_data(vec![
            vec!["required", "optional", "optional"],
            vec!["uint32", "string", "int32"],
            vec!["id", "name", "level"],
            vec!["b", "c", "s"],
            vec!["Id", "Name", "Level"],
            vec!["1", "sword", "10"],
            vec!["", " ", ""],
            vec!["2", "shield", "3"],
        ])
    }

    fn book_with(sheets: Vec<(&str, Sheet)>) -> Book {
        let mut book = Book::new();
        for (name, sheet) in sheets {
            book.add_sheet(name, sheet).unwrap();
        }
        book
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let book = book_with(vec![("ITEM_CONF", item_sheet())]);
        let data = sheet_to_data(book.get_sheet("ITEM_CONF").unwrap()).unwrap();
        assert_eq!(data.sheet_name, "ITEM_CONF");
        assert_eq!(data.data.len(), 2);
        assert_eq!(data.data[1]["name"], DocValue::String("shield".to_string()));
    }

    #[test]
    fn test_only_suffixed_sheets_export() {
        let book = book_with(vec![
            ("Notes", Sheet::from_data(vec![vec!["free text"]])),
            ("ITEM_CONF", item_sheet()),
        ]);
        let messages = generate_messages(&book).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].name, "ItemConfig");
        assert_eq!(book_to_data(&book).unwrap().len(), 1);
    }

    #[test]
    fn test_no_qualifying_sheets() {
        let book = book_with(vec![("Notes", Sheet::from_data(vec![vec!["x"]]))]);
        assert!(matches!(
            generate_messages(&book),
            Err(ConvertError::NoQualifyingSheets { .. })
        ));
        assert!(matches!(
            book_to_data(&book),
            Err(ConvertError::NoQualifyingSheets { .. })
        ));
    }

    #[test]
    fn test_short_sheets_fail() {
        let mut header_only = item_sheet();
        header_only.truncate_rows(HEADER_ROW_COUNT);
        let book = book_with(vec![("ITEM_CONF", header_only)]);
        assert!(generate_messages(&book).is_ok());
        assert!(matches!(
            book_to_data(&book),
            Err(ConvertError::InsufficientRows { required: 6, .. })
        ));

        let mut tiny = item_sheet();
        tiny.truncate_rows(3);
        let book = book_with(vec![("ITEM_CONF", tiny)]);
        assert!(matches!(
            generate_messages(&book),
            Err(ConvertError::InsufficientRows { required: 5, .. })
        ));
    }

    #[test]
    fn test_render_checked() {
        let book = book_with(vec![("ITEM_CONF", item_sheet())]);
        let messages = generate_messages(&book).unwrap();
        let (file_name, text) = render_checked(&messages[0]).unwrap();
        assert_eq!(file_name, "item_conf.proto");
        assert!(text.contains("  uint32 id = 1;\n"));
    }

    #[test]
    fn test_duplicate_nested_names_fail_validation() {
        let sheet = Sheet::from_data(vec![
            vec!["struct", "optional", "struct", "optional"],
            vec!["1", "int32", "1", "int32"],
            vec!["pos", "x", "pos", "y"],
            vec!["", "", "", ""],
            vec!["", "", "", ""],
        ]);
        let book = book_with(vec![("MAP_CONF", sheet)]);
        let messages = generate_messages(&book).unwrap();
        let err = render_checked(&messages[0]).unwrap_err();
        match err {
            ConvertError::Validation { file, findings } => {
                assert_eq!(file, "map_conf.proto");
                assert_eq!(findings.len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_yaml_file_name() {
        assert_eq!(yaml_file_name("ITEM_DROP_CONF"), "item_drop_conf.yaml");
    }
}
