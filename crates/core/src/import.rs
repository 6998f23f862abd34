//! Writing data files back into a workbook.

use crate::codec::{document_to_row, ShapeWarning};
use crate::columns::parse_columns;
use crate::document::{DocValue, Document, SheetData};
use crate::error::{io_context, Result};
use crate::export::yaml_file_name;
use crate::header::{is_config_sheet, HeaderRows, DATA_ROW_START, HEADER_ROW_COUNT};
use sheetconf_sheet::{Book, Sheet};
use std::fmt;
use std::fs;
use std::path::Path;

/// Keys checked, in order, for a document's sort identifier.
pub const ID_KEYS: [&str; 4] = ["id", "Id", "ID", "iD"];

/// A shape warning tied to the sheet row it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    pub sheet: String,
    /// 1-based sheet row.
    pub row: usize,
    pub warning: ShapeWarning,
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row {}: {}", self.sheet, self.row, self.warning)
    }
}

/// Outcome of [`import_yaml`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<String>,
    /// Sheets with no data file or an empty one.
    pub skipped: Vec<String>,
    pub warnings: Vec<ImportWarning>,
}

/// Leading integer of a string, the way a lenient parser reads `"12abc"`.
fn leading_integer(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<f64>().ok().map(|n| sign * n)
}

/// Get the numeric identifier of a document.
///
/// The first key of [`ID_KEYS`] holding a number (or a string starting with
/// one) wins; a document without one sorts as 0.
pub fn id_value(document: &Document) -> f64 {
    ID_KEYS
        .iter()
        .filter_map(|key| document.get(*key))
        .find_map(|value| match value {
            DocValue::Int(i) => Some(*i as f64),
            DocValue::Float(f) => Some(*f),
            DocValue::String(s) => leading_integer(s),
            _ => None,
        })
        .unwrap_or(0.0)
}

/// Sort documents by identifier, keeping the input order of equal ids.
pub fn sort_by_id(documents: &mut [Document]) {
    documents.sort_by(|a, b| id_value(a).total_cmp(&id_value(b)));
}

/// Replace a sheet's data rows with `documents`, sorted by identifier.
///
/// The header block is kept and every row below it is dropped first.
pub fn import_documents(sheet: &mut Sheet, mut documents: Vec<Document>) -> Result<Vec<ImportWarning>> {
    let header = HeaderRows::from_sheet(sheet)?;
    let columns = parse_columns(&header)?;
    sort_by_id(&mut documents);

    sheet.truncate_rows(HEADER_ROW_COUNT);
    let mut warnings = Vec::new();
    for (i, document) in documents.iter().enumerate() {
        let mut row = Vec::new();
        for warning in document_to_row(document, &columns, &mut row) {
            warnings.push(ImportWarning {
                sheet: sheet.name().to_string(),
                row: DATA_ROW_START + i,
                warning,
            });
        }
        sheet.data_mut().push(row);
    }
    Ok(warnings)
}

/// Load every qualifying sheet's data file from `data_dir` (the workbook's
/// directory by default) into the workbook, saving it in place.
///
/// The workbook is saved only when at least one sheet was imported.
pub fn import_yaml(xlsx_path: impl AsRef<Path>, data_dir: Option<&Path>) -> Result<ImportReport> {
    let xlsx_path = xlsx_path.as_ref();
    let data_dir = data_dir
        .or_else(|| xlsx_path.parent())
        .unwrap_or_else(|| Path::new("."));
    tracing::info!(
        file = %xlsx_path.display(),
        data_dir = %data_dir.display(),
        "importing yaml data"
    );

    let mut book = Book::from_xlsx(xlsx_path)?;
    let names: Vec<String> = book
        .sheet_names()
        .into_iter()
        .filter(|name| is_config_sheet(name))
        .map(str::to_string)
        .collect();

    let mut report = ImportReport::default();
    for name in names {
        let path = data_dir.join(yaml_file_name(&name));
        if !path.exists() {
            tracing::info!(sheet = %name, path = %path.display(), "no yaml file, skipping");
            report.skipped.push(name);
            continue;
        }

        let text = fs::read_to_string(&path).map_err(|e| io_context(&path, e))?;
        let data: SheetData = serde_yaml::from_str(&text)?;
        if data.data.is_empty() {
            tracing::info!(sheet = %name, "yaml file has no data, skipping");
            report.skipped.push(name);
            continue;
        }

        let rows = data.data.len();
        let sheet = book.get_sheet_mut(&name)?;
        report.warnings.extend(import_documents(sheet, data.data)?);
        tracing::info!(sheet = %name, rows, "imported yaml data");
        report.imported.push(name);
    }

    if report.imported.is_empty() {
        tracing::info!("nothing imported, workbook left unchanged");
    } else {
        book.save_as_xlsx(xlsx_path)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: Option<(&str, DocValue)>, tag: &str) -> Document {
        let mut d = Document::new();
        if let Some((key, value)) = id {
            d.insert(key.to_string(), value);
        }
        d.insert("tag".to_string(), tag.into());
        d
    }

    fn tags(documents: &[Document]) -> Vec<String> {
        documents
            .iter()
            .map(|d| match &d["tag"] {
                DocValue::String(s) => s.clone(),
                other => format!("{other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_id_value_keys_and_coercion() {
        assert_eq!(id_value(&doc(Some(("id", DocValue::Int(7))), "a")), 7.0);
        assert_eq!(id_value(&doc(Some(("ID", "42".into())), "a")), 42.0);
        assert_eq!(id_value(&doc(Some(("Id", "12abc".into())), "a")), 12.0);
        assert_eq!(id_value(&doc(Some(("iD", "-3".into())), "a")), -3.0);
        assert_eq!(id_value(&doc(Some(("id", "abc".into())), "a")), 0.0);
        assert_eq!(id_value(&doc(None, "a")), 0.0);
    }

    #[test]
    fn test_first_numeric_key_wins() {
        let mut d = Document::new();
        d.insert("id".to_string(), "x".into());
        d.insert("ID".to_string(), DocValue::Int(5));
        assert_eq!(id_value(&d), 5.0);
    }

    #[test]
    fn test_sort_is_numeric_and_stable() {
        let mut documents = vec![
            doc(Some(("id", DocValue::Int(10))), "ten"),
            doc(Some(("id", "9".into())), "nine"),
            doc(None, "none-a"),
            doc(Some(("id", DocValue::Int(10))), "ten-again"),
            doc(None, "none-b"),
            doc(Some(("id", DocValue::Int(2))), "two"),
        ];
        sort_by_id(&mut documents);
        assert_eq!(
            tags(&documents),
            vec!["none-a", "none-b", "two", "nine", "ten", "ten-again"]
        );
    }

    #[test]
    fn test_import_documents_rewrites_data_rows() {
        let mut sheet = Sheet::from_data(vec![
            vec!["required", "optional"],
            vec!["uint32", "string"],
            vec!["id", "name"],
            vec!["b", "b"],
            vec!["Id", "Name"],
            vec!["1", "old"],
            vec!["2", "old"],
            vec!["3", "old"],
        ]);
        let mut second = Document::new();
        second.insert("id".to_string(), DocValue::Int(20));
        second.insert("name".to_string(), "b".into());
        let mut first = Document::new();
        first.insert("id".to_string(), DocValue::Int(10));
        first.insert("name".to_string(), DocValue::List(vec![]));

        let warnings = import_documents(&mut sheet, vec![second, first]).unwrap();
        assert_eq!(sheet.row_count(), 7);
        assert_eq!(sheet.string_row(5), vec!["10"]);
        assert_eq!(sheet.string_row(6), vec!["20", "b"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].row, 6);
        assert!(warnings[0].to_string().starts_with("Sheet1 row 6: field 'name'"));
    }
}
