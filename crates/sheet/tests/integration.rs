use sheetconf_sheet::{Book, CellValue, Sheet, SheetError};
use tempfile::tempdir;

// ===== Sheet Tests =====

#[test]
fn test_sheet_from_strings() {
    let sheet = Sheet::from_data(vec![
        vec!["required", "optional", "optional"],
        vec!["uint32", "string", "int32"],
        vec!["id", "name", "level"],
    ]);

    assert_eq!(sheet.row_count(), 3);
    assert_eq!(sheet.col_count(), 3);
    assert_eq!(
        sheet.data()[2][1],
        CellValue::String("name".to_string())
    );
}

#[test]
fn test_data_mut_push_and_truncate() {
    let mut sheet = Sheet::new();
    sheet.data_mut().push(vec!["a".into(), "b".into()]);
    sheet.data_mut().push(vec![CellValue::Int(1)]);
    sheet.data_mut().push(Vec::new());

    assert_eq!(sheet.row_count(), 3);
    assert_eq!(sheet.col_count(), 2);

    sheet.truncate_rows(1);
    assert_eq!(sheet.row_count(), 1);
    assert!(sheet.string_row(1).is_empty());
}

// ===== Book / XLSX Tests =====

#[test]
fn test_book_rewrite_rows_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.xlsx");

    let mut book = Book::new();
    book.add_sheet(
        "ITEM_CONF",
        Sheet::from_data(vec![
            vec!["required", "optional"],
            vec!["uint32", "string"],
            vec!["id", "name"],
            vec!["b", "b"],
            vec!["Id", "Name"],
            vec!["1", "sword"],
        ]),
    )
    .unwrap();
    book.save_as_xlsx(&path).unwrap();

    let mut loaded = Book::from_xlsx(&path).unwrap();
    {
        let sheet = loaded.get_sheet_mut("ITEM_CONF").unwrap();
        sheet.truncate_rows(5);
        sheet.set(5, 0, 7);
        sheet.set(5, 1, "shield");
    }
    loaded.save_as_xlsx(&path).unwrap();

    let reloaded = Book::from_xlsx(&path).unwrap();
    let sheet = reloaded.get_sheet("ITEM_CONF").unwrap();
    assert_eq!(sheet.row_count(), 6);
    assert_eq!(sheet.string_row(5), vec!["7", "shield"]);
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempdir().unwrap();
    let result = Book::from_xlsx(dir.path().join("missing.xlsx"));
    assert!(matches!(result, Err(SheetError::Xlsx(_))));
}
