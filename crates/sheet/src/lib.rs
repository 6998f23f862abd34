//! Sheet/Book container for sheetconf
//!
//! Provides the in-memory cell grid the converters work on, plus XLSX reading
//! (calamine) and writing (rust_xlsxwriter).
//!
//! # Examples
//!
//! ```
//! use sheetconf_sheet::{Book, CellValue, Sheet};
//!
//! let sheet = Sheet::from_data(vec![
//!     vec!["required", "optional"],
//!     vec!["uint32", "string"],
//!     vec!["id", "name"],
//! ]);
//! assert_eq!(sheet.row_count(), 3);
//! assert_eq!(sheet.string_row(2), vec!["id", "name"]);
//!
//! let mut book = Book::new();
//! book.add_sheet("ITEM_CONF", sheet).unwrap();
//! assert_eq!(book.get_sheet("ITEM_CONF").unwrap().get(1, 0).unwrap(), &CellValue::from("uint32"));
//! ```

mod book;
mod cell;
mod error;
mod sheet;
mod xlsx;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export the styled header template writer.
pub use xlsx::write_header_template;
