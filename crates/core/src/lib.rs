//! # sheetconf-core
//!
//! Converts spreadsheet configuration sheets to proto3 schemas and YAML data,
//! and YAML data back into the sheets.
//!
//! A qualifying sheet (name ending in `_CONF`) starts with five header rows:
//! constraint, data type, field name, export target and description. The
//! header drives everything else:
//!
//! - [`parse_columns`] builds the column descriptor tree (structs, repeated
//!   structs, filler columns).
//! - [`generate_message`] turns the header into a [`Message`] and
//!   [`render_proto_file`] prints it; [`check_proto_syntax`] validates the
//!   text.
//! - [`row_to_document`] and [`document_to_row`] convert data rows to nested
//!   documents and back.
//!
//! # Examples
//!
//! ```
//! use sheetconf_core::{generate_message, parse_columns, render_proto_file, row_to_document, HeaderRows};
//!
//! let strings = |cells: &[&str]| cells.iter().map(ToString::to_string).collect::<Vec<_>>();
//! let header = HeaderRows::new(
//!     "EXAMPLE_CONF",
//!     strings(&["required", "optional"]),
//!     strings(&["uint32", "string"]),
//!     strings(&["id", "name"]),
//!     strings(&["b", "b"]),
//! );
//!
//! let message = generate_message(&header).unwrap();
//! assert!(render_proto_file(&message).contains("message ExampleConfig {"));
//!
//! let columns = parse_columns(&header).unwrap();
//! let document = row_to_document(&strings(&["1", "sword"]), &columns);
//! assert_eq!(document.len(), 2);
//! ```

pub mod checker;
pub mod codec;
pub mod columns;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod header;
pub mod import;
pub mod info;
pub mod protoc;
pub mod schema;
pub mod template;
pub mod types;

pub use checker::{check_proto_syntax, format_findings, Finding, FindingKind};
pub use codec::{document_to_row, row_to_document, ShapeWarning};
pub use columns::{members_width, parse_columns, region_width, ColumnDescriptor, ColumnKind, StructInfo};
pub use config::Config;
pub use document::{sniff, DocValue, Document, SheetData};
pub use error::{ConvertError, Result, StructureError, StructureErrorKind, TypeError, TypeErrorKind};
pub use export::{
    book_to_data, export_all, export_protobuf, export_yaml, generate_messages, render_checked,
    sheet_to_data, yaml_file_name, ExportOptions, ExportSummary,
};
pub use header::{
    is_config_sheet, HeaderRows, DATA_ROW_START, HEADER_ROW_COUNT, PROTO_SUFFIX, SHEET_NAME_SUFFIX,
    YAML_EXTENSION,
};
pub use import::{id_value, import_documents, import_yaml, sort_by_id, ImportReport, ImportWarning};
pub use info::{SheetInfo, WorkbookInfo};
pub use schema::{
    generate_message, message_name_for_sheet, nested_message_name, proto_file_name,
    render_proto_bundle, render_proto_file, Field, FieldLabel, Message,
};
pub use template::{
    create_template_workbook, default_template, normalize_constraint, normalize_export_type,
    validate_sheet_name, Constraint, ExportType, HeaderColumn, SheetTemplate,
};
pub use types::{normalize_type, resolve_type, validate_data_type, ResolvedType, ScalarType};
