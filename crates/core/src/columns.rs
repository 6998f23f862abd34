//! Column descriptor tree built from the header block.
//!
//! Descriptors keep the absolute column index of their header cell. A
//! repeated struct spans `repeat_count` copies of its member group; the
//! descriptor tree only describes the first copy and later copies are found by
//! shifting by [`StructInfo::group_width`].

use crate::error::StructureError;
use crate::header::{ColumnClass, HeaderRows};

/// One logical field parsed from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// 0-based column of the field's header cell.
    pub index: usize,
    pub name: String,
    /// Raw constraint cell.
    pub constraint: String,
    /// Raw data type cell (a count for struct markers).
    pub data_type: String,
    pub kind: ColumnKind,
}

/// Shape of a descriptor's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Scalar,
    /// A `repeated` scalar occupies a single column.
    RepeatedScalar,
    Struct(StructInfo),
    RepeatedStruct(StructInfo),
}

/// Members of a struct or of one repeated-struct group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInfo {
    /// Name written on the `struct` marker column.
    pub name: String,
    pub member_count: usize,
    /// 1 for a plain struct.
    pub repeat_count: usize,
    pub members: Vec<ColumnDescriptor>,
    /// Columns covered by one member group, interior filler columns included.
    pub group_width: usize,
}

impl ColumnDescriptor {
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, ColumnKind::Struct(_) | ColumnKind::RepeatedStruct(_))
    }

    pub fn is_repeated(&self) -> bool {
        matches!(
            self.kind,
            ColumnKind::RepeatedScalar | ColumnKind::RepeatedStruct(_)
        )
    }

    pub fn struct_info(&self) -> Option<&StructInfo> {
        match &self.kind {
            ColumnKind::Struct(info) | ColumnKind::RepeatedStruct(info) => Some(info),
            ColumnKind::Scalar | ColumnKind::RepeatedScalar => None,
        }
    }
}

/// Get the number of columns a descriptor's region covers.
///
/// A scalar covers one column, a struct its marker plus one member group, and
/// a repeated struct its two marker columns plus every group.
pub fn region_width(column: &ColumnDescriptor) -> usize {
    match &column.kind {
        ColumnKind::Scalar | ColumnKind::RepeatedScalar => 1,
        ColumnKind::Struct(info) => 1 + info.group_width,
        ColumnKind::RepeatedStruct(info) => 2 + info.repeat_count * info.group_width,
    }
}

/// Get the summed region width of a descriptor list.
pub fn members_width(columns: &[ColumnDescriptor]) -> usize {
    columns.iter().map(region_width).sum()
}

/// Parse the header block into a descriptor tree.
///
/// # Errors
///
/// Returns a [`StructureError`] naming the sheet, column and field when a
/// struct member count or repeat count is not a positive integer.
pub fn parse_columns(header: &HeaderRows) -> Result<Vec<ColumnDescriptor>, StructureError> {
    let mut columns = Vec::new();
    let mut col = 0;
    while col < header.width() {
        match parse_column(header, col)? {
            Some((column, next)) => {
                columns.push(column);
                col = next;
            }
            None => col += 1,
        }
    }
    Ok(columns)
}

/// Parse the column at `col`, returning the descriptor and the column after
/// its region, or `None` for a skipped column.
fn parse_column(
    header: &HeaderRows,
    col: usize,
) -> Result<Option<(ColumnDescriptor, usize)>, StructureError> {
    let (kind, next) = match header.classify(col)? {
        ColumnClass::Skip => return Ok(None),
        ColumnClass::Scalar => (ColumnKind::Scalar, col + 1),
        ColumnClass::RepeatedScalar => (ColumnKind::RepeatedScalar, col + 1),
        ColumnClass::Struct { member_count } => {
            let start = col + 1;
            let (members, end) = parse_members(header, start, member_count)?;
            let info = StructInfo {
                name: header.name(col).to_string(),
                member_count,
                repeat_count: 1,
                members,
                group_width: end - start,
            };
            (ColumnKind::Struct(info), end)
        }
        ColumnClass::RepeatedStruct {
            repeat_count,
            member_count,
        } => {
            let start = col + 2;
            let (members, end) = parse_members(header, start, member_count)?;
            let group_width = end - start;
            let info = StructInfo {
                name: header.name(col + 1).to_string(),
                member_count,
                repeat_count,
                members,
                group_width,
            };
            let end = header.repeated_region_end(col, start, group_width, repeat_count)?;
            (ColumnKind::RepeatedStruct(info), end)
        }
    };

    let column = ColumnDescriptor {
        index: col,
        name: header.name(col).to_string(),
        constraint: header.constraint(col).to_string(),
        data_type: header.data_type(col).to_string(),
        kind,
    };
    Ok(Some((column, next)))
}

/// Collect `member_count` members starting at `start`. Each scalar, struct or
/// repeated struct counts once; skipped columns do not count.
fn parse_members(
    header: &HeaderRows,
    start: usize,
    member_count: usize,
) -> Result<(Vec<ColumnDescriptor>, usize), StructureError> {
    let mut members = Vec::with_capacity(member_count);
    let mut col = start;
    while members.len() < member_count && col < header.width() {
        match parse_column(header, col)? {
            Some((member, next)) => {
                members.push(member);
                col = next;
            }
            None => col += 1,
        }
    }
    Ok((members, col))
}
