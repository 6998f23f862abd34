//! Proto3 message generation from a sheet header.

use crate::error::Result;
use crate::header::{ColumnClass, HeaderRows, PROTO_SUFFIX, SHEET_NAME_SUFFIX};
use crate::template::{normalize_constraint, normalize_export_type, Constraint, ExportType};
use crate::types::validate_data_type;
use std::fmt;

/// Package every generated file declares.
pub const PROTO_PACKAGE: &str = "dataconfig";
const MESSAGE_SUFFIX: &str = "Config";

/// Field label in a generated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    /// Rendered without a label.
    Required,
    Optional,
    Repeated,
}

impl FieldLabel {
    /// Map a constraint cell to a label. Unknown tokens become `Optional`.
    pub fn from_constraint(token: &str) -> Self {
        let lower = token.trim().to_lowercase();
        let base = lower.strip_suffix("_struct").unwrap_or(&lower);
        match normalize_constraint(base) {
            Constraint::Required => FieldLabel::Required,
            Constraint::Repeated => FieldLabel::Repeated,
            Constraint::Optional | Constraint::OptionalStruct | Constraint::RequiredStruct => {
                FieldLabel::Optional
            }
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            FieldLabel::Required => "",
            FieldLabel::Optional => "optional ",
            FieldLabel::Repeated => "repeated ",
        }
    }
}

/// A field of a generated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: FieldLabel,
    pub type_name: String,
    pub name: String,
    /// 1-based, dense within the owning message.
    pub tag: u32,
    pub export_type: ExportType,
    pub is_struct: bool,
}

/// A generated message with its nested messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub nested: Vec<Message>,
}

impl Message {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn push_field(
        &mut self,
        label: FieldLabel,
        type_name: impl Into<String>,
        name: &str,
        export_type: ExportType,
        is_struct: bool,
    ) {
        let tag = self.fields.len() as u32 + 1;
        self.fields.push(Field {
            label,
            type_name: type_name.into(),
            name: name.to_string(),
            tag,
            export_type,
            is_struct,
        });
    }
}

// ===== Naming =====

fn title_case_join(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Get the message name for a sheet: `ITEM_DROP_CONF` becomes `ItemDropConfig`.
pub fn message_name_for_sheet(sheet_name: &str) -> String {
    let base = sheet_name
        .strip_suffix(SHEET_NAME_SUFFIX)
        .unwrap_or(sheet_name);
    title_case_join(base) + MESSAGE_SUFFIX
}

/// Get the nested message name for a struct: `reward_info` becomes `RewardInfo`.
pub fn nested_message_name(struct_name: &str) -> String {
    title_case_join(struct_name)
}

/// Get the schema file name for a message: `ItemDropConfig` becomes
/// `item_drop_conf.proto`.
pub fn proto_file_name(message_name: &str) -> String {
    let base = message_name
        .strip_suffix(MESSAGE_SUFFIX)
        .unwrap_or(message_name);
    let mut snake = String::with_capacity(base.len() + PROTO_SUFFIX.len());
    for (i, ch) in base.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            snake.push('_');
        }
        snake.extend(ch.to_lowercase());
    }
    snake + PROTO_SUFFIX
}

// ===== Generation =====

/// Generate the message tree for a sheet header.
///
/// Struct columns become nested messages declared inside their parent, and
/// tags are assigned 1..N in column order within each message.
///
/// # Errors
///
/// Returns a structure error for a bad member or repeat count and a type error
/// for a scalar column with an unsupported data type.
pub fn generate_message(header: &HeaderRows) -> Result<Message> {
    let mut message = Message::new(message_name_for_sheet(header.sheet_name()));
    build_fields(header, 0, None, &mut message)?;
    tracing::debug!(
        sheet = header.sheet_name(),
        message = %message.name,
        fields = message.fields.len(),
        "generated message"
    );
    Ok(message)
}

/// Add fields starting at `start` until `budget` members are added (or the
/// header ends). Returns the column after the last consumed one.
fn build_fields(
    header: &HeaderRows,
    start: usize,
    budget: Option<usize>,
    message: &mut Message,
) -> Result<usize> {
    let mut col = start;
    let mut added = 0;
    while col < header.width() && budget.map_or(true, |limit| added < limit) {
        let name = header.name(col);
        let export_type = normalize_export_type(header.export_type(col));

        match header.classify(col)? {
            ColumnClass::Skip => {
                col += 1;
                continue;
            }
            ColumnClass::Struct { member_count } => {
                let mut nested = Message::new(nested_message_name(name));
                col = build_fields(header, col + 1, Some(member_count), &mut nested)?;
                message.push_field(FieldLabel::Optional, &nested.name, name, export_type, true);
                message.nested.push(nested);
            }
            ColumnClass::RepeatedStruct {
                repeat_count,
                member_count,
            } => {
                let group_start = col + 2;
                let mut nested = Message::new(nested_message_name(header.name(col + 1)));
                let group_end = build_fields(header, group_start, Some(member_count), &mut nested)?;
                col = header.repeated_region_end(
                    col,
                    group_start,
                    group_end - group_start,
                    repeat_count,
                )?;
                message.push_field(FieldLabel::Repeated, &nested.name, name, export_type, true);
                message.nested.push(nested);
            }
            ColumnClass::Scalar | ColumnClass::RepeatedScalar => {
                let resolved = validate_data_type(
                    header.data_type(col),
                    header.sheet_name(),
                    col + 1,
                    name,
                )?;
                let label = FieldLabel::from_constraint(header.constraint(col));
                message.push_field(label, resolved.proto_name(), name, export_type, false);
                col += 1;
            }
        }
        added += 1;
    }
    Ok(col)
}

// ===== Rendering =====

const PREAMBLE_COMMENT: &str = "// Auto-generated from Excel configuration\n// DO NOT EDIT MANUALLY\n";

fn render_preamble(out: &mut String) {
    out.push_str("syntax = \"proto3\";\n\n");
    out.push_str(&format!("package {PROTO_PACKAGE};\n\n"));
    out.push_str(PREAMBLE_COMMENT);
    out.push('\n');
}

fn render_message(message: &Message, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{indent}message {} {{\n", message.name));
    for nested in &message.nested {
        render_message(nested, depth + 1, out);
        out.push('\n');
    }
    for field in &message.fields {
        out.push_str(&format!(
            "{indent}  {}{} {} = {};\n",
            field.label.prefix(),
            field.type_name,
            field.name,
            field.tag
        ));
    }
    out.push_str(&format!("{indent}}}\n"));
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        render_message(self, 0, &mut out);
        f.write_str(&out)
    }
}

/// Render a complete schema file holding one message.
pub fn render_proto_file(message: &Message) -> String {
    let mut out = String::new();
    render_preamble(&mut out);
    render_message(message, 0, &mut out);
    out
}

/// Render every message into a single schema text.
pub fn render_proto_bundle(messages: &[Message]) -> String {
    let mut out = String::new();
    render_preamble(&mut out);
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_message(message, 0, &mut out);
    }
    out
}
