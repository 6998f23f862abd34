//! Lightweight line-oriented checks on generated proto3 text.
//!
//! This is not a proto parser. It catches the mistakes a generator or a hand
//! edit is likely to introduce: a missing or wrong syntax line, unbalanced
//! braces, bad or duplicate tags, and badly named messages and fields.

use indexmap::{IndexMap, IndexSet};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Largest tag a proto field may use.
pub const MAX_FIELD_TAG: u64 = 536_870_911;
/// Tags the protobuf implementation reserves for itself.
pub const RESERVED_TAGS: std::ops::RangeInclusive<u64> = 19_000..=19_999;

/// Kind of problem found in a schema text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    MissingSyntax,
    InvalidSyntax,
    DuplicateSyntax { first_line: usize },
    UnmatchedClosingBrace,
    UnclosedBraces { count: usize },
    TagOutOfRange { tag: String },
    ReservedTag { tag: u64 },
    DuplicateTag { tag: u64, message: String },
    InvalidMessageName { name: String },
    DuplicateMessageName { name: String, first_line: usize },
    InvalidFieldName { name: String },
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::MissingSyntax => f.write_str("Missing syntax declaration"),
            FindingKind::InvalidSyntax => {
                f.write_str("Invalid syntax declaration, should be: syntax = \"proto3\";")
            }
            FindingKind::DuplicateSyntax { first_line } => write!(
                f,
                "Duplicate syntax declaration (first declared at line {first_line})"
            ),
            FindingKind::UnmatchedClosingBrace => f.write_str("Unmatched closing brace '}'"),
            FindingKind::UnclosedBraces { count } => {
                write!(f, "Unmatched braces: {count} unclosed '{{'")
            }
            FindingKind::TagOutOfRange { tag } => write!(
                f,
                "Field tag {tag} is out of valid range (1-{MAX_FIELD_TAG})"
            ),
            FindingKind::ReservedTag { tag } => write!(
                f,
                "Field tag {tag} is in reserved range ({}-{})",
                RESERVED_TAGS.start(),
                RESERVED_TAGS.end()
            ),
            FindingKind::DuplicateTag { tag, message } => {
                write!(f, "Duplicate field tag {tag} in message {message}")
            }
            FindingKind::InvalidMessageName { name } => {
                write!(f, "Message name '{name}' should be in PascalCase")
            }
            FindingKind::DuplicateMessageName { name, first_line } => write!(
                f,
                "Duplicate message name '{name}' (first defined at line {first_line})"
            ),
            FindingKind::InvalidFieldName { name } => {
                write!(f, "Field name '{name}' is not a valid identifier")
            }
        }
    }
}

/// A problem at a position in a schema text.
///
/// Lines and columns are 1-based; line 0 means the whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    pub column: usize,
    pub kind: FindingKind,
}

impl Finding {
    fn new(line: usize, column: usize, kind: FindingKind) -> Self {
        Self { line, column, kind }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "Line {}, Column {}: {}", self.line, self.column, self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

fn syntax_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^syntax\s*=\s*"proto3"\s*;"#).expect("valid regex"))
}

fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(optional|required|repeated)?\s*(\w+)\s+(\w+)\s*=\s*(\d+)\s*;")
            .expect("valid regex")
    })
}

fn message_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*message\s+(\w+)\s*\{").expect("valid regex"))
}

fn pascal_case_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("valid regex"))
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("valid regex"))
}

/// 1-based character column of a capture group.
fn group_column(line: &str, caps: &Captures<'_>, group: usize) -> usize {
    let offset = caps.get(group).map_or(0, |m| m.start());
    line[..offset].chars().count() + 1
}

fn first_non_blank_column(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count() + 1
}

/// Check a proto3 schema text and return every finding, in line order within
/// each check. An empty result means the text passed.
pub fn check_proto_syntax(content: &str) -> Vec<Finding> {
    let lines: Vec<&str> = content.lines().collect();
    let mut findings = Vec::new();
    check_syntax_line(&lines, &mut findings);
    check_braces(&lines, &mut findings);
    check_fields(&lines, &mut findings);
    check_messages(&lines, &mut findings);
    findings
}

fn check_syntax_line(lines: &[&str], findings: &mut Vec<Finding>) {
    let mut first: Option<usize> = None;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if !trimmed.starts_with("syntax") {
            continue;
        }
        let line_no = i + 1;
        let column = first_non_blank_column(line);
        match first {
            None => {
                first = Some(line_no);
                if !syntax_regex().is_match(trimmed) {
                    findings.push(Finding::new(line_no, column, FindingKind::InvalidSyntax));
                }
            }
            Some(first_line) => findings.push(Finding::new(
                line_no,
                column,
                FindingKind::DuplicateSyntax { first_line },
            )),
        }
    }
    if first.is_none() {
        findings.push(Finding::new(0, 0, FindingKind::MissingSyntax));
    }
}

fn check_braces(lines: &[&str], findings: &mut Vec<Finding>) {
    let mut depth = 0usize;
    for (i, line) in lines.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            match ch {
                '{' => depth += 1,
                '}' if depth == 0 => findings.push(Finding::new(
                    i + 1,
                    col + 1,
                    FindingKind::UnmatchedClosingBrace,
                )),
                '}' => depth -= 1,
                _ => {}
            }
        }
    }
    if depth > 0 {
        findings.push(Finding::new(0, 0, FindingKind::UnclosedBraces { count: depth }));
    }
}

/// Tags are tracked per message block. A `message X {` line opens a new
/// block, any other opening line stays in the enclosing message, and a line
/// holding only `}` leaves the innermost block.
fn check_fields(lines: &[&str], findings: &mut Vec<Finding>) {
    let mut scopes: Vec<Option<(String, usize)>> = Vec::new();
    let mut seen: HashMap<usize, IndexSet<u64>> = HashMap::new();
    let mut blocks = 0;

    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        let trimmed = line.trim();

        if trimmed.ends_with('{') {
            let scope = match message_regex().captures(line) {
                Some(caps) => {
                    blocks += 1;
                    Some((caps[1].to_string(), blocks))
                }
                None => scopes.last().cloned().flatten(),
            };
            scopes.push(scope);
            continue;
        }
        if trimmed == "}" {
            scopes.pop();
            continue;
        }

        let Some(caps) = field_regex().captures(line) else {
            continue;
        };

        let name = &caps[3];
        if !identifier_regex().is_match(name) {
            findings.push(Finding::new(
                line_no,
                group_column(line, &caps, 3),
                FindingKind::InvalidFieldName {
                    name: name.to_string(),
                },
            ));
        }

        let tag_column = group_column(line, &caps, 4);
        let tag = match caps[4].parse::<u64>() {
            Ok(tag) if (1..=MAX_FIELD_TAG).contains(&tag) => tag,
            _ => {
                findings.push(Finding::new(
                    line_no,
                    tag_column,
                    FindingKind::TagOutOfRange {
                        tag: caps[4].to_string(),
                    },
                ));
                continue;
            }
        };
        if RESERVED_TAGS.contains(&tag) {
            findings.push(Finding::new(line_no, tag_column, FindingKind::ReservedTag { tag }));
        }

        if let Some(Some((message, block))) = scopes.last() {
            let tags = seen.entry(*block).or_default();
            if !tags.insert(tag) {
                findings.push(Finding::new(
                    line_no,
                    tag_column,
                    FindingKind::DuplicateTag {
                        tag,
                        message: message.clone(),
                    },
                ));
            }
        }
    }
}

fn check_messages(lines: &[&str], findings: &mut Vec<Finding>) {
    let mut defined: IndexMap<String, usize> = IndexMap::new();
    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        let Some(caps) = message_regex().captures(line) else {
            continue;
        };
        let name = &caps[1];
        let column = group_column(line, &caps, 1);

        if !pascal_case_regex().is_match(name) {
            findings.push(Finding::new(
                line_no,
                column,
                FindingKind::InvalidMessageName {
                    name: name.to_string(),
                },
            ));
        }
        match defined.get(name) {
            Some(&first_line) => findings.push(Finding::new(
                line_no,
                column,
                FindingKind::DuplicateMessageName {
                    name: name.to_string(),
                    first_line,
                },
            )),
            None => {
                defined.insert(name.to_string(), line_no);
            }
        }
    }
}

/// Format findings as a numbered report.
pub fn format_findings(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return String::new();
    }
    let mut out = format!("Found {} validation error(s):\n\n", findings.len());
    for (i, finding) in findings.iter().enumerate() {
        out.push_str(&format!("{}. {finding}\n", i + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "syntax = \"proto3\";\n\
        \n\
        package dataconfig;\n\
        \n\
        message ItemConfig {\n\
        \x20 message Pos {\n\
        \x20   optional int32 x = 1;\n\
        \x20   optional int32 y = 2;\n\
        \x20 }\n\
        \n\
        \x20 uint32 id = 1;\n\
        \x20 optional Pos pos = 2;\n\
        \x20 repeated string tags = 3;\n\
        }\n";

    fn kinds(findings: &[Finding]) -> Vec<&FindingKind> {
        findings.iter().map(|f| &f.kind).collect()
    }

    #[test]
    fn test_valid_text_has_no_findings() {
        assert!(check_proto_syntax(VALID).is_empty());
    }

    // ===== Syntax Line =====

    #[test]
    fn test_missing_syntax() {
        let findings = check_proto_syntax("message A {\n  uint32 id = 1;\n}\n");
        assert_eq!(kinds(&findings), vec![&FindingKind::MissingSyntax]);
        assert_eq!(findings[0].line, 0);
    }

    #[test]
    fn test_wrong_syntax_version() {
        let findings = check_proto_syntax("syntax = \"proto2\";\nmessage A {\n}\n");
        assert_eq!(kinds(&findings), vec![&FindingKind::InvalidSyntax]);
        assert_eq!(findings[0].line, 1);
    }

    #[test]
    fn test_second_syntax_line() {
        let text = format!("{VALID}syntax = \"proto3\";\n");
        let findings = check_proto_syntax(&text);
        assert_eq!(
            kinds(&findings),
            vec![&FindingKind::DuplicateSyntax { first_line: 1 }]
        );
    }

    // ===== Braces =====

    #[test]
    fn test_unclosed_braces() {
        let findings = check_proto_syntax("syntax = \"proto3\";\nmessage A {\n  message B {\n");
        assert_eq!(kinds(&findings), vec![&FindingKind::UnclosedBraces { count: 2 }]);
    }

    #[test]
    fn test_extra_closing_brace() {
        let findings = check_proto_syntax("syntax = \"proto3\";\nmessage A {\n}\n}\n");
        assert_eq!(kinds(&findings), vec![&FindingKind::UnmatchedClosingBrace]);
        assert_eq!((findings[0].line, findings[0].column), (4, 1));
    }

    // ===== Fields =====

    #[test]
    fn test_duplicate_tag_is_single_finding() {
        let text = VALID.replace("repeated string tags = 3;", "repeated string tags = 2;");
        let findings = check_proto_syntax(&text);
        assert_eq!(
            kinds(&findings),
            vec![&FindingKind::DuplicateTag {
                tag: 2,
                message: "ItemConfig".to_string()
            }]
        );
        assert_eq!(findings[0].line, 13);
    }

    #[test]
    fn test_tag_ranges() {
        let text = "syntax = \"proto3\";\nmessage A {\n  uint32 a = 0;\n  uint32 b = 19500;\n  uint32 c = 536870912;\n  uint32 d = 536870911;\n}\n";
        let findings = check_proto_syntax(text);
        assert_eq!(
            kinds(&findings),
            vec![
                &FindingKind::TagOutOfRange { tag: "0".to_string() },
                &FindingKind::ReservedTag { tag: 19500 },
                &FindingKind::TagOutOfRange {
                    tag: "536870912".to_string()
                },
            ]
        );
        assert_eq!(findings[0].column, 14);
    }

    #[test]
    fn test_bad_field_name() {
        let findings = check_proto_syntax("syntax = \"proto3\";\nmessage A {\n  uint32 _id = 1;\n}\n");
        assert_eq!(
            kinds(&findings),
            vec![&FindingKind::InvalidFieldName {
                name: "_id".to_string()
            }]
        );
        assert_eq!(findings[0].column, 10);
    }

    // ===== Messages =====

    #[test]
    fn test_message_names() {
        let text = "syntax = \"proto3\";\nmessage item_config {\n}\nmessage B {\n}\nmessage B {\n}\n";
        let findings = check_proto_syntax(text);
        assert_eq!(
            kinds(&findings),
            vec![
                &FindingKind::InvalidMessageName {
                    name: "item_config".to_string()
                },
                &FindingKind::DuplicateMessageName {
                    name: "B".to_string(),
                    first_line: 4
                },
            ]
        );
    }

    // ===== Report =====

    #[test]
    fn test_format_findings() {
        let findings = vec![
            Finding::new(0, 0, FindingKind::MissingSyntax),
            Finding::new(3, 14, FindingKind::ReservedTag { tag: 19000 }),
        ];
        assert_eq!(
            format_findings(&findings),
            "Found 2 validation error(s):\n\n\
             1. Missing syntax declaration\n\
             2. Line 3, Column 14: Field tag 19000 is in reserved range (19000-19999)\n"
        );
        assert_eq!(format_findings(&[]), "");
    }
}
