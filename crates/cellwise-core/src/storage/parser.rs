//! Parser for the .cws file format
//!
//! ```text
//! # comment
//! @version default
//! A1: 5
//! B1: =A1+5
//! C1: "some text"
//! ```

use crate::error::{Result, SheetError};
use std::fs;
use std::path::Path;

/// The content of one saved cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedContent {
    /// A quoted string, stored as text no matter what it looks like.
    Text(String),
    /// A number or `=formula`, replayed as cell input.
    Input(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedEntry {
    /// 1-based line the entry came from.
    pub line: usize,
    pub name: String,
    pub content: SavedContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedSheet {
    pub version: String,
    pub entries: Vec<SavedEntry>,
}

/// Parse a .cws file
pub fn parse_sheet(path: &Path) -> Result<SavedSheet> {
    let content = fs::read_to_string(path)?;
    parse_sheet_content(&content)
}

/// Parse .cws content from a string
pub fn parse_sheet_content(content: &str) -> Result<SavedSheet> {
    let mut version: Option<String> = None;
    let mut entries = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_no = line_num + 1;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(tag) = line.strip_prefix("@version") {
            if version.is_some() || !entries.is_empty() {
                return Err(SheetError::Parse {
                    line: line_no,
                    message: "@version must appear once, before any cell".to_string(),
                });
            }
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(SheetError::Parse {
                    line: line_no,
                    message: "@version needs a tag".to_string(),
                });
            }
            version = Some(tag.to_string());
            continue;
        }

        // Parse "NAME: CONTENT" format
        let Some((name, value)) = line.split_once(':') else {
            return Err(SheetError::Parse {
                line: line_no,
                message: "Expected 'NAME: CONTENT' format".to_string(),
            });
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(SheetError::Parse {
                line: line_no,
                message: "Missing cell name".to_string(),
            });
        }

        entries.push(SavedEntry {
            line: line_no,
            name: name.to_string(),
            content: parse_content(value.trim(), line_no)?,
        });
    }

    let version = version.ok_or_else(|| SheetError::Parse {
        line: 1,
        message: "Missing @version header".to_string(),
    })?;

    Ok(SavedSheet { version, entries })
}

fn parse_content(value: &str, line: usize) -> Result<SavedContent> {
    if value.starts_with('=') {
        return Ok(SavedContent::Input(value.to_string()));
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let text = &value[1..value.len() - 1];
        return Ok(SavedContent::Text(unescape_text(text)));
    }

    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(SavedContent::Input(value.to_string())),
        _ => Err(SheetError::Parse {
            line,
            message: format!("Invalid value: {}. Use quotes for text.", value),
        }),
    }
}

fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(content: &str) -> Vec<(String, SavedContent)> {
        parse_sheet_content(content)
            .unwrap()
            .entries
            .into_iter()
            .map(|e| (e.name, e.content))
            .collect()
    }

    #[test]
    fn test_parse_number_formula_text() {
        let parsed = entries("@version v1\nA1: 42\nB1: =A1 + 1\nC1: \"5\"");
        assert_eq!(
            parsed,
            vec![
                ("A1".to_string(), SavedContent::Input("42".into())),
                ("B1".to_string(), SavedContent::Input("=A1 + 1".into())),
                ("C1".to_string(), SavedContent::Text("5".into())),
            ]
        );
    }

    #[test]
    fn test_parse_version() {
        let sheet = parse_sheet_content("# header\n@version  my sheet \n").unwrap();
        assert_eq!(sheet.version, "my sheet");
        assert!(sheet.entries.is_empty());
    }

    #[test]
    fn test_parse_text_escapes() {
        let parsed = entries(r#"@version v
A1: "He said \"hi\"\nbye \\ ok""#);
        assert_eq!(parsed[0].1, SavedContent::Text("He said \"hi\"\nbye \\ ok".into()));
    }

    #[test]
    fn test_skip_comments_and_empty_lines() {
        let content = r#"
# This is a comment
@version v
A1: 42

# Another comment

B1: 100
"#;
        let sheet = parse_sheet_content(content).unwrap();
        assert_eq!(sheet.entries.len(), 2);
        assert_eq!(sheet.entries[1].line, 8);
    }

    #[test]
    fn test_missing_version() {
        let err = parse_sheet_content("A1: 1").unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_version_after_cells() {
        let err = parse_sheet_content("@version a\nA1: 1\n@version b").unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_unquoted_text_is_rejected() {
        let err = parse_sheet_content("@version v\nA1: hello").unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_sheet_content("@version v\nA1 42").unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_crlf_and_padding_outside_quotes() {
        let parsed = entries("@version v\r\nA1: \" lead \"  \r\nB1: 7\t\r\n");
        assert_eq!(
            parsed,
            vec![
                ("A1".to_string(), SavedContent::Text(" lead ".into())),
                ("B1".to_string(), SavedContent::Input("7".into())),
            ]
        );
    }
}
