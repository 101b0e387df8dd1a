//! Parser for .grd file format

use crate::error::{GridError, Result};
use crate::grid::{CellRef, CellValue, Cells};
use std::fs;
use std::path::Path;

/// Parse a .grd file into document cells
pub fn parse_grd(path: &Path) -> Result<Cells> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Cells> {
    let mut cells = Cells::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(GridError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_ref = CellRef::from_a1(cell_ref_str).ok_or_else(|| GridError::Parse {
            line: line_num + 1,
            message: format!("Invalid cell reference: {}", cell_ref_str),
        })?;

        let value = parse_cell_value(value_str, line_num + 1)?;
        if !value.is_blank() {
            cells.insert(cell_ref, value);
        }
    }

    Ok(cells)
}

fn parse_cell_value(value: &str, line_num: usize) -> Result<CellValue> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(CellValue::Empty);
    }

    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let text = &value[1..value.len() - 1];
        return Ok(CellValue::Text(unescape_grd_text(text)));
    }

    if let Ok(n) = value.parse::<f64>() {
        return Ok(CellValue::Number(n));
    }

    Err(GridError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        let cells = parse_grd_content("C2: 42").unwrap();
        assert_eq!(cells.get(&CellRef::new(2, 1)), Some(&CellValue::Number(42.0)));
    }

    #[test]
    fn test_parse_text_escaped_quotes() {
        let cells = parse_grd_content(r#"A1: "He said \"hi\"""#).unwrap();
        assert_eq!(
            cells.get(&CellRef::new(0, 0)),
            Some(&CellValue::text("He said \"hi\""))
        );
    }

    #[test]
    fn test_parse_text_with_colon_and_newline_escape() {
        let cells = parse_grd_content(r#"B2: "lunch: pizza\nand soda""#).unwrap();
        assert_eq!(
            cells.get(&CellRef::new(1, 1)),
            Some(&CellValue::text("lunch: pizza\nand soda"))
        );
    }

    #[test]
    fn test_skip_comments_and_empty_lines() {
        let content = r#"
# Sheetledger document
A1: "Date"

# body
A2: "2024-03-01"
"#;
        assert_eq!(parse_grd_content(content).unwrap().len(), 2);
    }

    #[test]
    fn test_unquoted_text_is_rejected() {
        let err = parse_grd_content("A1: 100\nA2: hello").unwrap_err();
        assert!(matches!(err, GridError::Parse { line: 2, .. }));
    }
}
