//! Writer for .grd file format

use crate::error::Result;
use crate::grid::{CellValue, Cells};
use std::fs;
use std::path::Path;

/// Write document cells to a .grd file
///
/// The content goes to a sibling temp file first and is renamed over `path`,
/// so a failed write leaves the previous document intact.
pub fn write_grd(path: &Path, cells: &Cells) -> Result<()> {
    let tmp = path.with_extension("grd.tmp");
    fs::write(&tmp, write_grd_content(cells))?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Render document cells in row-major order
pub fn write_grd_content(cells: &Cells) -> String {
    let mut lines = vec!["# Sheetledger document".to_string()];

    let mut sorted: Vec<_> = cells.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.row.cmp(&b.row).then(a.col.cmp(&b.col)));

    for (cell_ref, value) in sorted {
        let value_str = match value {
            CellValue::Empty => continue,
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) if s.is_empty() => continue,
            CellValue::Text(s) => format!("\"{}\"", escape_grd_text(s)),
        };
        lines.push(format!("{}: {}", cell_ref, value_str));
    }

    lines.join("\n") + "\n"
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}
