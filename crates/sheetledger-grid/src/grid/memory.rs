//! In-process grid store.
//!
//! `MemoryGrid` holds any number of single-tab documents keyed by id and
//! implements [`GridClient`] with the same observable semantics as a remote
//! sheet store: sparse storage, trimmed reads, structural column inserts.
//! Tab names in ranges are accepted and ignored.

use super::cell::CellValue;
use super::cell_ref::CellRef;
use super::client::GridClient;
use super::range::{RangeSpec, Span};
use crate::error::{GridError, Result};
use crate::storage::{parse_grd, write_grd};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Sparse cell storage of one document.
pub type Cells = HashMap<CellRef, CellValue>;

#[derive(Default)]
pub struct MemoryGrid {
    docs: DashMap<String, Cells>,
    /// Pending one-shot failures per document.
    faults: DashMap<String, String>,
    mutations: AtomicUsize,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document. Returns false if it already existed.
    pub fn create_document(&self, doc: &str) -> bool {
        if self.docs.contains_key(doc) {
            return false;
        }
        self.docs.insert(doc.to_string(), Cells::new());
        true
    }

    pub fn with_document(self, doc: &str) -> Self {
        self.create_document(doc);
        self
    }

    /// Overwrite one cell directly, the way a human editing the sheet would.
    pub fn set_cell(&self, doc: &str, cell_ref: CellRef, value: impl Into<CellValue>) -> Result<()> {
        let mut cells = self.cells_mut(doc)?;
        let value = value.into();
        if value.is_blank() {
            cells.remove(&cell_ref);
        } else {
            cells.insert(cell_ref, value);
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn get_cell(&self, doc: &str, cell_ref: CellRef) -> CellValue {
        self.docs
            .get(doc)
            .and_then(|cells| cells.get(&cell_ref).cloned())
            .unwrap_or_default()
    }

    /// Whole document as rows, trimmed the same way reads are.
    pub fn snapshot(&self, doc: &str) -> Result<Vec<Vec<CellValue>>> {
        let cells = self
            .docs
            .get(doc)
            .ok_or_else(|| GridError::DocumentNotFound(doc.to_string()))?;
        let Some(last_row) = cells.keys().map(|k| k.row).max() else {
            return Ok(Vec::new());
        };
        Ok(collect_rows(&cells, 0, last_row, None))
    }

    /// Make the next call against `doc` fail as unreachable.
    pub fn fail_next(&self, doc: &str, reason: &str) {
        self.faults.insert(doc.to_string(), reason.to_string());
    }

    /// Number of successful mutating calls across all documents.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Load a document from a `.grd` file, replacing any existing contents.
    pub fn load_grd(&self, doc: &str, path: &Path) -> Result<()> {
        let cells = parse_grd(path)?;
        self.docs.insert(doc.to_string(), cells);
        Ok(())
    }

    /// Persist a document to a `.grd` file.
    pub fn save_grd(&self, doc: &str, path: &Path) -> Result<()> {
        let cells = self
            .docs
            .get(doc)
            .ok_or_else(|| GridError::DocumentNotFound(doc.to_string()))?;
        write_grd(path, &cells)
    }

    fn take_fault(&self, doc: &str) -> Result<()> {
        match self.faults.remove(doc) {
            Some((doc, reason)) => Err(GridError::Unreachable { doc, reason }),
            None => Ok(()),
        }
    }

    fn cells_mut(&self, doc: &str) -> Result<dashmap::mapref::one::RefMut<'_, String, Cells>> {
        self.docs
            .get_mut(doc)
            .ok_or_else(|| GridError::DocumentNotFound(doc.to_string()))
    }
}

/// Rows `first..=last`, each trimmed of trailing blanks, trailing blank rows dropped.
fn collect_rows(
    cells: &Cells,
    first_row: usize,
    last_row: usize,
    cols: Option<(usize, usize)>,
) -> Vec<Vec<CellValue>> {
    let mut rows = Vec::new();
    // Rows past the last stored cell are blank and would be trimmed anyway.
    let Some(last_row) = cells.keys().map(|k| k.row).max().map(|max| max.min(last_row)) else {
        return rows;
    };
    for row in first_row..=last_row {
        let (first_col, last_col) = match cols {
            Some(bounds) => bounds,
            None => match cells.keys().filter(|k| k.row == row).map(|k| k.col).max() {
                Some(max_col) => (0, max_col),
                None => {
                    rows.push(Vec::new());
                    continue;
                }
            },
        };
        let mut values: Vec<CellValue> = (first_col..=last_col)
            .map(|col| cells.get(&CellRef::new(col, row)).cloned().unwrap_or_default())
            .collect();
        while values.last().is_some_and(CellValue::is_blank) {
            values.pop();
        }
        rows.push(values);
    }
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    rows
}

/// Shift every cell at or right of `at` one column right.
fn shift_columns_right(cells: &mut Cells, at: usize) {
    let moved = std::mem::take(cells);
    *cells = moved
        .into_iter()
        .map(|(cell_ref, value)| {
            if cell_ref.col >= at {
                (CellRef::new(cell_ref.col + 1, cell_ref.row), value)
            } else {
                (cell_ref, value)
            }
        })
        .collect();
}

impl GridClient for MemoryGrid {
    fn read_range(&self, doc: &str, range: &RangeSpec) -> Result<Vec<Vec<CellValue>>> {
        self.take_fault(doc)?;
        debug!(doc, range = %range, "read_range");
        let cells = self
            .docs
            .get(doc)
            .ok_or_else(|| GridError::DocumentNotFound(doc.to_string()))?;
        let (first_row, last_row) = range.rows();
        Ok(collect_rows(&cells, first_row, last_row, range.cols()))
    }

    fn write_range(&self, doc: &str, range: &RangeSpec, values: &[Vec<CellValue>]) -> Result<()> {
        self.take_fault(doc)?;
        debug!(doc, range = %range, rows = values.len(), "write_range");

        let width = values.iter().map(Vec::len).max().unwrap_or(0);
        let (origin, max_width) = match range.span {
            Span::Block { start, end } => (start, Some(end.col - start.col + 1)),
            Span::Rows { start, .. } => (CellRef::new(0, start), None),
        };
        if values.len() > range.row_count() || max_width.is_some_and(|max| width > max) {
            return Err(GridError::InvalidRange(format!(
                "{} rows x {} cols do not fit {}",
                values.len(),
                width,
                range
            )));
        }

        let mut cells = self.cells_mut(doc)?;
        for (r, row) in values.iter().enumerate() {
            for c in 0..width {
                let cell_ref = CellRef::new(origin.col + c, origin.row + r);
                match row.get(c) {
                    Some(value) if !value.is_blank() => {
                        cells.insert(cell_ref, value.clone());
                    }
                    _ => {
                        cells.remove(&cell_ref);
                    }
                }
            }
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn insert_column(
        &self,
        doc: &str,
        index: usize,
        _inherit_formatting: bool,
        label: Option<&str>,
    ) -> Result<()> {
        self.take_fault(doc)?;
        debug!(doc, index, ?label, "insert_column");
        let mut cells = self.cells_mut(doc)?;
        shift_columns_right(&mut cells, index);
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            cells.insert(CellRef::new(index, 0), CellValue::text(label));
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn can_access(&self, doc: &str) -> bool {
        self.take_fault(doc).is_ok() && self.docs.contains_key(doc)
    }
}
