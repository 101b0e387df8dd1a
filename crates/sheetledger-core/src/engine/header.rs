//! Header row handling: creation, validation and participant columns.

use crate::error::{LedgerError, Result};
use sheetledger_grid::{CellRef, CellValue, GridClient, RangeSpec};
use tracing::{debug, info};

/// Columns 0 and 1 hold the record date and description.
pub const RESERVED_COLUMNS: usize = 2;

/// Labels of row 0, up to (not including) the first blank cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    labels: Vec<String>,
}

impl Header {
    pub fn new(labels: Vec<String>) -> Self {
        Header { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of the first participant column labelled exactly `label`.
    ///
    /// Reserved columns are never matched, so a participant named like a
    /// reserved label still gets a column of their own.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .skip(RESERVED_COLUMNS)
            .position(|l| l == label)
            .map(|i| i + RESERVED_COLUMNS)
    }

    /// Participant labels in column order.
    pub fn participants(&self) -> &[String] {
        self.labels.get(RESERVED_COLUMNS..).unwrap_or(&[])
    }

    fn insert_participant(&mut self, label: &str) {
        self.labels.insert(RESERVED_COLUMNS, label.to_string());
    }
}

pub struct HeaderManager<'a, G: GridClient + ?Sized> {
    grid: &'a G,
    tab: &'a str,
    reserved: [&'a str; 2],
}

impl<'a, G: GridClient + ?Sized> HeaderManager<'a, G> {
    pub fn new(grid: &'a G, tab: &'a str, reserved: [&'a str; 2]) -> Self {
        HeaderManager {
            grid,
            tab,
            reserved,
        }
    }

    /// Read row 0, writing the reserved labels first if the row is blank.
    ///
    /// A row 0 whose reserved cells are blank while other cells hold data is
    /// rejected rather than overwritten.
    pub fn ensure_header(&self, doc: &str) -> Result<Header> {
        let range = RangeSpec::row(0).on_tab(self.tab);
        let row = self.grid.read_range(doc, &range)?.into_iter().next().unwrap_or_default();

        let labels: Vec<String> = row
            .iter()
            .take_while(|cell| !cell.is_blank())
            .map(|cell| cell.to_string())
            .collect();
        let has_content = row.iter().any(|cell| !cell.is_blank());

        if !has_content {
            let labels: Vec<String> = self.reserved.iter().map(|l| l.to_string()).collect();
            let range = RangeSpec::block(CellRef::new(0, 0), CellRef::new(RESERVED_COLUMNS - 1, 0))
                .on_tab(self.tab);
            let values: Vec<Vec<CellValue>> =
                vec![labels.iter().map(|l| CellValue::text(l.as_str())).collect()];
            self.grid.write_range(doc, &range, &values)?;
            info!(doc, "created header");
            return Ok(Header::new(labels));
        }

        if labels.len() < RESERVED_COLUMNS {
            return Err(LedgerError::MalformedHeader {
                sheet_id: doc.to_string(),
                reason: format!(
                    "row 1 must start with {} non-blank labels, found {}",
                    RESERVED_COLUMNS,
                    labels.len()
                ),
            });
        }

        debug!(doc, columns = labels.len(), "read header");
        Ok(Header::new(labels))
    }

    /// Column of `label`, inserting a new participant column at index 2 if absent.
    ///
    /// The insert shifts every existing participant column right by one, so
    /// any index cached elsewhere for another participant is stale afterwards.
    pub fn resolve_column(&self, doc: &str, header: &mut Header, label: &str) -> Result<usize> {
        if let Some(index) = header.position(label) {
            return Ok(index);
        }
        if label.is_empty() {
            return Err(LedgerError::InvalidLabel(label.to_string()));
        }

        self.grid
            .insert_column(doc, RESERVED_COLUMNS, true, Some(label))?;
        header.insert_participant(label);
        info!(doc, label, column = RESERVED_COLUMNS, "allocated participant column");
        Ok(RESERVED_COLUMNS)
    }
}
