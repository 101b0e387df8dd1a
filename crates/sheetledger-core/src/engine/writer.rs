use super::header::RESERVED_COLUMNS;
use crate::error::{LedgerError, Result};
use sheetledger_grid::{CellValue, GridClient, RangeSpec};
use tracing::info;

/// One spending record, ready to be laid out as a ledger row.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub description: String,
    pub participant_col: usize,
    pub amount: f64,
}

/// Lay out `record` across `col_count` cells. Every participant column other
/// than the record's own stays blank.
pub fn build_row(col_count: usize, record: &Record) -> Vec<CellValue> {
    let mut row = vec![CellValue::Empty; col_count.max(RESERVED_COLUMNS)];
    row[0] = CellValue::text(record.date.as_str());
    row[1] = CellValue::text(record.description.as_str());
    if let Some(cell) = row.get_mut(record.participant_col) {
        *cell = CellValue::Number(record.amount);
    }
    row
}

pub struct RecordWriter<'a, G: GridClient + ?Sized> {
    grid: &'a G,
    tab: &'a str,
}

impl<'a, G: GridClient + ?Sized> RecordWriter<'a, G> {
    pub fn new(grid: &'a G, tab: &'a str) -> Self {
        RecordWriter { grid, tab }
    }

    /// Write `record` as row `row`, covering exactly columns `0..col_count`.
    pub fn write_record(
        &self,
        doc: &str,
        row: usize,
        col_count: usize,
        record: &Record,
    ) -> Result<()> {
        if record.participant_col < RESERVED_COLUMNS || record.participant_col >= col_count {
            return Err(LedgerError::MalformedHeader {
                sheet_id: doc.to_string(),
                reason: format!(
                    "participant column {} outside header of {} columns",
                    record.participant_col, col_count
                ),
            });
        }

        let range = RangeSpec::window(row, 1, 0, col_count - 1).on_tab(self.tab);
        self.grid
            .write_range(doc, &range, &[build_row(col_count, record)])?;
        info!(doc, range = %range, amount = record.amount, "wrote ledger row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetledger_grid::{CellRef, MemoryGrid};

    fn record(col: usize, amount: f64) -> Record {
        Record {
            date: "2024-05-01".to_string(),
            description: "groceries".to_string(),
            participant_col: col,
            amount,
        }
    }

    #[test]
    fn test_build_row_layout() {
        let row = build_row(5, &record(3, 12.5));
        assert_eq!(
            row,
            vec![
                CellValue::text("2024-05-01"),
                CellValue::text("groceries"),
                CellValue::Empty,
                CellValue::Number(12.5),
                CellValue::Empty,
            ]
        );
    }

    #[test]
    fn test_written_row_reads_back() {
        let grid = MemoryGrid::new().with_document("d");
        for col in 2..5 {
            grid.set_cell("d", CellRef::new(col, 7), "stale").unwrap();
        }
        let writer = RecordWriter::new(&grid, "Sheet1");
        writer.write_record("d", 7, 5, &record(3, 40.0)).unwrap();

        let range = RangeSpec::window(7, 1, 0, 4);
        let rows = grid.read_range("d", &range).unwrap();
        assert_eq!(
            rows,
            vec![vec![
                CellValue::text("2024-05-01"),
                CellValue::text("groceries"),
                CellValue::Empty,
                CellValue::Number(40.0),
            ]]
        );
    }

    #[test]
    fn test_does_not_touch_cells_past_col_count() {
        let grid = MemoryGrid::new().with_document("d");
        grid.set_cell("d", CellRef::new(6, 2), "note").unwrap();
        RecordWriter::new(&grid, "Sheet1")
            .write_record("d", 2, 3, &record(2, 1.0))
            .unwrap();
        assert_eq!(grid.get_cell("d", CellRef::new(6, 2)), CellValue::text("note"));
    }

    #[test]
    fn test_rejects_reserved_or_out_of_range_column() {
        let grid = MemoryGrid::new().with_document("d");
        let writer = RecordWriter::new(&grid, "Sheet1");
        assert!(writer.write_record("d", 1, 3, &record(1, 1.0)).is_err());
        assert!(writer.write_record("d", 1, 3, &record(3, 1.0)).is_err());
        assert_eq!(grid.mutation_count(), 0);
    }
}
