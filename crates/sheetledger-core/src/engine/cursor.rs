use crate::error::{LedgerError, Result};
use crate::repository::{SheetRecord, SheetRepository};

/// Per-document hint of where the last record was written.
///
/// The cursor only seeds the section scan; it is never trusted as the write
/// position, so a stale or lost cursor costs scan time, not correctness.
pub struct CursorStore<'a, R: SheetRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: SheetRepository + ?Sized> CursorStore<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        CursorStore { repo }
    }

    /// Cursor held in an already fetched record; None if never written.
    pub fn cursor_of(record: &SheetRecord) -> Option<usize> {
        Some(record.last_record_index).filter(|row| *row > 0)
    }

    pub fn get_cursor(&self, sheet_id: &str) -> Result<Option<usize>> {
        Ok(Self::cursor_of(&self.repo.get_sheet(sheet_id)?))
    }

    /// Persist `row`. Any repository failure surfaces as `CursorPersistFailure`.
    pub fn set_cursor(&self, sheet_id: &str, row: usize) -> Result<()> {
        self.repo
            .update_cursor(sheet_id, row)
            .map_err(|e| LedgerError::CursorPersistFailure {
                sheet_id: sheet_id.to_string(),
                reason: e.to_string(),
            })
    }
}
