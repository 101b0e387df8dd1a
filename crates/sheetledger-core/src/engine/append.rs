use super::cursor::CursorStore;
use super::header::HeaderManager;
use super::locks::{DocumentLocks, acquire};
use super::scanner::SectionScanner;
use super::writer::{Record, RecordWriter};
use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::repository::{Participant, SheetRecord, SheetRepository};
use chrono::NaiveDate;
use sheetledger_grid::GridClient;
use tracing::{info, warn};

/// Source of the date stamped on new records.
pub type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Where an append landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendReceipt {
    pub row: usize,
    pub column: usize,
    /// False when the row was written but the cursor could not be saved.
    pub cursor_persisted: bool,
}

/// Runs one append end to end: membership check, header, row location,
/// write, cursor update.
///
/// Nothing is retried. Every step re-reads the state it depends on, so a
/// failed append can be retried by calling again.
pub struct AppendCoordinator<G, R> {
    grid: G,
    repo: R,
    config: Config,
    locks: DocumentLocks,
    clock: Clock,
}

impl<G: GridClient, R: SheetRepository> AppendCoordinator<G, R> {
    pub fn new(grid: G, repo: R, config: Config) -> Self {
        AppendCoordinator {
            grid,
            repo,
            config,
            locks: DocumentLocks::new(),
            clock: Box::new(|| chrono::Local::now().date_naive()),
        }
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn locks(&self) -> &DocumentLocks {
        &self.locks
    }

    /// Append `amount` spent by `participant` to document `doc`.
    pub fn append_spending(
        &self,
        doc: &str,
        participant: &Participant,
        amount: f64,
        description: &str,
    ) -> Result<AppendReceipt> {
        if !amount.is_finite() {
            return Err(LedgerError::InvalidAmount(amount.to_string()));
        }
        self.config.validate()?;

        let sheet = self.repo.get_sheet(doc)?;
        sheet.ensure_participant(participant.id)?;

        let lock = self.locks.lock_for(doc);
        let result = {
            let _guard = acquire(&lock);
            self.append_locked(doc, &sheet, participant, amount, description)
        };
        drop(lock);
        self.locks.release(doc);
        result
    }

    fn append_locked(
        &self,
        doc: &str,
        sheet: &SheetRecord,
        participant: &Participant,
        amount: f64,
        description: &str,
    ) -> Result<AppendReceipt> {
        let tab = self.config.tab_name.as_str();
        let headers = HeaderManager::new(
            &self.grid,
            tab,
            [
                self.config.date_label.as_str(),
                self.config.description_label.as_str(),
            ],
        );
        let mut header = headers.ensure_header(doc)?;
        let column = headers.resolve_column(doc, &mut header, &participant.label)?;

        let seed = CursorStore::<R>::cursor_of(sheet).unwrap_or(1).max(1);
        let located = SectionScanner::new(&self.grid, tab).locate_append_row(
            doc,
            seed,
            (0, header.len() - 1),
            self.config.gap_size,
            self.config.batch_size,
        )?;
        // An entirely blank document reports row 0; the header lives there.
        let row = located.max(1);

        let record = Record {
            date: (self.clock)().format("%Y-%m-%d").to_string(),
            description: description.to_string(),
            participant_col: column,
            amount,
        };
        RecordWriter::new(&self.grid, tab).write_record(doc, row, header.len(), &record)?;

        let cursor_persisted = match CursorStore::new(&self.repo).set_cursor(doc, row) {
            Ok(()) => true,
            Err(err) => {
                warn!(doc, row, error = %err, "row written but cursor not saved");
                false
            }
        };

        info!(doc, participant = participant.id, row, column, "appended spending");
        Ok(AppendReceipt {
            row,
            column,
            cursor_persisted,
        })
    }
}
