//! End-to-end appends through the coordinator against an in-memory grid.

use chrono::NaiveDate;
use sheetledger_core::engine::AppendCoordinator;
use sheetledger_core::repository::{Page, ParticipantId};
use sheetledger_core::{
    Config, LedgerError, MemoryRepository, Participant, SheetRecord, SheetRepository,
};
use sheetledger_grid::{CellRef, CellValue, GridClient, MemoryGrid, RangeSpec};
use std::sync::Arc;

const DOC: &str = "ledger";

fn fixed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

fn setup(participants: &[ParticipantId]) -> AppendCoordinator<Arc<MemoryGrid>, Arc<MemoryRepository>> {
    let grid = Arc::new(MemoryGrid::new().with_document(DOC));
    let repo = Arc::new(MemoryRepository::new());
    let mut record = SheetRecord::new(DOC, "House", participants[0]);
    record.participant_ids = participants.to_vec();
    repo.add_sheet(record).unwrap();
    AppendCoordinator::new(grid, repo, Config::default()).with_clock(fixed_day)
}

fn text(s: &str) -> CellValue {
    CellValue::text(s)
}

#[test]
fn test_first_append_creates_header_and_column() {
    let ledger = setup(&[1]);
    let ann = Participant::new(1, "Ann");

    let receipt = ledger.append_spending(DOC, &ann, 12.5, "bread").unwrap();
    assert_eq!((receipt.row, receipt.column), (1, 2));
    assert!(receipt.cursor_persisted);

    assert_eq!(
        ledger.grid().snapshot(DOC).unwrap(),
        vec![
            vec![text("Date"), text("Description"), text("Ann")],
            vec![text("2024-03-09"), text("bread"), CellValue::Number(12.5)],
        ]
    );
    assert_eq!(ledger.repo().get_sheet(DOC).unwrap().last_record_index, 1);
}

#[test]
fn test_consecutive_appends_fill_the_open_section() {
    let ledger = setup(&[1, 2]);
    let ann = Participant::new(1, "Ann");
    let bob = Participant::new(2, "Bob");

    let rows: Vec<usize> = [
        ledger.append_spending(DOC, &ann, 1.0, "a").unwrap(),
        ledger.append_spending(DOC, &bob, 2.0, "b").unwrap(),
        ledger.append_spending(DOC, &ann, 3.0, "c").unwrap(),
    ]
    .iter()
    .map(|r| r.row)
    .collect();
    assert_eq!(rows, vec![1, 2, 3]);

    // Bob's column was inserted at 2, pushing Ann's (and her first amount) to 3.
    let grid = ledger.grid();
    assert_eq!(grid.get_cell(DOC, CellRef::new(2, 0)), text("Bob"));
    assert_eq!(grid.get_cell(DOC, CellRef::new(3, 0)), text("Ann"));
    assert_eq!(grid.get_cell(DOC, CellRef::new(3, 1)), CellValue::Number(1.0));
    assert_eq!(grid.get_cell(DOC, CellRef::new(2, 2)), CellValue::Number(2.0));
    assert_eq!(grid.get_cell(DOC, CellRef::new(3, 3)), CellValue::Number(3.0));
    assert!(grid.get_cell(DOC, CellRef::new(2, 3)).is_blank());
}

#[test]
fn test_record_row_has_single_amount() {
    let ledger = setup(&[1, 2, 3]);
    for (id, label) in [(1, "Ann"), (2, "Bob"), (3, "Cat")] {
        ledger
            .append_spending(DOC, &Participant::new(id, label), id as f64, "seed")
            .unwrap();
    }
    let receipt = ledger
        .append_spending(DOC, &Participant::new(2, "Bob"), 7.75, "taxi")
        .unwrap();

    let row = ledger
        .grid()
        .read_range(DOC, &RangeSpec::window(receipt.row, 1, 0, 4))
        .unwrap()
        .remove(0);
    for (col, cell) in row.iter().enumerate().skip(2) {
        if col == receipt.column {
            assert_eq!(cell, &CellValue::Number(7.75));
        } else {
            assert!(cell.is_blank(), "column {col} should be blank");
        }
    }
}

#[test]
fn test_manual_gap_starts_a_new_section_only_after_it_closes() {
    let ledger = setup(&[1]);
    let ann = Participant::new(1, "Ann");
    ledger.append_spending(DOC, &ann, 1.0, "first").unwrap();

    // A human adds an unrelated block further down after a proper gap.
    let grid = ledger.grid();
    grid.set_cell(DOC, CellRef::new(1, 9), "summary").unwrap();
    grid.set_cell(DOC, CellRef::new(1, 10), "totals").unwrap();

    let receipt = ledger.append_spending(DOC, &ann, 2.0, "second").unwrap();
    assert_eq!(receipt.row, 2);
}

#[test]
fn test_stale_cursor_is_self_healing() {
    let ledger = setup(&[1]);
    let ann = Participant::new(1, "Ann");
    ledger.append_spending(DOC, &ann, 1.0, "a").unwrap();
    ledger.append_spending(DOC, &ann, 2.0, "b").unwrap();

    // Cursor far past the data, as if rows were deleted by hand.
    ledger.repo().update_cursor(DOC, 480).unwrap();
    assert_eq!(ledger.append_spending(DOC, &ann, 3.0, "c").unwrap().row, 3);

    // Cursor lagging behind the data.
    ledger.repo().update_cursor(DOC, 1).unwrap();
    assert_eq!(ledger.append_spending(DOC, &ann, 4.0, "d").unwrap().row, 4);
}

#[test]
fn test_non_participant_is_rejected_without_grid_mutation() {
    let ledger = setup(&[1]);
    let before = ledger.grid().mutation_count();

    let err = ledger
        .append_spending(DOC, &Participant::new(99, "Mallory"), 5.0, "x")
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotAParticipant { participant: 99, .. }
    ));
    assert_eq!(ledger.grid().mutation_count(), before);
    assert!(ledger.grid().snapshot(DOC).unwrap().is_empty());
}

#[test]
fn test_unknown_sheet() {
    let ledger = setup(&[1]);
    assert!(matches!(
        ledger.append_spending("other", &Participant::new(1, "Ann"), 1.0, "x"),
        Err(LedgerError::SheetNotFound(_))
    ));
}

#[test]
fn test_malformed_header_is_not_repaired() {
    let ledger = setup(&[1]);
    ledger.grid().set_cell(DOC, CellRef::new(2, 0), "Ann").unwrap();
    let before = ledger.grid().mutation_count();

    assert!(matches!(
        ledger.append_spending(DOC, &Participant::new(1, "Ann"), 1.0, "x"),
        Err(LedgerError::MalformedHeader { .. })
    ));
    assert_eq!(ledger.grid().mutation_count(), before);
}

#[test]
fn test_unreachable_grid_surfaces_and_retry_succeeds() {
    let ledger = setup(&[1]);
    let ann = Participant::new(1, "Ann");
    ledger.grid().fail_next(DOC, "503 backend error");

    assert!(matches!(
        ledger.append_spending(DOC, &ann, 1.0, "x"),
        Err(LedgerError::DocumentUnreachable(_))
    ));
    assert_eq!(ledger.append_spending(DOC, &ann, 1.0, "x").unwrap().row, 1);
}

#[test]
fn test_oversized_batch_is_rejected_before_touching_the_grid() {
    let grid = MemoryGrid::new().with_document(DOC);
    let repo = MemoryRepository::new();
    repo.add_sheet(SheetRecord::new(DOC, "House", 1)).unwrap();
    let config = Config {
        batch_size: usize::MAX,
        ..Config::default()
    };
    let ledger = AppendCoordinator::new(grid, repo, config);

    assert!(matches!(
        ledger.append_spending(DOC, &Participant::new(1, "Ann"), 1.0, "x"),
        Err(LedgerError::Config(_))
    ));
    assert_eq!(ledger.grid().mutation_count(), 0);
}

#[test]
fn test_document_lock_is_released_after_append() {
    let ledger = setup(&[1]);
    let ann = Participant::new(1, "Ann");
    ledger.append_spending(DOC, &ann, 1.0, "a").unwrap();
    assert!(ledger.locks().is_empty());

    ledger.grid().fail_next(DOC, "timeout");
    assert!(ledger.append_spending(DOC, &ann, 2.0, "b").is_err());
    assert!(ledger.locks().is_empty());
}

#[test]
fn test_non_finite_amount_is_rejected() {
    let ledger = setup(&[1]);
    assert!(matches!(
        ledger.append_spending(DOC, &Participant::new(1, "Ann"), f64::NAN, "x"),
        Err(LedgerError::InvalidAmount(_))
    ));
}

/// Repository whose cursor writes always fail.
struct NoCursorWrites(MemoryRepository);

impl SheetRepository for NoCursorWrites {
    fn get_sheet(&self, sheet_id: &str) -> sheetledger_core::Result<SheetRecord> {
        self.0.get_sheet(sheet_id)
    }
    fn add_sheet(&self, sheet: SheetRecord) -> sheetledger_core::Result<SheetRecord> {
        self.0.add_sheet(sheet)
    }
    fn list_sheets(
        &self,
        participant: ParticipantId,
        limit: usize,
        after: Option<&str>,
    ) -> sheetledger_core::Result<Page> {
        self.0.list_sheets(participant, limit, after)
    }
    fn update_cursor(&self, _sheet_id: &str, _row: usize) -> sheetledger_core::Result<()> {
        Err(LedgerError::Io(std::io::Error::other("table throttled")))
    }
    fn add_participant(&self, sheet_id: &str, participant: ParticipantId) -> sheetledger_core::Result<()> {
        self.0.add_participant(sheet_id, participant)
    }
    fn add_invite(&self, sheet_id: &str, token: &str) -> sheetledger_core::Result<()> {
        self.0.add_invite(sheet_id, token)
    }
    fn remove_invite(&self, sheet_id: &str) -> sheetledger_core::Result<()> {
        self.0.remove_invite(sheet_id)
    }
    fn find_by_invite(&self, token: &str) -> sheetledger_core::Result<Option<SheetRecord>> {
        self.0.find_by_invite(token)
    }
}

#[test]
fn test_cursor_failure_does_not_fail_the_append() {
    let repo = MemoryRepository::new();
    repo.add_sheet(SheetRecord::new(DOC, "House", 1)).unwrap();
    let grid = MemoryGrid::new().with_document(DOC);
    let ledger = AppendCoordinator::new(grid, NoCursorWrites(repo), Config::default())
        .with_clock(fixed_day);
    let ann = Participant::new(1, "Ann");

    let first = ledger.append_spending(DOC, &ann, 1.0, "a").unwrap();
    assert!(!first.cursor_persisted);
    assert_eq!(ledger.repo().get_sheet(DOC).unwrap().last_record_index, 0);

    // Without a cursor the next append rescans and still lands correctly.
    let second = ledger.append_spending(DOC, &ann, 2.0, "b").unwrap();
    assert_eq!(second.row, 2);
}

#[test]
fn test_custom_layout_from_config() {
    let grid = MemoryGrid::new().with_document(DOC);
    let repo = MemoryRepository::new();
    repo.add_sheet(SheetRecord::new(DOC, "House", 1)).unwrap();
    let config = Config::from_toml_str(
        "date_label = \"Datum\"\ndescription_label = \"Omschrijving\"\ngap_size = 2\nbatch_size = 3\n",
    )
    .unwrap();
    let ledger = AppendCoordinator::new(grid, repo, config).with_clock(fixed_day);
    let ann = Participant::new(1, "Ann");

    ledger.append_spending(DOC, &ann, 1.0, "a").unwrap();
    ledger.grid().set_cell(DOC, CellRef::new(1, 4), "later block").unwrap();
    // Two blank rows close the first section under a gap of two.
    assert_eq!(ledger.append_spending(DOC, &ann, 2.0, "b").unwrap().row, 2);
    assert_eq!(ledger.grid().get_cell(DOC, CellRef::new(0, 0)), text("Datum"));
}
