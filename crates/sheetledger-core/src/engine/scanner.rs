//! Vacant-row location.
//!
//! The body of a ledger is a series of sections: runs of non-blank rows
//! separated by at least `gap_size` blank rows. New records go directly below
//! the last non-blank row of the open section, which is only known to be
//! closed once `gap_size` blank rows follow it.
//!
//! The scan is a small state machine ([`SectionScan`]) fed one window of rows
//! at a time by [`SectionScanner`]:
//!
//! - `ScanningForward` from the seed row while data has been seen
//! - `ScanningBackward` while every window so far was blank
//! - `Done` with the target row
//!
//! A window that contains no rows past the end of the sheet's data counts
//! those rows as blank.

use crate::error::Result;
use sheetledger_grid::{CellValue, GridClient, RangeSpec, grid::row_is_blank};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    ScanningForward { window_start: usize },
    ScanningBackward { window_start: usize },
    Done(usize),
}

/// Pure scan state, independent of any grid store.
#[derive(Clone, Debug)]
pub struct SectionScan {
    state: ScanState,
    gap_size: usize,
    batch_size: usize,
    last_non_blank: Option<usize>,
    blank_run: usize,
}

impl SectionScan {
    /// `start_row` is clamped to 1 so the header is never the seed.
    /// Zero sizes are treated as 1.
    pub fn new(start_row: usize, gap_size: usize, batch_size: usize) -> Self {
        SectionScan {
            state: ScanState::ScanningForward {
                window_start: start_row.max(1),
            },
            gap_size: gap_size.max(1),
            batch_size: batch_size.max(1),
            last_non_blank: None,
            blank_run: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Consume the rows of the current window and advance.
    ///
    /// `rows[i]` is row `window_start + i`; rows missing from the slice are blank.
    pub fn feed(&mut self, rows: &[Vec<CellValue>]) -> ScanState {
        let window_start = match self.state {
            ScanState::ScanningForward { window_start }
            | ScanState::ScanningBackward { window_start } => window_start,
            ScanState::Done(_) => return self.state,
        };

        for offset in 0..self.batch_size {
            // Nothing seen yet and nothing left to see in this window.
            if self.last_non_blank.is_none() && offset >= rows.len() {
                break;
            }
            let row = window_start.saturating_add(offset);
            let blank = rows.get(offset).is_none_or(|cells| row_is_blank(cells));
            if !blank {
                self.last_non_blank = Some(row);
                self.blank_run = 0;
                continue;
            }
            self.blank_run += 1;
            if let Some(last) = self.last_non_blank
                && self.blank_run >= self.gap_size
            {
                self.state = ScanState::Done(last.saturating_add(1));
                return self.state;
            }
        }

        self.state = if self.last_non_blank.is_some() {
            ScanState::ScanningForward {
                window_start: window_start.saturating_add(self.batch_size),
            }
        } else if window_start == 0 {
            ScanState::Done(0)
        } else {
            ScanState::ScanningBackward {
                window_start: window_start.saturating_sub(self.batch_size),
            }
        };
        self.state
    }
}

pub struct SectionScanner<'a, G: GridClient + ?Sized> {
    grid: &'a G,
    tab: &'a str,
}

impl<'a, G: GridClient + ?Sized> SectionScanner<'a, G> {
    pub fn new(grid: &'a G, tab: &'a str) -> Self {
        SectionScanner { grid, tab }
    }

    /// Row at which the next record of `doc` belongs.
    ///
    /// `cols` is the inclusive column range that decides blankness. Returns 0
    /// only when every row from the seed back to row 0 is blank.
    pub fn locate_append_row(
        &self,
        doc: &str,
        start_row: usize,
        cols: (usize, usize),
        gap_size: usize,
        batch_size: usize,
    ) -> Result<usize> {
        let mut scan = SectionScan::new(start_row, gap_size, batch_size);
        let mut windows = 0usize;
        loop {
            let window_start = match scan.state() {
                ScanState::Done(row) => {
                    debug!(doc, row, windows, "located append row");
                    return Ok(row);
                }
                ScanState::ScanningForward { window_start }
                | ScanState::ScanningBackward { window_start } => window_start,
            };
            let range = RangeSpec::window(window_start, scan.batch_size(), cols.0, cols.1)
                .on_tab(self.tab);
            let rows = self.grid.read_range(doc, &range)?;
            windows += 1;
            debug!(doc, range = %range, state = ?scan.state(), "scan window");
            scan.feed(&rows);
        }
    }
}
