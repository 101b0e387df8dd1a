//! The sheet append engine.
//!
//! - [`HeaderManager`] - header row creation and participant columns
//! - [`SectionScanner`] - finds the row for the next record
//! - [`RecordWriter`] - writes one ledger row
//! - [`CursorStore`] - last-write hint kept in the sheet repository
//! - [`AppendCoordinator`] - runs the above per append

mod append;
mod cursor;
mod header;
mod locks;
mod scanner;
mod writer;

pub use append::{AppendCoordinator, AppendReceipt, Clock};
pub use cursor::CursorStore;
pub use header::{Header, HeaderManager, RESERVED_COLUMNS};
pub use locks::DocumentLocks;
pub use scanner::{ScanState, SectionScan, SectionScanner};
pub use writer::{Record, RecordWriter, build_row};
