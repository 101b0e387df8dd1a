//! sheetledger-core - append engine for spending ledgers kept in shared,
//! human-editable spreadsheets, plus the sheet repository, invites and
//! configuration around it.

pub mod amount;
pub mod config;
pub mod engine;
pub mod error;
pub mod invite;
pub mod register;
pub mod repository;
pub mod sheet_url;

pub use amount::parse_amount;
pub use config::Config;
pub use engine::{AppendCoordinator, AppendReceipt};
pub use error::{LedgerError, Result};
pub use invite::{issue_invite, join_sheet};
pub use register::register_sheet;
pub use repository::{
    FileRepository, MemoryRepository, Participant, ParticipantId, SheetRecord, SheetRepository,
};
