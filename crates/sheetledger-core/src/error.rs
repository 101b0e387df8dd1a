//! Error types for the append engine and its collaborators.

use crate::repository::ParticipantId;
use sheetledger_grid::GridError;
use thiserror::Error;

/// Errors that can occur while appending to or administering a ledger sheet
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("User {participant} is not a participant of the sheet {sheet_id}")]
    NotAParticipant {
        participant: ParticipantId,
        sheet_id: String,
    },

    #[error("Document unreachable: {0}")]
    DocumentUnreachable(#[from] GridError),

    #[error("Malformed header in {sheet_id}: {reason}")]
    MalformedHeader { sheet_id: String, reason: String },

    #[error("Failed to persist cursor for {sheet_id}: {reason}")]
    CursorPersistFailure { sheet_id: String, reason: String },

    #[error("Invalid participant label: '{0}'")]
    InvalidLabel(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet already registered: {0}")]
    SheetAlreadyRegistered(String),

    #[error("Invite is invalid or expired")]
    InvalidInvite,

    #[error("Not a spreadsheet URL or id: {0}")]
    InvalidSheetUrl(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Page limit must be at least 1")]
    InvalidPageLimit,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
