//! Sheet records and the repository that persists them.
//!
//! The repository is the engine's only durable state outside the grid: it
//! knows who may write to a document, where the last record went (the cursor)
//! and which invite token is outstanding.

mod file;
mod memory;

pub use file::FileRepository;
pub use memory::MemoryRepository;

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stable numeric identity of a participant.
pub type ParticipantId = i64;

/// Someone allowed to append: a stable id plus the label used verbatim as
/// their header column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub label: String,
}

impl Participant {
    pub fn new(id: ParticipantId, label: impl Into<String>) -> Self {
        Participant {
            id,
            label: label.into(),
        }
    }
}

/// Single-use token that lets its holder join a sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareInvite {
    pub token: String,
    /// Epoch seconds; the invite is dead at and after this instant.
    pub expires_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetRecord {
    pub sheet_id: String,
    pub name: String,
    pub owner_id: ParticipantId,
    pub participant_ids: Vec<ParticipantId>,
    /// Row of the most recently written ledger row; 0 means never written.
    #[serde(default)]
    pub last_record_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite: Option<ShareInvite>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    /// Epoch seconds after which the store may drop the record.
    #[serde(default)]
    pub expires_at: i64,
}

impl SheetRecord {
    /// A fresh record owned by `owner`, who is also its first participant.
    pub fn new(sheet_id: impl Into<String>, name: impl Into<String>, owner: ParticipantId) -> Self {
        SheetRecord {
            sheet_id: sheet_id.into(),
            name: name.into(),
            owner_id: owner,
            participant_ids: vec![owner],
            last_record_index: 0,
            invite: None,
            created_at: 0,
            updated_at: 0,
            expires_at: 0,
        }
    }

    pub fn is_participant(&self, participant: ParticipantId) -> bool {
        self.participant_ids.contains(&participant)
    }

    pub fn ensure_participant(&self, participant: ParticipantId) -> Result<()> {
        if self.is_participant(participant) {
            Ok(())
        } else {
            Err(LedgerError::NotAParticipant {
                participant,
                sheet_id: self.sheet_id.clone(),
            })
        }
    }
}

/// One page of [`SheetRepository::list_sheets`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub items: Vec<SheetRecord>,
    /// Pass back as `after` to continue; None when exhausted.
    pub next: Option<String>,
}

/// Persistence contract for sheet records.
pub trait SheetRepository: Send + Sync {
    fn get_sheet(&self, sheet_id: &str) -> Result<SheetRecord>;

    /// Put a record, stamping `created_at` (if unset), `updated_at` and `expires_at`.
    fn add_sheet(&self, sheet: SheetRecord) -> Result<SheetRecord>;

    /// Sheets `participant` belongs to, ordered by sheet id, starting after `after`.
    ///
    /// A `limit` of 0 is rejected with [`LedgerError::InvalidPageLimit`].
    fn list_sheets(
        &self,
        participant: ParticipantId,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Page>;

    fn update_cursor(&self, sheet_id: &str, row: usize) -> Result<()>;

    /// Add a participant; adding an existing one is a no-op.
    fn add_participant(&self, sheet_id: &str, participant: ParticipantId) -> Result<()>;

    /// Store `token` as the sheet's only invite, replacing any previous one.
    fn add_invite(&self, sheet_id: &str, token: &str) -> Result<()>;

    fn remove_invite(&self, sheet_id: &str) -> Result<()>;

    /// The sheet holding an unexpired invite with this token.
    fn find_by_invite(&self, token: &str) -> Result<Option<SheetRecord>>;
}

impl<T: SheetRepository + ?Sized> SheetRepository for Arc<T> {
    fn get_sheet(&self, sheet_id: &str) -> Result<SheetRecord> {
        (**self).get_sheet(sheet_id)
    }

    fn add_sheet(&self, sheet: SheetRecord) -> Result<SheetRecord> {
        (**self).add_sheet(sheet)
    }

    fn list_sheets(
        &self,
        participant: ParticipantId,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Page> {
        (**self).list_sheets(participant, limit, after)
    }

    fn update_cursor(&self, sheet_id: &str, row: usize) -> Result<()> {
        (**self).update_cursor(sheet_id, row)
    }

    fn add_participant(&self, sheet_id: &str, participant: ParticipantId) -> Result<()> {
        (**self).add_participant(sheet_id, participant)
    }

    fn add_invite(&self, sheet_id: &str, token: &str) -> Result<()> {
        (**self).add_invite(sheet_id, token)
    }

    fn remove_invite(&self, sheet_id: &str) -> Result<()> {
        (**self).remove_invite(sheet_id)
    }

    fn find_by_invite(&self, token: &str) -> Result<Option<SheetRecord>> {
        (**self).find_by_invite(token)
    }
}

/// Current time in epoch seconds.
pub(crate) fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
