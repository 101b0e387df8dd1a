//! Single-use invites for adding participants to a sheet.

use crate::error::{LedgerError, Result};
use crate::repository::{ParticipantId, SheetRecord, SheetRepository};
use rand::RngCore;
use tracing::info;

pub const INVITE_TOKEN_BYTES: usize = 16;

/// Random token rendered as lowercase hex.
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; INVITE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Issue a fresh invite for `sheet_id`, replacing any outstanding one.
/// Only participants may invite.
pub fn issue_invite<R: SheetRepository + ?Sized>(
    repo: &R,
    sheet_id: &str,
    inviter: ParticipantId,
) -> Result<String> {
    repo.get_sheet(sheet_id)?.ensure_participant(inviter)?;
    let token = generate_invite_token();
    repo.add_invite(sheet_id, &token)?;
    info!(sheet_id, inviter, "issued invite");
    Ok(token)
}

/// Redeem `token`: the invite is consumed and `participant` joins its sheet.
pub fn join_sheet<R: SheetRepository + ?Sized>(
    repo: &R,
    token: &str,
    participant: ParticipantId,
) -> Result<SheetRecord> {
    let sheet = repo
        .find_by_invite(token.trim())?
        .ok_or(LedgerError::InvalidInvite)?;
    repo.remove_invite(&sheet.sheet_id)?;
    repo.add_participant(&sheet.sheet_id, participant)?;
    info!(sheet_id = %sheet.sheet_id, participant, "joined sheet");
    repo.get_sheet(&sheet.sheet_id)
}
