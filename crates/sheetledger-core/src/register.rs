use crate::error::{LedgerError, Result};
use crate::repository::{ParticipantId, SheetRecord, SheetRepository};
use crate::sheet_url::resolve_sheet_id;
use sheetledger_grid::{GridClient, GridError};
use tracing::info;

/// Register a shared document as a ledger owned by `owner`.
///
/// `url_or_id` is a spreadsheet URL or a bare document id. A blank `name`
/// falls back to the document id.
pub fn register_sheet<G, R>(
    grid: &G,
    repo: &R,
    url_or_id: &str,
    name: &str,
    owner: ParticipantId,
) -> Result<SheetRecord>
where
    G: GridClient + ?Sized,
    R: SheetRepository + ?Sized,
{
    let sheet_id = resolve_sheet_id(url_or_id)?;

    if !grid.can_access(&sheet_id) {
        return Err(LedgerError::DocumentUnreachable(GridError::Unreachable {
            doc: sheet_id,
            reason: "document is not shared with this account".to_string(),
        }));
    }

    match repo.get_sheet(&sheet_id) {
        Ok(_) => return Err(LedgerError::SheetAlreadyRegistered(sheet_id)),
        Err(LedgerError::SheetNotFound(_)) => {}
        Err(err) => return Err(err),
    }

    let name = match name.trim() {
        "" => sheet_id.clone(),
        trimmed => trimmed.to_string(),
    };
    let record = repo.add_sheet(SheetRecord::new(sheet_id, name, owner))?;
    info!(sheet_id = %record.sheet_id, owner, "registered sheet");
    Ok(record)
}
