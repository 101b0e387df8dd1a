use super::{Page, ParticipantId, SheetRecord, SheetRepository, ShareInvite, now_secs};
use crate::config::{Config, DEFAULT_INVITE_TTL_SECS, DEFAULT_RECORD_TTL_SECS};
use crate::error::{LedgerError, Result};
use dashmap::DashMap;

/// Sheet repository held in process memory.
///
/// Records past `expires_at` are treated as gone, the way a TTL-enabled store
/// drops them. Every mutation slides the expiry forward.
pub struct MemoryRepository {
    sheets: DashMap<String, SheetRecord>,
    invite_ttl_secs: i64,
    record_ttl_secs: i64,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::with_ttls(DEFAULT_INVITE_TTL_SECS, DEFAULT_RECORD_TTL_SECS)
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttls(invite_ttl_secs: i64, record_ttl_secs: i64) -> Self {
        MemoryRepository {
            sheets: DashMap::new(),
            invite_ttl_secs,
            record_ttl_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_ttls(config.invite_ttl_secs, config.record_ttl_secs)
    }

    /// Replace every record with `records`, exactly as given, without stamping.
    pub(crate) fn load(&self, records: Vec<SheetRecord>) {
        self.sheets.clear();
        for record in records {
            self.sheets.insert(record.sheet_id.clone(), record);
        }
    }

    /// All live records, ordered by sheet id.
    pub fn records(&self) -> Vec<SheetRecord> {
        let now = now_secs();
        let mut records: Vec<SheetRecord> = self
            .sheets
            .iter()
            .filter(|entry| is_live(entry.value(), now))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.sheet_id.cmp(&b.sheet_id));
        records
    }

    fn update<F>(&self, sheet_id: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut SheetRecord),
    {
        let now = now_secs();
        let mut record = self
            .sheets
            .get_mut(sheet_id)
            .filter(|r| is_live(r.value(), now))
            .ok_or_else(|| LedgerError::SheetNotFound(sheet_id.to_string()))?;
        mutate(record.value_mut());
        record.updated_at = now;
        record.expires_at = now + self.record_ttl_secs;
        Ok(())
    }
}

fn is_live(record: &SheetRecord, now: i64) -> bool {
    record.expires_at == 0 || record.expires_at > now
}

impl SheetRepository for MemoryRepository {
    fn get_sheet(&self, sheet_id: &str) -> Result<SheetRecord> {
        let now = now_secs();
        self.sheets
            .get(sheet_id)
            .filter(|r| is_live(r.value(), now))
            .map(|r| r.value().clone())
            .ok_or_else(|| LedgerError::SheetNotFound(sheet_id.to_string()))
    }

    fn add_sheet(&self, mut sheet: SheetRecord) -> Result<SheetRecord> {
        let now = now_secs();
        if sheet.created_at == 0 {
            sheet.created_at = now;
        }
        sheet.updated_at = now;
        sheet.expires_at = now + self.record_ttl_secs;
        self.sheets.insert(sheet.sheet_id.clone(), sheet.clone());
        Ok(sheet)
    }

    fn list_sheets(
        &self,
        participant: ParticipantId,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Page> {
        if limit == 0 {
            return Err(LedgerError::InvalidPageLimit);
        }
        let mut matching = self
            .records()
            .into_iter()
            .filter(|r| r.is_participant(participant))
            .filter(|r| after.is_none_or(|after| r.sheet_id.as_str() > after));

        let items: Vec<SheetRecord> = matching.by_ref().take(limit).collect();
        let next = match matching.next() {
            Some(_) => items.last().map(|r| r.sheet_id.clone()),
            None => None,
        };
        Ok(Page { items, next })
    }

    fn update_cursor(&self, sheet_id: &str, row: usize) -> Result<()> {
        self.update(sheet_id, |r| r.last_record_index = row)
    }

    fn add_participant(&self, sheet_id: &str, participant: ParticipantId) -> Result<()> {
        self.update(sheet_id, |r| {
            if !r.participant_ids.contains(&participant) {
                r.participant_ids.push(participant);
            }
        })
    }

    fn add_invite(&self, sheet_id: &str, token: &str) -> Result<()> {
        let expires_at = now_secs() + self.invite_ttl_secs;
        self.update(sheet_id, |r| {
            r.invite = Some(ShareInvite {
                token: token.to_string(),
                expires_at,
            })
        })
    }

    fn remove_invite(&self, sheet_id: &str) -> Result<()> {
        self.update(sheet_id, |r| r.invite = None)
    }

    fn find_by_invite(&self, token: &str) -> Result<Option<SheetRecord>> {
        let now = now_secs();
        Ok(self.records().into_iter().find(|r| {
            r.invite
                .as_ref()
                .is_some_and(|invite| invite.token == token && invite.expires_at > now)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_with(ids: &[(&str, ParticipantId)]) -> MemoryRepository {
        let repo = MemoryRepository::new();
        for (id, owner) in ids {
            repo.add_sheet(SheetRecord::new(*id, *id, *owner)).unwrap();
        }
        repo
    }

    #[test]
    fn test_add_sheet_stamps_times() {
        let repo = MemoryRepository::new();
        let stored = repo.add_sheet(SheetRecord::new("s1", "Trip", 1)).unwrap();
        assert!(stored.created_at > 0);
        assert_eq!(stored.created_at, stored.updated_at);
        assert_eq!(stored.expires_at, stored.updated_at + DEFAULT_RECORD_TTL_SECS);
        assert_eq!(repo.get_sheet("s1").unwrap(), stored);
    }

    #[test]
    fn test_add_sheet_keeps_existing_created_at() {
        let repo = MemoryRepository::new();
        let mut record = SheetRecord::new("s1", "Trip", 1);
        record.created_at = 42;
        assert_eq!(repo.add_sheet(record).unwrap().created_at, 42);
    }

    #[test]
    fn test_missing_sheet() {
        let repo = MemoryRepository::new();
        assert!(matches!(repo.get_sheet("nope"), Err(LedgerError::SheetNotFound(_))));
        assert!(matches!(
            repo.update_cursor("nope", 3),
            Err(LedgerError::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_update_cursor() {
        let repo = repo_with(&[("s1", 1)]);
        repo.update_cursor("s1", 17).unwrap();
        assert_eq!(repo.get_sheet("s1").unwrap().last_record_index, 17);
    }

    #[test]
    fn test_add_participant_is_idempotent() {
        let repo = repo_with(&[("s1", 1)]);
        repo.add_participant("s1", 2).unwrap();
        repo.add_participant("s1", 2).unwrap();
        assert_eq!(repo.get_sheet("s1").unwrap().participant_ids, vec![1, 2]);
    }

    #[test]
    fn test_list_sheets_paginates_by_id() {
        let repo = repo_with(&[("c", 1), ("a", 1), ("b", 2), ("d", 1)]);
        let first = repo.list_sheets(1, 2, None).unwrap();
        let ids: Vec<_> = first.items.iter().map(|r| r.sheet_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(first.next.as_deref(), Some("c"));

        let second = repo.list_sheets(1, 2, first.next.as_deref()).unwrap();
        let ids: Vec<_> = second.items.iter().map(|r| r.sheet_id.as_str()).collect();
        assert_eq!(ids, vec!["d"]);
        assert_eq!(second.next, None);
    }

    #[test]
    fn test_list_sheets_rejects_zero_limit() {
        let repo = repo_with(&[("a", 1)]);
        assert!(matches!(
            repo.list_sheets(1, 0, None),
            Err(LedgerError::InvalidPageLimit)
        ));
    }

    #[test]
    fn test_invite_lookup_and_removal() {
        let repo = repo_with(&[("s1", 1)]);
        repo.add_invite("s1", "tok").unwrap();
        assert_eq!(repo.find_by_invite("tok").unwrap().unwrap().sheet_id, "s1");
        assert!(repo.find_by_invite("other").unwrap().is_none());

        repo.remove_invite("s1").unwrap();
        assert!(repo.find_by_invite("tok").unwrap().is_none());
    }

    #[test]
    fn test_new_invite_replaces_old() {
        let repo = repo_with(&[("s1", 1)]);
        repo.add_invite("s1", "first").unwrap();
        repo.add_invite("s1", "second").unwrap();
        assert!(repo.find_by_invite("first").unwrap().is_none());
        assert!(repo.find_by_invite("second").unwrap().is_some());
    }

    #[test]
    fn test_expired_invite_is_not_found() {
        let repo = MemoryRepository::with_ttls(0, DEFAULT_RECORD_TTL_SECS);
        repo.add_sheet(SheetRecord::new("s1", "Trip", 1)).unwrap();
        repo.add_invite("s1", "tok").unwrap();
        assert!(repo.find_by_invite("tok").unwrap().is_none());
    }

    #[test]
    fn test_expired_record_is_gone() {
        let repo = MemoryRepository::new();
        let mut record = SheetRecord::new("s1", "Trip", 1);
        record.expires_at = 1;
        repo.load(vec![record]);
        assert!(matches!(repo.get_sheet("s1"), Err(LedgerError::SheetNotFound(_))));
        assert!(repo.records().is_empty());
    }
}
