use super::{MemoryRepository, Page, ParticipantId, SheetRecord, SheetRepository};
use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Default, Serialize, Deserialize)]
struct SheetsFile {
    #[serde(default)]
    sheets: Vec<SheetRecord>,
}

/// Sheet repository persisted as a single TOML file.
///
/// Every operation re-reads the file, so handles opened by other processes
/// see each other's changes. Mutations apply to the freshly read records and
/// rewrite the file through a temp file + rename. The read-modify-write is
/// serialized within this process only.
pub struct FileRepository {
    path: PathBuf,
    inner: MemoryRepository,
    lock: Mutex<()>,
}

impl FileRepository {
    pub fn open(path: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        let repo = FileRepository {
            path: path.into(),
            inner: MemoryRepository::from_config(config),
            lock: Mutex::new(()),
        };
        repo.reload()?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory records with the file's current contents.
    fn reload(&self) -> Result<()> {
        let sheets = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            toml::from_str::<SheetsFile>(&content)?.sheets
        } else {
            Vec::new()
        };
        debug!(path = %self.path.display(), sheets = sheets.len(), "loaded sheet repository");
        self.inner.load(sheets);
        Ok(())
    }

    fn read<T>(&self, op: impl FnOnce(&MemoryRepository) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.reload()?;
        op(&self.inner)
    }

    fn write<T>(&self, op: impl FnOnce(&MemoryRepository) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.reload()?;
        let out = op(&self.inner)?;
        self.flush()?;
        Ok(out)
    }

    fn flush(&self) -> Result<()> {
        let file = SheetsFile {
            sheets: self.inner.records(),
        };
        let content = toml::to_string_pretty(&file)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SheetRepository for FileRepository {
    fn get_sheet(&self, sheet_id: &str) -> Result<SheetRecord> {
        self.read(|repo| repo.get_sheet(sheet_id))
    }

    fn add_sheet(&self, sheet: SheetRecord) -> Result<SheetRecord> {
        self.write(|repo| repo.add_sheet(sheet))
    }

    fn list_sheets(
        &self,
        participant: ParticipantId,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Page> {
        self.read(|repo| repo.list_sheets(participant, limit, after))
    }

    fn update_cursor(&self, sheet_id: &str, row: usize) -> Result<()> {
        self.write(|repo| repo.update_cursor(sheet_id, row))
    }

    fn add_participant(&self, sheet_id: &str, participant: ParticipantId) -> Result<()> {
        self.write(|repo| repo.add_participant(sheet_id, participant))
    }

    fn add_invite(&self, sheet_id: &str, token: &str) -> Result<()> {
        self.write(|repo| repo.add_invite(sheet_id, token))
    }

    fn remove_invite(&self, sheet_id: &str) -> Result<()> {
        self.write(|repo| repo.remove_invite(sheet_id))
    }

    fn find_by_invite(&self, token: &str) -> Result<Option<SheetRecord>> {
        self.read(|repo| repo.find_by_invite(token))
    }
}
