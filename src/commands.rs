//! Subcommand implementations over the on-disk workspace.

use anyhow::{Context, Result};
use sheetledger_core::sheet_url::resolve_sheet_id;
use sheetledger_core::{
    AppendCoordinator, Config, FileRepository, Participant, SheetRepository, issue_invite,
    join_sheet, parse_amount, register_sheet,
};
use sheetledger_grid::MemoryGrid;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REPOSITORY_FILE: &str = "sheets.toml";

/// Data directory holding one `.grd` file per document plus the sheet repository.
pub struct Workspace {
    config: Config,
    data_dir: PathBuf,
}

impl Workspace {
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path).context("failed to load config")?;
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        Ok(Workspace { config, data_dir })
    }

    fn repository(&self) -> Result<FileRepository> {
        let path = self.data_dir.join(REPOSITORY_FILE);
        FileRepository::open(&path, &self.config)
            .with_context(|| format!("failed to open {}", path.display()))
    }

    fn doc_path(&self, doc: &str) -> PathBuf {
        self.data_dir.join(format!("{}.grd", doc))
    }

    /// Grid holding `doc` if its file exists; otherwise an empty grid, or one
    /// with a fresh document when `create` is set.
    fn load_grid(&self, doc: &str, create: bool) -> Result<MemoryGrid> {
        let grid = MemoryGrid::new();
        let path = self.doc_path(doc);
        if path.exists() {
            grid.load_grd(doc, &path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            debug!(doc, path = %path.display(), "loaded document");
        } else if create {
            grid.create_document(doc);
            info!(doc, "created empty document");
        } else {
            debug!(doc, path = %path.display(), "no local document");
        }
        Ok(grid)
    }

    fn save_grid(&self, grid: &MemoryGrid, doc: &str) -> Result<()> {
        let path = self.doc_path(doc);
        grid.save_grd(doc, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(doc, path = %path.display(), "saved document");
        Ok(())
    }

    pub fn register(&self, sheet: &str, name: &str, owner: i64, create: bool) -> Result<()> {
        let doc = resolve_sheet_id(sheet)?;
        let grid = self.load_grid(&doc, create)?;
        let repo = self.repository()?;
        let record = register_sheet(&grid, &repo, &doc, name, owner)?;
        if create && !self.doc_path(&doc).exists() {
            self.save_grid(&grid, &doc)?;
        }
        println!("registered {} ({})", record.sheet_id, record.name);
        Ok(())
    }

    pub fn append(
        &self,
        sheet: &str,
        user: i64,
        label: &str,
        amount: &str,
        description: &str,
    ) -> Result<()> {
        let doc = resolve_sheet_id(sheet)?;
        let amount = parse_amount(amount)?;
        let ledger = AppendCoordinator::new(
            self.load_grid(&doc, false)?,
            self.repository()?,
            self.config.clone(),
        );
        let participant = Participant::new(user, label);
        let receipt = ledger.append_spending(&doc, &participant, amount, description)?;
        self.save_grid(ledger.grid(), &doc)?;
        println!("row {} column {}", receipt.row + 1, receipt.column + 1);
        Ok(())
    }

    pub fn invite(&self, sheet: &str, user: i64) -> Result<()> {
        let doc = resolve_sheet_id(sheet)?;
        let token = issue_invite(&self.repository()?, &doc, user)?;
        println!("{}", token);
        Ok(())
    }

    pub fn join(&self, token: &str, user: i64) -> Result<()> {
        let record = join_sheet(&self.repository()?, token, user)?;
        println!("joined {} ({})", record.sheet_id, record.name);
        Ok(())
    }

    pub fn list(&self, user: i64, limit: usize, after: Option<&str>) -> Result<()> {
        let page = self.repository()?.list_sheets(user, limit, after)?;
        for record in &page.items {
            println!("{}\t{}", record.sheet_id, record.name);
        }
        if let Some(next) = page.next {
            println!("more after {}", next);
        }
        Ok(())
    }

    pub fn show(&self, sheet: &str) -> Result<()> {
        let doc = resolve_sheet_id(sheet)?;
        let grid = self.load_grid(&doc, false)?;
        for row in grid.snapshot(&doc)? {
            let line: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            println!("{}", line.join("\t"));
        }
        Ok(())
    }
}
