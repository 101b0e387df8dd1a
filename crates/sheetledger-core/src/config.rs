//! Engine configuration.
//!
//! Resolution order: an explicit file, else `config.toml` in the platform
//! config directory, else built-in defaults. `SHEETLEDGER_*` environment
//! variables override whatever was loaded.

use crate::error::{LedgerError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_GAP_SIZE: usize = 5;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_INVITE_TTL_SECS: i64 = 300;
pub const DEFAULT_RECORD_TTL_SECS: i64 = 3600 * 24 * 30;
pub const MAX_GAP_SIZE: usize = 1_000;
pub const MAX_BATCH_SIZE: usize = 10_000;
pub const MAX_TTL_SECS: i64 = 3600 * 24 * 365 * 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Tab addressed in wire ranges.
    pub tab_name: String,
    /// Label of reserved column 0.
    pub date_label: String,
    /// Label of reserved column 1.
    pub description_label: String,
    /// Blank rows that close a section.
    pub gap_size: usize,
    /// Rows fetched per scan window.
    pub batch_size: usize,
    pub invite_ttl_secs: i64,
    pub record_ttl_secs: i64,
    /// Where the CLI keeps documents and the sheet repository.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tab_name: "Sheet1".to_string(),
            date_label: "Date".to_string(),
            description_label: "Description".to_string(),
            gap_size: DEFAULT_GAP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            invite_ttl_secs: DEFAULT_INVITE_TTL_SECS,
            record_ttl_secs: DEFAULT_RECORD_TTL_SECS,
            data_dir: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "sheetledger")
}

impl Config {
    /// Platform config file location, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|proj| proj.config_dir().join("config.toml"))
    }

    /// Load, apply environment overrides and validate.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Config::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SHEETLEDGER_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SHEETLEDGER_GAP_SIZE") {
            self.gap_size = parse_size("SHEETLEDGER_GAP_SIZE", &value)?;
        }
        if let Some(value) = lookup("SHEETLEDGER_BATCH_SIZE") {
            self.batch_size = parse_size("SHEETLEDGER_BATCH_SIZE", &value)?;
        }
        if let Some(value) = lookup("SHEETLEDGER_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(value));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_GAP_SIZE).contains(&self.gap_size) {
            return Err(LedgerError::Config(format!(
                "gap_size must be between 1 and {}, got {}",
                MAX_GAP_SIZE, self.gap_size
            )));
        }
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(LedgerError::Config(format!(
                "batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.date_label.is_empty() || self.description_label.is_empty() {
            return Err(LedgerError::Config("reserved column labels must not be empty".into()));
        }
        if self.date_label == self.description_label {
            return Err(LedgerError::Config("reserved column labels must differ".into()));
        }
        if self.tab_name.is_empty() {
            return Err(LedgerError::Config("tab_name must not be empty".into()));
        }
        let ttls = 1..=MAX_TTL_SECS;
        if !ttls.contains(&self.invite_ttl_secs) || !ttls.contains(&self.record_ttl_secs) {
            return Err(LedgerError::Config(format!(
                "TTLs must be between 1 and {} seconds",
                MAX_TTL_SECS
            )));
        }
        Ok(())
    }

    /// Configured data directory, else the platform data dir, else `./.sheetledger`.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|proj| proj.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".sheetledger"))
    }

    /// The two labels every header starts with.
    pub fn reserved_labels(&self) -> [String; 2] {
        [self.date_label.clone(), self.description_label.clone()]
    }
}

fn parse_size(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| LedgerError::Config(format!("{} must be a positive integer, got '{}'", key, value)))
}
