//! Rectangular range addressing.
//!
//! Internally a range is a pair of zero-indexed corners (or a span of whole
//! rows). At the wire boundary it renders in the notation sheet stores expect:
//! `Sheet1!A2:C101` for a block and `Sheet1!1:1` for whole rows, with 1-based
//! row numbers and lettered columns.

use super::cell_ref::{CellRef, letters_to_col};
use crate::error::{GridError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// The rows and columns a range covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Span {
    /// Inclusive corners, `start` top-left and `end` bottom-right.
    Block { start: CellRef, end: CellRef },
    /// Inclusive whole rows, every column.
    Rows { start: usize, end: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeSpec {
    pub tab: Option<String>,
    pub span: Span,
}

impl RangeSpec {
    /// Block between two corners in any order.
    pub fn block(a: CellRef, b: CellRef) -> Self {
        let start = CellRef::new(a.col.min(b.col), a.row.min(b.row));
        let end = CellRef::new(a.col.max(b.col), a.row.max(b.row));
        RangeSpec {
            tab: None,
            span: Span::Block { start, end },
        }
    }

    /// `rows` starting at `start_row`, covering columns `start_col..=end_col`.
    ///
    /// `rows` is treated as at least 1; the last row saturates at `usize::MAX`.
    pub fn window(start_row: usize, rows: usize, start_col: usize, end_col: usize) -> Self {
        let last = start_row.saturating_add(rows.max(1) - 1);
        Self::block(
            CellRef::new(start_col, start_row),
            CellRef::new(end_col, last),
        )
    }

    /// A single whole row.
    pub fn row(row: usize) -> Self {
        RangeSpec {
            tab: None,
            span: Span::Rows {
                start: row,
                end: row,
            },
        }
    }

    pub fn on_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = Some(tab.into());
        self
    }

    /// First and last row, inclusive.
    pub fn rows(&self) -> (usize, usize) {
        match self.span {
            Span::Block { start, end } => (start.row, end.row),
            Span::Rows { start, end } => (start, end),
        }
    }

    /// First and last column, inclusive; None for whole-row spans.
    pub fn cols(&self) -> Option<(usize, usize)> {
        match self.span {
            Span::Block { start, end } => Some((start.col, end.col)),
            Span::Rows { .. } => None,
        }
    }

    pub fn row_count(&self) -> usize {
        let (start, end) = self.rows();
        (end - start).saturating_add(1)
    }

    /// Parse wire notation (`Sheet1!A2:C101`, `'My Tab'!B3`, `1:1`).
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || GridError::InvalidRange(input.to_string());
        let caps = range_re().captures(input.trim()).ok_or_else(invalid)?;

        let tab = caps
            .name("quoted")
            .map(|m| m.as_str().replace("''", "'"))
            .or_else(|| caps.name("bare").map(|m| m.as_str().to_string()));

        let span = if let Some(first) = caps.name("row_a") {
            let a = parse_row_number(first.as_str()).ok_or_else(invalid)?;
            let b = match caps.name("row_b") {
                Some(m) => parse_row_number(m.as_str()).ok_or_else(invalid)?,
                None => a,
            };
            Span::Rows {
                start: a.min(b),
                end: a.max(b),
            }
        } else {
            let a = parse_corner(&caps, "col_a", "num_a").ok_or_else(invalid)?;
            let b = match caps.name("col_b") {
                Some(_) => parse_corner(&caps, "col_b", "num_b").ok_or_else(invalid)?,
                None => a,
            };
            RangeSpec::block(a, b).span
        };

        Ok(RangeSpec { tab, span })
    }
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:(?:'(?<quoted>(?:[^']|'')+)'|(?<bare>[A-Za-z0-9_]+))!)?",
            r"(?:(?<row_a>[0-9]+)(?::(?<row_b>[0-9]+))?",
            r"|(?<col_a>[A-Za-z]+)(?<num_a>[0-9]+)(?::(?<col_b>[A-Za-z]+)(?<num_b>[0-9]+))?)$",
        ))
        .expect("valid range regex")
    })
}

fn parse_row_number(s: &str) -> Option<usize> {
    s.parse::<usize>().ok()?.checked_sub(1)
}

fn parse_corner(caps: &regex::Captures<'_>, col: &str, num: &str) -> Option<CellRef> {
    let col = letters_to_col(caps.name(col)?.as_str())?;
    let row = parse_row_number(caps.name(num)?.as_str())?;
    Some(CellRef::new(col, row))
}

fn write_tab(f: &mut fmt::Formatter<'_>, tab: &str) -> fmt::Result {
    if !tab.is_empty() && tab.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        write!(f, "{}!", tab)
    } else {
        write!(f, "'{}'!", tab.replace('\'', "''"))
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tab) = &self.tab {
            write_tab(f, tab)?;
        }
        match self.span {
            Span::Block { start, end } if start == end => write!(f, "{}", start),
            Span::Block { start, end } => write!(f, "{}:{}", start, end),
            Span::Rows { start, end } => write!(f, "{}:{}", start as u128 + 1, end as u128 + 1),
        }
    }
}

impl std::str::FromStr for RangeSpec {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        RangeSpec::parse(s)
    }
}
