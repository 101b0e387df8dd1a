use crate::error::{LedgerError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https://docs\.google\.com/spreadsheets/d/([a-zA-Z0-9_-]+)(?:/\S*)?$")
            .expect("valid sheet url regex")
    })
}

fn id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid sheet id regex"))
}

/// Document id embedded in a spreadsheet URL.
pub fn extract_sheet_id(url: &str) -> Option<&str> {
    url_re()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Accept either a spreadsheet URL or a bare document id.
pub fn resolve_sheet_id(input: &str) -> Result<String> {
    let input = input.trim();
    if let Some(id) = extract_sheet_id(input) {
        return Ok(id.to_string());
    }
    if id_re().is_match(input) {
        return Ok(input.to_string());
    }
    Err(LedgerError::InvalidSheetUrl(input.to_string()))
}
