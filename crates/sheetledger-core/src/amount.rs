use crate::error::{LedgerError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+([.,]\d+)?$").expect("valid amount regex"))
}

/// Parse a user-typed amount. Accepts `12`, `-3.5` and `12,50`; a comma is
/// read as the decimal separator. No thousands separators, no exponents.
pub fn parse_amount(input: &str) -> Result<f64> {
    let cleaned = input.trim();
    if !amount_re().is_match(cleaned) {
        return Err(LedgerError::InvalidAmount(input.to_string()));
    }
    cleaned
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| LedgerError::InvalidAmount(input.to_string()))
}
