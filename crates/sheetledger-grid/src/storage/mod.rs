//! Storage for the `.grd` document format.
//!
//! One non-blank cell per line, `CELLREF: VALUE`, text quoted, numbers bare:
//!
//! ```text
//! # Sheetledger document
//! A1: "Date"
//! C2: 12.5
//! ```

mod parser;
mod writer;

pub use parser::{parse_grd, parse_grd_content};
pub use writer::{write_grd, write_grd_content};
