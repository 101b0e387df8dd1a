//! sheetledger-grid - grid addressing, the grid store contract and an
//! in-memory grid store.

pub mod error;
pub mod grid;
pub mod storage;

pub use error::{GridError, Result};
pub use grid::{CellRef, CellValue, GridClient, MemoryGrid, RangeSpec};
