//! Grid addressing and the grid store contract.
//!
//! - [`CellRef`] - A1 notation <-> zero-indexed coordinates
//! - [`RangeSpec`] - rectangular ranges in wire notation
//! - [`CellValue`] - cell contents as exchanged with a store
//! - [`GridClient`] - the external grid store contract
//! - [`MemoryGrid`] - in-process store implementing [`GridClient`]

mod cell;
mod cell_ref;
mod client;
mod memory;
mod range;

pub use cell::{CellValue, row_is_blank};
pub use cell_ref::{CellRef, letters_to_col};
pub use client::GridClient;
pub use memory::{Cells, MemoryGrid};
pub use range::{RangeSpec, Span};
