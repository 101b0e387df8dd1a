use super::cell::CellValue;
use super::range::RangeSpec;
use crate::error::Result;
use std::sync::Arc;

/// Contract of the external grid store that holds ledger documents.
///
/// Every call is one remote round trip. Implementations report transport and
/// permission failures as [`GridError::Unreachable`](crate::GridError::Unreachable).
pub trait GridClient: Send + Sync {
    /// Read a rectangular range.
    ///
    /// Trailing blank rows are omitted and trailing blank cells of each row are
    /// trimmed, so callers must treat missing rows and cells as blank.
    fn read_range(&self, doc: &str, range: &RangeSpec) -> Result<Vec<Vec<CellValue>>>;

    /// Write `values` starting at the top-left corner of `range`.
    ///
    /// Rows are padded with blanks to the widest row before writing.
    fn write_range(&self, doc: &str, range: &RangeSpec, values: &[Vec<CellValue>]) -> Result<()>;

    /// Insert one column at `index`, shifting existing columns right.
    ///
    /// When `label` is given it is written into row 0 of the new column as part
    /// of the same structural request.
    fn insert_column(
        &self,
        doc: &str,
        index: usize,
        inherit_formatting: bool,
        label: Option<&str>,
    ) -> Result<()>;

    /// Whether the document exists and is shared with us.
    fn can_access(&self, doc: &str) -> bool;
}

impl<T: GridClient + ?Sized> GridClient for Arc<T> {
    fn read_range(&self, doc: &str, range: &RangeSpec) -> Result<Vec<Vec<CellValue>>> {
        (**self).read_range(doc, range)
    }

    fn write_range(&self, doc: &str, range: &RangeSpec, values: &[Vec<CellValue>]) -> Result<()> {
        (**self).write_range(doc, range, values)
    }

    fn insert_column(
        &self,
        doc: &str,
        index: usize,
        inherit_formatting: bool,
        label: Option<&str>,
    ) -> Result<()> {
        (**self).insert_column(doc, index, inherit_formatting, label)
    }

    fn can_access(&self, doc: &str) -> bool {
        (**self).can_access(doc)
    }
}
