//! Errors raised by the workbook model

use thiserror::Error;

use crate::cell::CellRange;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A reference that is not valid `A1` notation
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("row {row} is past the last row ({max})")]
    RowOutOfBounds { row: u32, max: u32 },

    #[error("column {col} is past the last column ({max})")]
    ColumnOutOfBounds { col: u16, max: u16 },

    /// Empty, too long, or containing a forbidden character
    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Sheet names are unique regardless of case
    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),

    #[error("merged range {0} overlaps an existing merge")]
    OverlappingMerge(CellRange),
}
