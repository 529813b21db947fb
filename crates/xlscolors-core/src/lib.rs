//! # xlscolors-core
//!
//! The spreadsheet model that colorizing operates on: a [`Workbook`] of
//! [`Worksheet`]s holding sparse [`CellValue`]s, each cell pointing at an
//! interned [`Style`].
//!
//! ```rust
//! use xlscolors_core::{CellValue, Color, FillStyle, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Status").unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::string("error")).unwrap();
//! sheet
//!     .update_cell_style_at(1, 0, |style| {
//!         style.font.color = Color::WHITE;
//!         style.fill = FillStyle::solid(Color::RED);
//!     })
//!     .unwrap();
//!
//! assert_eq!(sheet.cell_text_at(1, 0).as_deref(), Some("error"));
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use style::{
    Alignment, BorderStyle, Color, FillStyle, FontStyle, NumberFormat, PatternType, Protection,
    Style, StylePool,
};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Rows per worksheet
pub const MAX_ROWS: u32 = 1 << 20;

/// Columns per worksheet (`A` through `XFD`)
pub const MAX_COLS: u16 = 1 << 14;

/// Longest allowed sheet name, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;
