//! # xlscolors
//!
//! Colorize spreadsheet cells from a YAML keyword stylesheet.
//!
//! A stylesheet maps keywords to font and fill colors. Every cell below the
//! first row whose text equals a keyword (or contains a `++keyword++`) is
//! restyled; the first row can get a separate header style.
//!
//! ## Example
//!
//! ```rust
//! use xlscolors::prelude::*;
//!
//! let stylesheet: Stylesheet = r#"
//! headers: {fg: "FFFFFF", bg: "808080", bold: true}
//! keywords:
//!   ERROR: {fg: "FFFFFF", bg: "FF0000"}
//! "#
//! .parse()
//! .unwrap();
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Status").unwrap();
//! sheet.set_cell_value("A2", "error").unwrap();
//!
//! let stats = colorize_workbook(&mut workbook, &stylesheet).unwrap();
//! assert_eq!(stats.matched_cells, 1);
//!
//! let sheet = workbook.worksheet(0).unwrap();
//! assert_eq!(sheet.cell_style("A2").unwrap().unwrap().fill, FillStyle::solid(Color::RED));
//! ```

pub mod apply;
pub mod colorizer;
pub mod error;
pub mod matcher;
pub mod prelude;
pub mod stylesheet;
pub mod walker;

pub use apply::{apply_style, apply_to_cell};
pub use colorizer::{
    colorize_workbook, ColorizeJob, ColorizeStats, Colorizer, ColorizerConfig, DEFAULT_STYLESHEET,
};
pub use error::{Error, Result};
pub use matcher::{find_rule, rule_matches};
pub use stylesheet::{ConfigError, MatchMode, Rule, RuleSet, StyleSpec, Stylesheet};
pub use walker::{walk_worksheet, SheetStats};

// Re-export the workbook model and XLSX I/O
pub use xlscolors_core::{CellValue, Color, FillStyle, Style, Workbook, Worksheet};
pub use xlscolors_xlsx::{XlsxError, XlsxPackage, XlsxReader, XlsxWriter};
