//! Prelude module - common imports for xlscolors users
//!
//! ```rust
//! use xlscolors::prelude::*;
//! ```

pub use crate::{
    colorize_workbook, find_rule, walk_worksheet, CellValue, Color, ColorizeJob, ColorizeStats,
    Colorizer, ColorizerConfig, FillStyle, Rule, RuleSet, Style, StyleSpec, Stylesheet, Workbook,
    Worksheet, XlsxPackage, XlsxReader, XlsxWriter,
};
