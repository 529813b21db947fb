//! Style application
//!
//! Replaces the font color, boldness and fill of target cells. Font name,
//! size and number format already on a cell are kept.

use xlscolors_core::{FillStyle, Result, Worksheet};

use crate::stylesheet::StyleSpec;

/// Apply a matched style to a cell, or to its whole row.
///
/// With `whole_row` set, every cell stored in the row is styled, including
/// valueless ones; columns with no cell are left alone. Returns the number of
/// cells styled.
pub fn apply_style(sheet: &mut Worksheet, row: u32, col: u16, spec: &StyleSpec) -> Result<usize> {
    if !spec.whole_row {
        apply_to_cell(sheet, row, col, spec)?;
        return Ok(1);
    }

    let columns = sheet.row_columns(row);
    for &target in &columns {
        apply_to_cell(sheet, row, target, spec)?;
    }
    Ok(columns.len())
}

/// Apply a style to a single cell, ignoring the whole-row flag.
///
/// A cell that does not exist yet is created with no value.
pub fn apply_to_cell(sheet: &mut Worksheet, row: u32, col: u16, spec: &StyleSpec) -> Result<()> {
    sheet.update_cell_style_at(row, col, |style| {
        style.font.color = spec.fg.clone();
        style.font.bold = spec.bold;
        style.fill = FillStyle::solid(spec.bg.clone());
    })
}
