//! Worksheet walking
//!
//! Row 1 gets the header style, every other row is matched cell by cell.

use xlscolors_core::{CellAddress, Result, Worksheet};

use crate::apply::{apply_style, apply_to_cell};
use crate::matcher::find_rule;
use crate::stylesheet::{StyleSpec, Stylesheet};

/// Counts from walking one worksheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    /// Cells in row 1 given the header style
    pub header_cells: usize,
    /// Cells whose text selected a rule
    pub matched_cells: usize,
    /// Cells restyled by those matches, whole-row broadcasts included
    pub styled_cells: usize,
}

/// Colorize one worksheet in place.
///
/// The header style covers row 1 from column A to the last used column,
/// creating valueless cells for gaps. Below it, blank cells are skipped and
/// every other cell is matched against the rules in column order.
pub fn walk_worksheet(sheet: &mut Worksheet, stylesheet: &Stylesheet) -> Result<SheetStats> {
    let mut stats = SheetStats::default();

    if let Some(header) = &stylesheet.header {
        stats.header_cells = style_header(sheet, header)?;
    }

    let rows: Vec<u32> = sheet.row_indices().filter(|&row| row > 0).collect();
    for row in rows {
        let texts: Vec<(u16, String)> = sheet
            .row_columns(row)
            .into_iter()
            .filter_map(|col| sheet.cell_text_at(row, col).map(|text| (col, text)))
            .collect();

        for (col, text) in texts {
            if let Some(rule) = find_rule(&text, &stylesheet.rules) {
                log::trace!(
                    "{}!{} matched '{}'",
                    sheet.name(),
                    CellAddress::new(row, col),
                    rule.keyword()
                );
                stats.matched_cells += 1;
                stats.styled_cells += apply_style(sheet, row, col, rule.style())?;
            }
        }
    }

    Ok(stats)
}

fn style_header(sheet: &mut Worksheet, header: &StyleSpec) -> Result<usize> {
    let last_col = match sheet.used_range() {
        Some(range) => range.end.col,
        None => return Ok(0),
    };

    for col in 0..=last_col {
        apply_to_cell(sheet, 0, col, header)?;
    }
    Ok(usize::from(last_col) + 1)
}
