//! A single sheet of a workbook

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// A named grid of cells with its own style pool.
///
/// Positions are 0-based `(row, col)` pairs; the `*_at` methods take them
/// directly, the others take `A1` references.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
}

impl Worksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // --- values ---

    /// The stored cell, if any
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// A copy of the cell's value; missing cells are [`CellValue::Empty`]
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cell_at(row, col)
            .map(|cell| cell.value.clone())
            .unwrap_or_default()
    }

    /// The text the cell shows, or `None` when it shows nothing.
    ///
    /// See [`CellValue`]'s `Display` for how numbers, booleans and formulas
    /// render.
    pub fn cell_text_at(&self, row: u32, col: u16) -> Option<String> {
        let cell = self.cell_at(row, col)?;
        if cell.value.is_blank() {
            None
        } else {
            Some(cell.value.to_string())
        }
    }

    pub fn set_cell_value<V: Into<CellValue>>(&mut self, reference: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(reference)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a value, keeping the cell's style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        check_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    // --- styles ---

    /// Pool index of the cell's style (0 for missing or unstyled cells)
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cell_at(row, col).map_or(0, |cell| cell.style_index)
    }

    pub fn style_by_index(&self, index: u32) -> Option<&Style> {
        self.cells.style_pool().get(index)
    }

    /// The cell's style, unless it is the default one
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        match self.cell_style_index_at(row, col) {
            0 => None,
            index => self.style_by_index(index),
        }
    }

    pub fn cell_style(&self, reference: &str) -> Result<Option<&Style>> {
        let addr = CellAddress::parse(reference)?;
        Ok(self.cell_style_at(addr.row, addr.col))
    }

    pub fn set_cell_style(&mut self, reference: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(reference)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Replace the cell's whole style
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.update_cell_style_at(row, col, |current| *current = style.clone())
    }

    /// Edit the cell's style in place.
    ///
    /// `update` gets the current style (the default one for missing cells);
    /// whatever it leaves untouched is kept. A missing cell is created with
    /// no value.
    pub fn update_cell_style_at<F>(&mut self, row: u32, col: u16, update: F) -> Result<()>
    where
        F: FnOnce(&mut Style),
    {
        check_position(row, col)?;
        let mut style = self
            .style_by_index(self.cell_style_index_at(row, col))
            .cloned()
            .unwrap_or_default();
        update(&mut style);

        let index = self.cells.style_pool_mut().get_or_insert(style);
        self.cells.set_style(row, col, index);
        Ok(())
    }

    pub fn style_pool(&self) -> &StylePool {
        self.cells.style_pool()
    }

    // --- layout ---

    /// Bounding box of the stored cells, style-only cells included
    pub fn used_range(&self) -> Option<CellRange> {
        let (first_row, first_col, last_row, last_col) = self.cells.used_bounds()?;
        Some(CellRange::from_indices(first_row, first_col, last_row, last_col))
    }

    /// Custom height in points
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.cells.row_height(row)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.set_row_height(row, height);
    }

    /// Custom width in characters
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.cells.column_width(col)
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    pub fn custom_row_heights(&self) -> &BTreeMap<u32, f64> {
        self.cells.custom_row_heights()
    }

    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        self.cells.custom_column_widths()
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Record a merged range; merges may not overlap
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self.merged_regions().iter().any(|m| m.overlaps(range)) {
            return Err(Error::OverlappingMerge(*range));
        }
        self.cells.add_merged_region(*range);
        Ok(())
    }

    // --- iteration ---

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every stored cell as `(row, col, cell)`, top to bottom, left to right
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Rows holding at least one stored cell, in order
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.row_indices()
    }

    /// Stored cells of one row as `(col, cell)`, left to right
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Columns of the stored cells in one row, in order
    pub fn row_columns(&self, row: u32) -> Vec<u16> {
        self.cells.iter_row(row).map(|(col, _)| col).collect()
    }
}

impl Default for Worksheet {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}

fn check_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        Err(Error::RowOutOfBounds {
            row,
            max: MAX_ROWS - 1,
        })
    } else if col >= MAX_COLS {
        Err(Error::ColumnOutOfBounds {
            col,
            max: MAX_COLS - 1,
        })
    } else {
        Ok(())
    }
}
