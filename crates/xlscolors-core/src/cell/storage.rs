//! Sparse cell storage
//!
//! Rows map to columns map to cells, both ordered, so iteration always
//! follows the document: top to bottom, then left to right. A cell is only
//! stored while it has a value or a non-default style.

use std::collections::BTreeMap;

use super::{CellRange, CellValue};
use crate::style::StylePool;

/// A stored cell: its value and the index of its style in the sheet's pool
#[derive(Debug, Clone, Default)]
pub struct CellData {
    pub value: CellValue,
    /// 0 is the default style
    pub style_index: u32,
}

impl CellData {
    /// Cell with the default style
    pub fn new(value: CellValue) -> Self {
        Self::with_style(value, 0)
    }

    /// Cell with a given style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// Nothing worth storing: no value and the default style
    pub fn is_empty(&self) -> bool {
        self.style_index == 0 && self.value.is_empty()
    }
}

type Row = BTreeMap<u16, CellData>;

/// Cells, layout and styles of one worksheet
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, Row>,
    styles: StylePool,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u16, f64>,
    merges: Vec<CellRange>,
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row)?.get(&col)
    }

    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.rows.get_mut(&row)?.get_mut(&col)
    }

    /// Store a cell, or drop it when it is empty
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            self.remove(row, col);
            return;
        }
        self.rows.entry(row).or_default().insert(col, data);
    }

    /// Replace a cell's value, keeping its style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map_or(0, |cell| cell.style_index);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Replace a cell's style, keeping its value.
    ///
    /// Styling a missing cell creates it with no value.
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = match self.get_mut(row, col) {
            Some(cell) if style_index != 0 || !cell.value.is_empty() => {
                cell.style_index = style_index;
                return;
            }
            Some(cell) => std::mem::take(&mut cell.value),
            None => CellValue::Empty,
        };
        self.set(row, col, CellData::with_style(value, style_index));
    }

    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        let cells = self.rows.get_mut(&row)?;
        let removed = cells.remove(&col);
        if cells.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(first_row, first_col, last_row, last_col)` over all stored cells
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let (&first_row, _) = self.rows.first_key_value()?;
        let (&last_row, _) = self.rows.last_key_value()?;

        let first_col = self.rows.values().filter_map(|r| r.keys().next()).min()?;
        let last_col = self.rows.values().filter_map(|r| r.keys().next_back()).max()?;

        Some((first_row, *first_col, last_row, *last_col))
    }

    /// All cells as `(row, col, cell)` in document order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows.iter().flat_map(|(&row, cells)| {
            cells.iter().map(move |(&col, cell)| (row, col, cell))
        })
    }

    /// The cells of one row as `(col, cell)`
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flatten()
            .map(|(&col, cell)| (col, cell))
    }

    /// Rows holding at least one cell
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn custom_row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merges
    }

    pub fn add_merged_region(&mut self, range: CellRange) {
        self.merges.push(range);
    }

    pub fn style_pool(&self) -> &StylePool {
        &self.styles
    }

    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.styles
    }
}
