//! Rewriting a worksheet part around the cells of a [`Worksheet`]
//!
//! The part is streamed event by event. Outside `<sheetData>` nothing
//! changes, so conditional formats, data validations, hyperlinks, page setup
//! and drawing references are kept byte for byte. Inside it, a cell whose
//! value is the one that was read keeps its original XML and only has its
//! `s` attribute updated; changed and new cells are written from the model
//! and cells no longer in the model are dropped.

use std::collections::HashMap;
use std::io::{BufReader, Read, Write};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::with_attribute;
use crate::error::XlsxResult;
use crate::reader::OriginalCell;
use crate::writer::cell_xml;
use xlscolors_core::{CellAddress, CellData, CellValue, Worksheet};

/// What to write into one worksheet part
pub(crate) struct SheetEdits<'a> {
    pub(crate) sheet: &'a Worksheet,
    pub(crate) originals: &'a HashMap<CellAddress, OriginalCell>,
    /// `s` of every styled cell
    pub(crate) xfs: &'a HashMap<CellAddress, u32>,
}

impl SheetEdits<'_> {
    fn xf(&self, address: CellAddress) -> u32 {
        self.xfs.get(&address).copied().unwrap_or(0)
    }

    fn is_unchanged(&self, address: CellAddress, value: &CellValue) -> bool {
        self.originals
            .get(&address)
            .map_or(false, |original| original.value == *value)
    }

    fn fresh_cell(&self, row: u32, col: u16, cell: &CellData) -> String {
        let address = CellAddress::new(row, col);
        cell_xml(address, self.xf(address), &cell.value)
    }

    fn fresh_cells(&self, row: u32, cols: &[u16]) -> String {
        cols.iter()
            .filter_map(|&col| {
                let cell = self.sheet.cell_at(row, col)?;
                Some(self.fresh_cell(row, col, cell))
            })
            .collect()
    }

    fn fresh_row(&self, row: u32) -> String {
        let mut xml = match self.sheet.row_height(row) {
            Some(height) => format!(
                "<row r=\"{}\" ht=\"{}\" customHeight=\"1\">",
                row + 1,
                height
            ),
            None => format!("<row r=\"{}\">", row + 1),
        };
        for (col, cell) in self.sheet.iter_row(row) {
            xml.push_str(&self.fresh_cell(row, col, cell));
        }
        xml.push_str("</row>");
        xml
    }
}

/// The model columns of the row being copied, and how far they were written
struct RowCursor {
    row: u32,
    cols: Vec<u16>,
    next: usize,
}

impl RowCursor {
    /// Model columns left of `col` that were not written yet
    fn take_before(&mut self, col: u16) -> &[u16] {
        let start = self.next;
        while self.cols.get(self.next).map_or(false, |&c| c < col) {
            self.next += 1;
        }
        &self.cols[start..self.next]
    }

    /// `true` when the model has a cell at `col`, which then counts as written
    fn take(&mut self, col: u16) -> bool {
        let found = self.cols.get(self.next) == Some(&col);
        if found {
            self.next += 1;
        }
        found
    }

    fn rest(&self) -> &[u16] {
        &self.cols[self.next.min(self.cols.len())..]
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn end_of(e: &BytesStart<'_>) -> BytesEnd<'static> {
    BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned())
}

/// Stream `part` into `out`, replacing its cells with the ones in `edits`
pub(crate) fn patch_worksheet<R: Read, W: Write>(
    part: R,
    out: W,
    edits: &SheetEdits<'_>,
) -> XlsxResult<()> {
    let mut reader = Reader::from_reader(BufReader::new(part));
    reader.trim_text(false);
    let mut writer = Writer::new(out);

    let model_rows: Vec<u32> = edits.sheet.row_indices().collect();
    let mut pending_rows = model_rows.into_iter().peekable();
    let mut in_sheet_data = false;
    let mut row: Option<RowCursor> = None;
    // Rows and cells may omit their `r` reference
    let mut next_row = 0u32;
    let mut next_col = 0u16;
    let mut skipping_cell = false;

    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf)?;
        if skipping_cell {
            if let Event::End(e) = &event {
                skipping_cell = e.local_name().as_ref() != b"c";
            }
            buf.clear();
            continue;
        }

        match &event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                if matches!(event, Event::Empty(_)) {
                    writer.write_event(Event::Start(e.borrow()))?;
                    for r in pending_rows.by_ref() {
                        writer.get_mut().write_all(edits.fresh_row(r).as_bytes())?;
                    }
                    writer.write_event(Event::End(end_of(e)))?;
                } else {
                    in_sheet_data = true;
                    writer.write_event(event.borrow())?;
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"sheetData" => {
                for r in pending_rows.by_ref() {
                    writer.get_mut().write_all(edits.fresh_row(r).as_bytes())?;
                }
                in_sheet_data = false;
                writer.write_event(event.borrow())?;
            }
            Event::Start(e) | Event::Empty(e)
                if in_sheet_data && row.is_none() && e.local_name().as_ref() == b"row" =>
            {
                let index = attr(e, b"r")
                    .and_then(|r| r.parse::<u32>().ok())
                    .map_or(next_row, |r| r.saturating_sub(1));
                next_row = index + 1;
                next_col = 0;

                while let Some(r) = pending_rows.next_if(|&r| r < index) {
                    writer.get_mut().write_all(edits.fresh_row(r).as_bytes())?;
                }
                let cols = match pending_rows.next_if_eq(&index) {
                    Some(_) => edits.sheet.row_columns(index),
                    None => Vec::new(),
                };

                match &event {
                    Event::Empty(_) if cols.is_empty() => writer.write_event(event.borrow())?,
                    Event::Empty(_) => {
                        writer.write_event(Event::Start(e.borrow()))?;
                        writer
                            .get_mut()
                            .write_all(edits.fresh_cells(index, &cols).as_bytes())?;
                        writer.write_event(Event::End(end_of(e)))?;
                    }
                    _ => {
                        writer.write_event(event.borrow())?;
                        row = Some(RowCursor {
                            row: index,
                            cols,
                            next: 0,
                        });
                    }
                }
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let Some(cursor) = row.as_mut() else {
                    writer.write_event(event.borrow())?;
                    buf.clear();
                    continue;
                };
                let col = attr(e, b"r")
                    .and_then(|r| CellAddress::parse(&r).ok())
                    .map_or(next_col, |address| address.col);
                next_col = col.saturating_add(1);

                let before = edits.fresh_cells(cursor.row, cursor.take_before(col));
                writer.get_mut().write_all(before.as_bytes())?;

                let is_start = matches!(event, Event::Start(_));
                let address = CellAddress::new(cursor.row, col);
                let model = match cursor.take(col) {
                    true => edits.sheet.cell_at(cursor.row, col),
                    false => None,
                };
                match model {
                    None => skipping_cell = is_start,
                    Some(cell) if edits.is_unchanged(address, &cell.value) => {
                        let xf = edits.xf(address);
                        let xf = (xf != 0).then(|| xf.to_string());
                        let start = with_attribute(e, "s", xf.as_deref());
                        if is_start {
                            writer.write_event(Event::Start(start))?;
                        } else {
                            writer.write_event(Event::Empty(start))?;
                        }
                    }
                    Some(cell) => {
                        let fresh = edits.fresh_cell(cursor.row, col, cell);
                        writer.get_mut().write_all(fresh.as_bytes())?;
                        skipping_cell = is_start;
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => {
                if let Some(cursor) = row.take() {
                    let rest = edits.fresh_cells(cursor.row, cursor.rest());
                    writer.get_mut().write_all(rest.as_bytes())?;
                }
                writer.write_event(event.borrow())?;
            }
            _ => writer.write_event(event.borrow())?,
        }
        buf.clear();
    }
    Ok(())
}
