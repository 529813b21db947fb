//! Loading `.xlsx` packages into a [`Workbook`]

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use crate::styles::{read_styles_xml, StylesPart};
use xlscolors_core::style::Style;
use xlscolors_core::{
    CellAddress, CellError, CellRange, CellValue, SharedString, Workbook, Worksheet, MAX_COLS,
};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
pub(crate) const STYLES_PART: &str = "xl/styles.xml";

/// Reads workbooks from `.xlsx` files.
///
/// Cell values (with cached formula results), fonts, fills, borders,
/// alignment, protection, number formats, custom row heights, column widths
/// and merged regions are loaded. Charts, drawings, comments and other parts
/// are not; open the file as an [`XlsxPackage`](crate::XlsxPackage) to write
/// them back untouched.
pub struct XlsxReader;

impl XlsxReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        Self::read(BufReader::new(File::open(path)?))
    }

    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        Ok(load(reader, false)?.workbook)
    }
}

/// A cell as it was in the file
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OriginalCell {
    pub(crate) value: CellValue,
    /// The `s` attribute, 0 when absent
    pub(crate) xf: u32,
}

/// A workbook plus what is needed to patch the package it came from
#[derive(Debug)]
pub(crate) struct LoadedPackage {
    pub(crate) workbook: Workbook,
    /// Worksheet part paths, in tab order
    pub(crate) sheet_parts: Vec<String>,
    /// `None` when the package has no styles part
    pub(crate) styles: Option<StylesPart>,
    /// Per sheet, the cells as read; empty unless asked for
    pub(crate) originals: Vec<HashMap<CellAddress, OriginalCell>>,
}

/// Read every worksheet of a package.
///
/// With `keep_originals`, each stored cell's value and `s` attribute are
/// recorded so a later save can tell which cells changed.
pub(crate) fn load<R: Read + Seek>(reader: R, keep_originals: bool) -> XlsxResult<LoadedPackage> {
    let mut archive = ZipArchive::new(reader)?;
    if archive.by_name(CONTENT_TYPES_PART).is_err() {
        return Err(XlsxError::InvalidFormat(
            "no [Content_Types].xml in package".into(),
        ));
    }

    let shared = match archive.by_name(SHARED_STRINGS_PART) {
        Ok(part) => read_shared_strings(part)?,
        Err(_) => Vec::new(),
    };
    let styles = match archive.by_name(STYLES_PART) {
        Ok(part) => Some(read_styles_xml(part)?),
        Err(_) => None,
    };
    let sheets = sheet_parts(&mut archive)?;

    let no_styles = StylesPart::default();
    let cell_xfs = styles.as_ref().unwrap_or(&no_styles).cell_xfs.as_slice();

    let mut workbook = Workbook::empty();
    let mut sheet_paths = Vec::with_capacity(sheets.len());
    let mut originals = Vec::with_capacity(sheets.len());
    for (name, path) in sheets {
        let part = archive
            .by_name(&path)
            .map_err(|_| XlsxError::MissingPart(path.clone()))?;
        let mut sheet = SheetParser::new(Worksheet::new(name), &shared, cell_xfs, keep_originals);
        sheet.parse(part)?;
        let (worksheet, cells) = sheet.finish();
        workbook.add_existing_worksheet(worksheet)?;
        sheet_paths.push(path);
        originals.push(cells);
    }
    if workbook.is_empty() {
        workbook.add_worksheet()?;
    }

    Ok(LoadedPackage {
        workbook,
        sheet_parts: sheet_paths,
        styles,
        originals,
    })
}

fn xml_reader<R: Read>(part: R, trim: bool) -> Reader<BufReader<R>> {
    let mut reader = Reader::from_reader(BufReader::new(part));
    reader.trim_text(trim);
    reader
}

/// `xl/sharedStrings.xml` as one string per `<si>`.
///
/// Rich text runs are joined; phonetic hints (`<rPh>`) are dropped.
fn read_shared_strings<R: Read>(part: R) -> XlsxResult<Vec<SharedString>> {
    // Whitespace inside <t> is significant
    let mut xml = xml_reader(part, false);
    let mut strings = Vec::new();
    let mut text = String::new();
    let (mut in_text, mut in_phonetic) = (false, false);

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => text.clear(),
                b"rPh" => in_phonetic = true,
                b"t" => in_text = !in_phonetic,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                strings.push(SharedString::new(""));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(SharedString::new(decode_excel_escapes(&text))),
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(e) if in_text => text.push_str(&e.unescape()?),
            Event::CData(e) if in_text => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    log::debug!("read {} shared strings", strings.len());
    Ok(strings)
}

/// `(sheet name, part path)` for every worksheet, in tab order.
///
/// Chart sheets and dialog sheets have no worksheet relationship and are
/// left out.
fn sheet_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> XlsxResult<Vec<(String, String)>> {
    let mut targets = HashMap::new();
    let rels = archive
        .by_name(WORKBOOK_RELS_PART)
        .map_err(|_| XlsxError::MissingPart(WORKBOOK_RELS_PART.into()))?;
    for_each_element(rels, b"Relationship", |e| {
        let is_sheet = attr(e, b"Type").map_or(false, |kind| kind.ends_with("/worksheet"));
        if let (true, Some(id), Some(target)) = (is_sheet, attr(e, b"Id"), attr(e, b"Target")) {
            // Targets are relative to xl/ unless absolute
            let path = match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("xl/{}", target),
            };
            targets.insert(id, path);
        }
    })?;

    let mut sheets = Vec::new();
    let workbook = archive
        .by_name(WORKBOOK_PART)
        .map_err(|_| XlsxError::MissingPart(WORKBOOK_PART.into()))?;
    for_each_element(workbook, b"sheet", |e| {
        let Some(name) = attr(e, b"name") else {
            return;
        };
        // The relationship namespace prefix is usually `r` but is not fixed
        let rel_id = e
            .attributes()
            .flatten()
            .find(|a| a.key.local_name().as_ref() == b"id")
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
        match rel_id.and_then(|id| targets.get(&id)) {
            Some(path) => sheets.push((name, path.clone())),
            None => log::debug!("skipping sheet '{}': not a worksheet", name),
        }
    })?;

    Ok(sheets)
}

/// Call `visit` on every `tag` element of a part
fn for_each_element<R, F>(part: R, tag: &[u8], mut visit: F) -> XlsxResult<()>
where
    R: Read,
    F: FnMut(&BytesStart<'_>),
{
    let mut xml = xml_reader(part, true);
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == tag => visit(&e),
            Event::Eof => return Ok(()),
            _ => {}
        }
        buf.clear();
    }
}

/// Where character data inside a `<c>` goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Nothing,
    Value,
    Formula,
}

/// A `<c>` element being read
#[derive(Debug, Default)]
struct RawCell {
    address: CellAddress,
    kind: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
}

/// Streams one worksheet part into a [`Worksheet`]
struct SheetParser<'a> {
    sheet: Worksheet,
    shared: &'a [SharedString],
    styles: &'a [Style],
    originals: Option<HashMap<CellAddress, OriginalCell>>,
    cell: Option<RawCell>,
    capture: Capture,
    in_inline: bool,
    in_phonetic: bool,
    // Rows and cells may omit their `r` reference
    row: u32,
    next_col: u16,
}

impl<'a> SheetParser<'a> {
    fn new(
        sheet: Worksheet,
        shared: &'a [SharedString],
        styles: &'a [Style],
        keep_originals: bool,
    ) -> Self {
        Self {
            sheet,
            shared,
            styles,
            originals: keep_originals.then(HashMap::new),
            cell: None,
            capture: Capture::Nothing,
            in_inline: false,
            in_phonetic: false,
            row: 0,
            next_col: 0,
        }
    }

    fn parse<R: Read>(&mut self, part: R) -> XlsxResult<()> {
        // Inline strings keep their surrounding whitespace
        let mut xml = xml_reader(part, false);
        let mut buf = Vec::new();
        let mut next_row = 0;
        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                    self.row = self.start_row(&e, next_row);
                    next_row = self.row + 1;
                }
                Event::Start(e) => self.start(&e),
                Event::Empty(e) => self.empty(&e)?,
                Event::End(e) => self.end(e.local_name().as_ref())?,
                Event::Text(e) => self.text(&e)?,
                Event::Eof => return Ok(()),
                _ => {}
            }
            buf.clear();
        }
    }

    fn finish(self) -> (Worksheet, HashMap<CellAddress, OriginalCell>) {
        (self.sheet, self.originals.unwrap_or_default())
    }

    /// Record a custom height and return the row's 0-based index
    fn start_row(&mut self, e: &BytesStart<'_>, next_row: u32) -> u32 {
        self.next_col = 0;
        let row = attr(e, b"r")
            .and_then(|r| r.parse::<u32>().ok())
            .map_or(next_row, |r| r.saturating_sub(1));
        if flag(e, b"customHeight") {
            if let Some(height) = attr(e, b"ht").and_then(|h| h.parse().ok()) {
                self.sheet.set_row_height(row, height);
            }
        }
        row
    }

    fn raw_cell(&self, e: &BytesStart<'_>) -> RawCell {
        let address = attr(e, b"r")
            .and_then(|r| CellAddress::parse(&r).ok())
            .unwrap_or_else(|| CellAddress::new(self.row, self.next_col));
        RawCell {
            address,
            kind: attr(e, b"t"),
            style: attr(e, b"s").and_then(|s| s.parse().ok()),
            ..RawCell::default()
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) {
        let Some(cell) = self.cell.as_mut() else {
            if e.local_name().as_ref() == b"c" {
                self.cell = Some(self.raw_cell(e));
            }
            return;
        };
        match e.local_name().as_ref() {
            b"v" => self.capture = Capture::Value,
            b"f" => {
                cell.formula = Some(String::new());
                self.capture = Capture::Formula;
            }
            b"is" => self.in_inline = true,
            b"rPh" if self.in_inline => self.in_phonetic = true,
            b"t" if self.in_inline && !self.in_phonetic => self.capture = Capture::Value,
            _ => {}
        }
    }

    fn empty(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        match e.local_name().as_ref() {
            b"col" => self.column_widths(e),
            // A bare <c/> may still carry a style
            b"c" if self.cell.is_none() => {
                let cell = self.raw_cell(e);
                self.store(cell)?;
            }
            b"mergeCell" => {
                if let Some(reference) = attr(e, b"ref") {
                    let merged = CellRange::parse(&reference)
                        .and_then(|range| self.sheet.merge_cells(&range));
                    if let Err(err) = merged {
                        log::warn!("ignoring merged region {}: {}", reference, err);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> XlsxResult<()> {
        match name {
            b"c" => {
                if let Some(cell) = self.cell.take() {
                    self.store(cell)?;
                }
            }
            b"v" | b"f" | b"t" => self.capture = Capture::Nothing,
            b"is" => self.in_inline = false,
            b"rPh" => self.in_phonetic = false,
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, e: &BytesText<'_>) -> XlsxResult<()> {
        let Some(cell) = self.cell.as_mut() else {
            return Ok(());
        };
        let target = match self.capture {
            Capture::Nothing => return Ok(()),
            Capture::Value => cell.value.get_or_insert_with(String::new),
            Capture::Formula => cell.formula.get_or_insert_with(String::new),
        };
        target.push_str(&e.unescape()?);
        Ok(())
    }

    /// `<col min max width customWidth>`; min and max are 1-based
    fn column_widths(&mut self, e: &BytesStart<'_>) {
        if !flag(e, b"customWidth") {
            return;
        }
        let number = |key: &[u8]| attr(e, key).and_then(|v| v.parse::<u16>().ok());
        let width = attr(e, b"width").and_then(|w| w.parse::<f64>().ok());
        if let (Some(min), Some(max), Some(width)) = (number(b"min"), number(b"max"), width) {
            for col in min.max(1)..=max.min(MAX_COLS) {
                self.sheet.set_column_width(col - 1, width);
            }
        }
    }

    fn store(&mut self, cell: RawCell) -> XlsxResult<()> {
        let CellAddress { row, col } = cell.address;
        self.next_col = col.saturating_add(1);

        let kind = cell.kind.as_deref();
        let value = cell
            .value
            .as_deref()
            .map(|raw| typed_value(kind, raw, self.shared))
            .transpose()?;

        // Shared-formula children carry an empty <f/> and keep only their value
        match (cell.formula.filter(|f| !f.is_empty()), value) {
            (Some(formula), cached) => {
                let text = if formula.starts_with('=') {
                    formula
                } else {
                    format!("={}", formula)
                };
                let cached = cached.filter(|v| !v.is_empty()).map(Box::new);
                self.sheet.set_cell_value_at(
                    row,
                    col,
                    CellValue::Formula {
                        text,
                        cached_value: cached,
                    },
                )?;
            }
            (None, Some(value)) => self.sheet.set_cell_value_at(row, col, value)?,
            (None, None) => {}
        }

        let xf = cell.style.unwrap_or(0);
        if xf != 0 {
            let style = self.styles.get(xf as usize).ok_or_else(|| {
                XlsxError::Parse(format!("cell {} uses unknown style {}", cell.address, xf))
            })?;
            self.sheet.set_cell_style_at(row, col, style)?;
        }

        if let Some(originals) = self.originals.as_mut() {
            if let Some(stored) = self.sheet.cell_at(row, col) {
                let value = stored.value.clone();
                originals.insert(cell.address, OriginalCell { value, xf });
            }
        }
        Ok(())
    }
}

/// The value of a `<v>` (or inline `<t>`) given the cell's `t` attribute
fn typed_value(kind: Option<&str>, raw: &str, shared: &[SharedString]) -> XlsxResult<CellValue> {
    let trimmed = raw.trim();
    let value = match kind {
        Some("s") => {
            let text = trimmed
                .parse::<usize>()
                .ok()
                .and_then(|index| shared.get(index))
                .ok_or_else(|| XlsxError::Parse(format!("no shared string '{}'", raw)))?;
            CellValue::String(text.clone())
        }
        Some("b") => CellValue::Boolean(trimmed == "1" || trimmed.eq_ignore_ascii_case("true")),
        Some("e") => CellError::parse(trimmed).map_or_else(|| CellValue::string(raw), CellValue::Error),
        Some("str") | Some("inlineStr") => CellValue::string(decode_excel_escapes(raw)),
        None | Some("n") if trimmed.is_empty() => CellValue::Empty,
        None | Some("n") => trimmed
            .parse::<f64>()
            .map_or_else(|_| CellValue::string(raw), CellValue::Number),
        Some(_) => CellValue::string(raw),
    };
    Ok(value)
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Boolean attribute; absent means false
fn flag(e: &BytesStart<'_>, key: &[u8]) -> bool {
    matches!(attr(e, key).as_deref(), Some("1") | Some("true"))
}
