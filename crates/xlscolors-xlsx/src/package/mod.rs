//! Saving a workbook back into the package it was read from
//!
//! [`XlsxPackage`] keeps the original archive next to the loaded
//! [`Workbook`]. On save every part is copied as it was, except the
//! worksheets, whose cells are patched in place, and `styles.xml`, which only
//! gains entries. Themes, charts, chart sheets, drawings, comments, defined
//! names, shared strings and anything else the model does not cover reach
//! the output unchanged.

mod sheet;
mod styles;

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::BytesStart;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{XlsxError, XlsxResult};
use crate::reader::{load, OriginalCell, STYLES_PART};
use crate::styles::StylesPart;
use crate::writer::{write_atomic, XlsxWriter};
use sheet::{patch_worksheet, SheetEdits};
use styles::StyleAppender;
use xlscolors_core::style::Style;
use xlscolors_core::{CellAddress, Workbook};

/// An `.xlsx` file opened for editing.
///
/// ```no_run
/// use xlscolors_xlsx::XlsxPackage;
///
/// let mut package = XlsxPackage::open("report.xlsx")?;
/// let sheet = package.workbook_mut().worksheet_mut(0).unwrap();
/// sheet.update_cell_style_at(1, 0, |style| style.font.bold = true)?;
/// package.save("report.xlsx")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Cell values and styles are taken from the workbook. Row heights, column
/// widths and merged regions are kept from the file. If sheets were added,
/// removed or renamed the package cannot be patched and a fresh one is
/// written with [`XlsxWriter`] instead.
#[derive(Debug)]
pub struct XlsxPackage {
    source: Vec<u8>,
    workbook: Workbook,
    sheet_names: Vec<String>,
    sheet_parts: Vec<String>,
    styles: Option<StylesPart>,
    originals: Vec<HashMap<CellAddress, OriginalCell>>,
}

/// What a patched save writes besides the raw copies
struct SavePlan {
    /// Per sheet, the `s` of every cell with a non-zero one
    xfs: Vec<HashMap<CellAddress, u32>>,
    /// `None` when `styles.xml` needs no new entries
    styles_xml: Option<Vec<u8>>,
}

impl XlsxPackage {
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::from_bytes(fs::read(path)?)
    }

    pub fn from_bytes(source: Vec<u8>) -> XlsxResult<Self> {
        let loaded = load(Cursor::new(source.as_slice()), true)?;
        let sheet_names = loaded
            .workbook
            .worksheets()
            .map(|sheet| sheet.name().to_string())
            .collect();

        Ok(Self {
            source,
            workbook: loaded.workbook,
            sheet_names,
            sheet_parts: loaded.sheet_parts,
            styles: loaded.styles,
            originals: loaded.originals,
        })
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }

    /// Write the package to `path`, replacing it only once fully written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        write_atomic(path.as_ref(), |out| self.write(out))
    }

    pub fn write<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut archive = ZipArchive::new(Cursor::new(self.source.as_slice()))?;
        match self.plan(&mut archive)? {
            Some(plan) => self.write_patched(&mut archive, &plan, writer),
            None => XlsxWriter::write(&self.workbook, writer),
        }
    }

    /// Work out the cell formats to write; `None` when the package cannot
    /// be patched
    fn plan<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> XlsxResult<Option<SavePlan>> {
        let names: Vec<&str> = self.workbook.worksheets().map(|s| s.name()).collect();
        if self.sheet_parts.is_empty() || names != self.sheet_names {
            log::warn!("worksheets were added, removed or renamed; writing a new package");
            return Ok(None);
        }
        let Some(base) = self.styles.as_ref() else {
            log::warn!("package has no {}; writing a new package", STYLES_PART);
            return Ok(None);
        };

        let mut appender = StyleAppender::new(base);
        let default = Style::default();
        let xfs = self
            .workbook
            .worksheets()
            .zip(&self.originals)
            .map(|(sheet, originals)| {
                let mut xfs = HashMap::new();
                for (row, col, cell) in sheet.iter_cells() {
                    let address = CellAddress::new(row, col);
                    let style = sheet.style_by_index(cell.style_index).unwrap_or(&default);
                    let original = originals.get(&address).map(|cell| cell.xf);
                    let xf = appender.xf_for(style, original);
                    if xf != 0 {
                        xfs.insert(address, xf);
                    }
                }
                xfs
            })
            .collect();

        let styles_xml = if appender.is_unchanged() {
            None
        } else {
            let mut source = Vec::new();
            archive.by_name(STYLES_PART)?.read_to_end(&mut source)?;
            match appender.rewrite(&source) {
                Ok(xml) => Some(xml),
                Err(XlsxError::InvalidFormat(reason)) => {
                    log::warn!("cannot extend {}: {}; writing a new package", STYLES_PART, reason);
                    return Ok(None);
                }
                Err(err) => return Err(err),
            }
        };

        Ok(Some(SavePlan { xfs, styles_xml }))
    }

    fn write_patched<R: Read + Seek, W: Write + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        plan: &SavePlan,
        writer: W,
    ) -> XlsxResult<()> {
        let sheets: HashMap<&str, usize> = (0..)
            .zip(&self.sheet_parts)
            .map(|(index, path)| (path.as_str(), index))
            .collect();
        let options = SimpleFileOptions::default();

        let mut zip = ZipWriter::new(writer);
        for i in 0..archive.len() {
            let name = archive
                .name_for_index(i)
                .map(str::to_string)
                .ok_or_else(|| XlsxError::MissingPart(format!("zip entry {}", i)))?;

            if let Some(&index) = sheets.get(name.as_str()) {
                let sheet = self
                    .workbook
                    .worksheet(index)
                    .ok_or_else(|| XlsxError::MissingPart(name.clone()))?;
                let edits = SheetEdits {
                    sheet,
                    originals: &self.originals[index],
                    xfs: &plan.xfs[index],
                };
                zip.start_file(name.as_str(), options)?;
                patch_worksheet(archive.by_index(i)?, &mut zip, &edits)?;
            } else if let (STYLES_PART, Some(xml)) = (name.as_str(), &plan.styles_xml) {
                zip.start_file(name.as_str(), options)?;
                zip.write_all(xml)?;
            } else {
                zip.raw_copy_file(archive.by_index_raw(i)?)?;
            }
        }
        zip.finish()?;
        Ok(())
    }
}

/// `e` with attribute `key` set to `value`, or removed when `value` is
/// `None`; the other attributes keep their order
pub(crate) fn with_attribute(
    e: &BytesStart<'_>,
    key: &str,
    value: Option<&str>,
) -> BytesStart<'static> {
    let mut out = e.to_owned();
    out.clear_attributes();
    let mut replaced = false;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() != key.as_bytes() {
            out.push_attribute(attr);
        } else if let Some(value) = value {
            out.push_attribute((key, value));
            replaced = true;
        }
    }
    if let (false, Some(value)) = (replaced, value) {
        out.push_attribute((key, value));
    }
    out
}
