//! Writing a [`Workbook`] as an `.xlsx` package

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, ErrorKind, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::{encode_excel_escapes, escape_xml};
use crate::styles::XlsxStyleTable;
use xlscolors_core::{CellAddress, CellValue, Workbook, Worksheet};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const DOC_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const SHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// Writes workbooks as `.xlsx` files.
///
/// Strings are stored inline (`t="inlineStr"`), so no shared-strings part
/// is produced. Sheet `N` (1-based) lives in `xl/worksheets/sheetN.xml`
/// under relationship `rIdN`.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write to `path`; an existing file is only replaced once the new one
    /// is complete
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        write_atomic(path.as_ref(), |out| Self::write(workbook, out))
    }

    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "cannot write a workbook without sheets".into(),
            ));
        }

        let styles = XlsxStyleTable::build(workbook);
        let mut parts = vec![
            ("[Content_Types].xml".to_string(), content_types_xml(workbook)),
            ("_rels/.rels".to_string(), root_rels_xml()),
            ("xl/workbook.xml".to_string(), workbook_xml(workbook)),
            ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels_xml(workbook)),
            ("xl/styles.xml".to_string(), styles.to_styles_xml()),
        ];
        for (index, sheet) in workbook.worksheets().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", index + 1),
                worksheet_xml(sheet, index, &styles),
            ));
        }

        let mut zip = ZipWriter::new(writer);
        for (name, body) in &parts {
            zip.start_file(name.as_str(), SimpleFileOptions::default())?;
            zip.write_all(body.as_bytes())?;
        }
        zip.finish()?;
        Ok(())
    }
}

/// Run `write` against a temporary file in the directory of `path`, then
/// rename it over `path`. On error the temporary file is removed and `path`
/// is left alone.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> XlsxResult<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> XlsxResult<()>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(&mut tmp);
        write(&mut out)?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;

    match tmp.persist(path) {
        Ok(_) => Ok(()),
        // Some platforms refuse to rename over an existing file
        Err(err) if err.error.kind() == ErrorKind::AlreadyExists => {
            fs::remove_file(path)?;
            err.file.persist(path).map_err(|err| XlsxError::Io(err.error))?;
            Ok(())
        }
        Err(err) => Err(XlsxError::Io(err.error)),
    }
}

fn content_types_xml(workbook: &Workbook) -> String {
    let mut xml = format!(
        concat!(
            "{}\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
            "<Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>",
        ),
        XML_DECLARATION
    );
    for n in 1..=workbook.sheet_count() {
        xml.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"{}\"/>",
            n, SHEET_CONTENT_TYPE
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        "{}\n<Relationships xmlns=\"{}\"><Relationship Id=\"rId1\" Type=\"{}/officeDocument\" Target=\"xl/workbook.xml\"/></Relationships>",
        XML_DECLARATION, RELS_NS, DOC_REL
    )
}

fn workbook_xml(workbook: &Workbook) -> String {
    let sheets: String = (1..)
        .zip(workbook.worksheets())
        .map(|(n, sheet)| {
            format!(
                "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
                escape_xml(sheet.name()),
                n,
                n
            )
        })
        .collect();
    format!(
        "{}\n<workbook xmlns=\"{}\" xmlns:r=\"{}\"><sheets>{}</sheets></workbook>",
        XML_DECLARATION, MAIN_NS, DOC_REL, sheets
    )
}

/// Sheets take `rId1..=rIdN`; styles come right after them
fn workbook_rels_xml(workbook: &Workbook) -> String {
    let count = workbook.sheet_count();
    let mut xml = format!("{}\n<Relationships xmlns=\"{}\">", XML_DECLARATION, RELS_NS);
    for n in 1..=count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
            n, DOC_REL, n
        ));
    }
    xml.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"{}/styles\" Target=\"styles.xml\"/></Relationships>",
        count + 1,
        DOC_REL
    ));
    xml
}

fn worksheet_xml(sheet: &Worksheet, index: usize, styles: &XlsxStyleTable) -> String {
    let mut xml = format!("{}\n<worksheet xmlns=\"{}\">", XML_DECLARATION, MAIN_NS);
    xml.push_str(&cols_xml(sheet));

    // A row with a custom height is kept even when it has no cells
    let rows: BTreeSet<u32> = sheet
        .row_indices()
        .chain(sheet.custom_row_heights().keys().copied())
        .collect();

    xml.push_str("<sheetData>");
    for row in rows {
        match sheet.row_height(row) {
            Some(height) => xml.push_str(&format!(
                "\n<row r=\"{}\" ht=\"{}\" customHeight=\"1\">",
                row + 1,
                height
            )),
            None => xml.push_str(&format!("\n<row r=\"{}\">", row + 1)),
        }
        for (col, cell) in sheet.iter_row(row) {
            let xf = styles.xf_id_for(index, cell.style_index);
            xml.push_str(&cell_xml(CellAddress::new(row, col), xf, &cell.value));
        }
        xml.push_str("</row>");
    }
    xml.push_str("\n</sheetData>");

    let merges = sheet.merged_regions();
    if !merges.is_empty() {
        xml.push_str(&format!("<mergeCells count=\"{}\">", merges.len()));
        for range in merges {
            xml.push_str(&format!("<mergeCell ref=\"{}\"/>", range));
        }
        xml.push_str("</mergeCells>");
    }

    xml.push_str("</worksheet>");
    xml
}

/// `<cols>` with adjacent columns of equal width folded into one entry
fn cols_xml(sheet: &Worksheet) -> String {
    let mut runs: Vec<(u16, u16, f64)> = Vec::new();
    for (&col, &width) in sheet.custom_column_widths() {
        match runs.last_mut() {
            Some((_, last, run_width)) if *last + 1 == col && *run_width == width => *last = col,
            _ => runs.push((col, col, width)),
        }
    }
    if runs.is_empty() {
        return String::new();
    }

    let cols: String = runs
        .into_iter()
        .map(|(first, last, width)| {
            format!(
                "<col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
                first + 1,
                last + 1,
                width
            )
        })
        .collect();
    format!("<cols>{}</cols>", cols)
}

/// The `t` attribute and `<v>` text for a plain value; `None` when there is
/// nothing to write
fn typed_value(value: &CellValue) -> Option<(Option<&'static str>, String)> {
    match value {
        CellValue::Number(n) => Some((None, n.to_string())),
        CellValue::Boolean(b) => Some((Some("b"), u8::from(*b).to_string())),
        CellValue::Error(e) => Some((Some("e"), escape_xml(e.as_str()))),
        CellValue::String(s) => Some((Some("str"), escape_xml(&encode_excel_escapes(s.as_str())))),
        CellValue::Empty | CellValue::Formula { .. } => None,
    }
}

pub(crate) fn cell_xml(address: CellAddress, xf: u32, value: &CellValue) -> String {
    let mut open = format!("<c r=\"{}\"", address);
    if xf != 0 {
        open.push_str(&format!(" s=\"{}\"", xf));
    }

    let (kind, body) = match value {
        CellValue::Empty => return open + "/>",
        CellValue::String(s) => {
            let text = s.as_str();
            let preserve = if text.trim() == text {
                ""
            } else {
                " xml:space=\"preserve\""
            };
            (
                Some("inlineStr"),
                format!("<is><t{}>{}</t></is>", preserve, escape_xml(&encode_excel_escapes(text))),
            )
        }
        CellValue::Formula { text, cached_value } => {
            let formula = escape_xml(text.strip_prefix('=').unwrap_or(text));
            match cached_value.as_deref().and_then(typed_value) {
                Some((kind, cached)) => (kind, format!("<f>{}</f><v>{}</v>", formula, cached)),
                None => (None, format!("<f>{}</f>", formula)),
            }
        }
        other => match typed_value(other) {
            Some((kind, v)) => (kind, format!("<v>{}</v>", v)),
            None => (None, String::new()),
        },
    };

    if let Some(kind) = kind {
        open.push_str(&format!(" t=\"{}\"", kind));
    }
    format!("{}>{}</c>", open, body)
}
