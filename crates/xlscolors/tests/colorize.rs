//! End-to-end colorizing tests (write workbook -> colorize file -> read back)

use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use xlscolors::prelude::*;
use xlscolors::{Error, XlsxError};
use xlscolors_core::style::{BorderLineStyle, HorizontalAlignment};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const STYLESHEET: &str = r#"
headers:
  fg: "FFFFFF"
  bg: "808080"
  bold: true
keywords:
  ERROR:
    fg: "FFFFFF"
    bg: "FF0000"
  ++warn++:
    fg: "000000"
    bg: "FFFF00"
    whole_row: true
"#;

fn grey() -> Color {
    Color::rgb(0x80, 0x80, 0x80)
}

fn write_report(path: &Path) {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Status").unwrap();
    sheet.set_cell_value("B1", "Message").unwrap();
    sheet.set_cell_value("A2", "error").unwrap();
    sheet.set_cell_value("B2", "disk full").unwrap();
    sheet.set_cell_value("A3", "ok").unwrap();
    sheet.set_cell_value("B3", "Warning issued").unwrap();
    sheet.set_cell_value("C3", 7.0).unwrap();
    sheet.set_cell_value("A4", "ERRORS").unwrap();

    let idx = wb.add_worksheet_with_name("Archive").unwrap();
    let archive = wb.worksheet_mut(idx).unwrap();
    archive.set_cell_value("A1", "Status").unwrap();
    archive.set_cell_value("A2", "Error").unwrap();

    XlsxWriter::write_file(&wb, path).unwrap();
}

type CellSnapshot = (u32, u16, CellValue, Option<Style>);

fn snapshot(sheet: &Worksheet) -> Vec<CellSnapshot> {
    sheet
        .iter_cells()
        .map(|(row, col, cell)| {
            let style = sheet.cell_style_at(row, col).cloned();
            (row, col, cell.value.clone(), style)
        })
        .collect()
}

fn fill_at(sheet: &Worksheet, address: &str) -> Option<FillStyle> {
    sheet.cell_style(address).unwrap().map(|s| s.fill.clone())
}

/// Test a full run: header, exact match and whole-row contains match
#[test]
fn test_colorize_report() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("report.xlsx");
    let outfile = dir.path().join("colored.xlsx");
    write_report(&infile);
    fs::write(dir.path().join("report.yaml"), STYLESHEET).unwrap();

    let colorizer = Colorizer::new(ColorizerConfig {
        default_stylesheet: dir.path().join("missing.yaml"),
    });
    let stats = colorizer
        .run(&ColorizeJob::new(&infile).with_outfile(&outfile))
        .unwrap();

    assert_eq!(
        stats,
        ColorizeStats {
            sheets: 2,
            header_cells: 4,
            matched_cells: 3,
            styled_cells: 5,
        }
    );

    let wb = XlsxReader::read_file(&outfile).unwrap();
    let sheet = wb.worksheet(0).unwrap();

    let header = sheet.cell_style("A1").unwrap().unwrap();
    assert!(header.font.bold);
    assert_eq!(header.font.color, Color::WHITE);
    assert_eq!(header.fill, FillStyle::solid(grey()));

    let error = sheet.cell_style("A2").unwrap().unwrap();
    assert!(!error.font.bold);
    assert_eq!(error.font.color, Color::WHITE);
    assert_eq!(error.fill, FillStyle::solid(Color::RED));
    assert_eq!(fill_at(sheet, "B2"), None);

    for address in ["A3", "B3", "C3"] {
        assert_eq!(
            fill_at(sheet, address),
            Some(FillStyle::solid(Color::YELLOW)),
            "{}",
            address
        );
    }
    assert_eq!(fill_at(sheet, "A4"), None);
    assert_eq!(sheet.cell_text_at(2, 2).as_deref(), Some("7"));

    let archive = wb.worksheet_by_name("Archive").unwrap();
    assert_eq!(fill_at(archive, "A1"), Some(FillStyle::solid(grey())));
    assert_eq!(fill_at(archive, "A2"), Some(FillStyle::solid(Color::RED)));

    // The input is left alone when an outfile is given
    let original = XlsxReader::read_file(&infile).unwrap();
    assert_eq!(fill_at(original.worksheet(0).unwrap(), "A2"), None);
}

/// Test that running twice with an exact-only stylesheet changes nothing more
#[test]
fn test_colorize_in_place_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("report.xlsx");
    let stylesheet = dir.path().join("exact.yaml");
    write_report(&infile);
    fs::write(
        &stylesheet,
        "headers: {fg: 'FFFFFF', bg: '808080', bold: true}\nkeywords:\n  error: {fg: 'FFFFFF', bg: 'FF0000'}\n  ok: {fg: '000000', bg: '00FF00'}\n",
    )
    .unwrap();

    let colorizer = Colorizer::default();
    let job = ColorizeJob::new(&infile).with_stylesheet(&stylesheet);

    colorizer.run(&job).unwrap();
    let first = XlsxReader::read_file(&infile).unwrap();
    colorizer.run(&job).unwrap();
    let second = XlsxReader::read_file(&infile).unwrap();

    for (a, b) in first.worksheets().zip(second.worksheets()) {
        assert_eq!(snapshot(a), snapshot(b));
    }

    let sheet = first.worksheet(0).unwrap();
    assert_eq!(fill_at(sheet, "A3"), Some(FillStyle::solid(Color::GREEN)));
}

/// Test that the default stylesheet is used when no sibling exists
#[test]
fn test_falls_back_to_default_stylesheet() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("report.xlsx");
    let default = dir.path().join("xlscolors.yaml");
    write_report(&infile);
    fs::write(&default, "keywords:\n  disk full: {fg: '000000', bg: '0000FF'}\n").unwrap();

    let colorizer = Colorizer::new(ColorizerConfig {
        default_stylesheet: default,
    });
    let stats = colorizer.run(&ColorizeJob::new(&infile)).unwrap();
    assert_eq!(stats.header_cells, 0);
    assert_eq!(stats.matched_cells, 1);

    let wb = XlsxReader::read_file(&infile).unwrap();
    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(fill_at(sheet, "B2"), Some(FillStyle::solid(Color::BLUE)));
    assert_eq!(fill_at(sheet, "A1"), None);
}

/// Test that stylesheet problems stop the run before anything is written
#[test]
fn test_stylesheet_errors_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("report.xlsx");
    let outfile = dir.path().join("out.xlsx");
    write_report(&infile);

    let colorizer = Colorizer::default();

    let missing = dir.path().join("nope.yaml");
    let err = colorizer
        .run(
            &ColorizeJob::new(&infile)
                .with_outfile(&outfile)
                .with_stylesheet(&missing),
        )
        .unwrap_err();
    assert!(matches!(err, Error::StylesheetRead { ref path, .. } if *path == missing));

    let broken = dir.path().join("broken.yaml");
    fs::write(&broken, "headers: {fg: '000000', bg: 'FFFFFF'}\n").unwrap();
    let err = colorizer
        .run(
            &ColorizeJob::new(&infile)
                .with_outfile(&outfile)
                .with_stylesheet(&broken),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Stylesheet { .. }));
    assert!(err.to_string().contains("broken.yaml"));

    assert!(!outfile.exists());
}

/// Test that an unreadable workbook is reported with its path
#[test]
fn test_open_error_names_input() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("notes.xlsx");
    let stylesheet = dir.path().join("notes.yaml");
    fs::write(&infile, "plain text, not a workbook").unwrap();
    fs::write(&stylesheet, "keywords: {}\n").unwrap();

    let err = Colorizer::default()
        .run(&ColorizeJob::new(&infile))
        .unwrap_err();

    match err {
        Error::WorkbookOpen { path, source } => {
            assert_eq!(path, infile);
            assert!(matches!(source, XlsxError::Zip(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Test that a failed save is reported with the output path
#[test]
fn test_save_error_names_output() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("report.xlsx");
    write_report(&infile);
    fs::write(dir.path().join("report.yaml"), STYLESHEET).unwrap();

    let outfile = dir.path().join("no-such-dir").join("out.xlsx");
    let err = Colorizer::default()
        .run(&ColorizeJob::new(&infile).with_outfile(&outfile))
        .unwrap_err();

    assert!(matches!(err, Error::WorkbookSave { ref path, .. } if *path == outfile));
    assert_eq!(
        err.to_string(),
        format!("Could not write to {}", outfile.display())
    );
}

/// Parts of a small workbook as Excel saves it: shared strings, a theme, a
/// bordered header format and a chart sheet plotting the data
const EXCEL_PARTS: [(&str, &str); 12] = [
    (
        "[Content_Types].xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/chartsheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.chartsheet+xml"/><Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/><Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/><Override PartName="/xl/charts/chart1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/></Types>"#,
    ),
    (
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
    ),
    (
        "xl/workbook.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Runs" sheetId="1" r:id="rId1"/><sheet name="Durations" sheetId="2" r:id="rId2"/></sheets><definedNames><definedName name="Results">Runs!$A$1:$B$3</definedName></definedNames></workbook>"#,
    ),
    (
        "xl/_rels/workbook.xml.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chartsheet" Target="chartsheets/sheet1.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#,
    ),
    (
        "xl/worksheets/sheet1.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1:B3"/><sheetData><row r="1" spans="1:2"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1" s="1" t="s"><v>1</v></c></row><row r="2" spans="1:2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>12</v></c></row><row r="3" spans="1:2"><c r="A3" t="s"><v>3</v></c><c r="B3"><v>9</v></c></row></sheetData><conditionalFormatting sqref="B2:B3"><cfRule type="cellIs" dxfId="0" priority="1" operator="greaterThan"><formula>10</formula></cfRule></conditionalFormatting><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#,
    ),
    (
        "xl/sharedStrings.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4"><si><t>Status</t></si><si><t>Duration</t></si><si><t>failed</t></si><si><t>passed</t></si></sst>"#,
    ),
    (
        "xl/styles.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font><font><b/><sz val="11"/><color theme="1" tint="0.34998626667073579"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="2"><border><left/><right/><top/><bottom/><diagonal/></border><border><left/><right/><top/><bottom style="medium"><color indexed="64"/></bottom><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center"/></xf></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles><dxfs count="1"><dxf><font><color rgb="FF9C0006"/></font></dxf></dxfs></styleSheet>"#,
    ),
    (
        "xl/theme/theme1.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1></a:clrScheme></a:themeElements></a:theme>"#,
    ),
    (
        "xl/chartsheets/sheet1.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<chartsheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetViews><sheetView workbookViewId="0" zoomToFit="1"/></sheetViews><drawing r:id="rId1"/></chartsheet>"#,
    ),
    (
        "xl/chartsheets/_rels/sheet1.xml.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/></Relationships>"#,
    ),
    (
        "xl/drawings/drawing1.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><xdr:absoluteAnchor><xdr:pos x="0" y="0"/><xdr:ext cx="8666238" cy="6292362"/><xdr:graphicFrame macro=""><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="rId1"/></a:graphicData></a:graphic></xdr:graphicFrame><xdr:clientData/></xdr:absoluteAnchor></xdr:wsDr>"#,
    ),
    (
        "xl/charts/chart1.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart><c:plotArea><c:barChart><c:barDir val="col"/><c:ser><c:idx val="0"/><c:order val="0"/><c:val><c:numRef><c:f>Runs!$B$2:$B$3</c:f></c:numRef></c:val></c:ser></c:barChart></c:plotArea></c:chart></c:chartSpace>"#,
    ),
];

fn write_excel_package(path: &Path) {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in EXCEL_PARTS {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    fs::write(path, zip.finish().unwrap().into_inner()).unwrap();
}

fn package_parts(path: &Path) -> BTreeMap<String, String> {
    let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut part = archive.by_index(i).unwrap();
            let mut body = String::new();
            part.read_to_string(&mut body).unwrap();
            (part.name().to_string(), body)
        })
        .collect()
}

/// Test colorizing a workbook saved by Excel keeps what the model cannot hold
#[test]
fn test_colorize_excel_workbook_keeps_other_parts() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("runs.xlsx");
    let outfile = dir.path().join("runs-colored.xlsx");
    write_excel_package(&infile);
    fs::write(
        dir.path().join("runs.yaml"),
        "headers: {fg: 'FFFFFF', bg: '808080', bold: true}\nkeywords:\n  failed: {fg: 'FFFFFF', bg: 'C00000'}\n  ++pass++: {fg: '000000', bg: 'C6EFCE', whole_row: true}\n",
    )
    .unwrap();

    let stats = Colorizer::default()
        .run(&ColorizeJob::new(&infile).with_outfile(&outfile))
        .unwrap();
    assert_eq!(
        stats,
        ColorizeStats {
            sheets: 1,
            header_cells: 2,
            matched_cells: 2,
            styled_cells: 3,
        }
    );

    let before = package_parts(&infile);
    let after = package_parts(&outfile);
    assert_eq!(
        after.keys().collect::<Vec<_>>(),
        before.keys().collect::<Vec<_>>()
    );
    for name in [
        "xl/workbook.xml",
        "xl/sharedStrings.xml",
        "xl/theme/theme1.xml",
        "xl/chartsheets/sheet1.xml",
        "xl/drawings/drawing1.xml",
        "xl/charts/chart1.xml",
    ] {
        assert_eq!(after[name], before[name], "{} changed", name);
    }
    assert!(after["xl/worksheets/sheet1.xml"].contains("<conditionalFormatting sqref=\"B2:B3\">"));
    let styles = &after["xl/styles.xml"];
    assert!(styles.contains("<color theme=\"1\" tint=\"0.34998626667073579\"/>"));
    assert!(styles.contains("<dxfs count=\"1\">"));

    let wb = XlsxReader::read_file(&outfile).unwrap();
    assert_eq!(wb.sheet_count(), 1);
    let sheet = wb.worksheet(0).unwrap();

    // The header keeps its border and alignment under the new colors
    let header = sheet.cell_style("B1").unwrap().unwrap();
    assert!(header.font.bold);
    assert_eq!(header.font.color, Color::WHITE);
    assert_eq!(header.fill, FillStyle::solid(Color::rgb(0x80, 0x80, 0x80)));
    assert_eq!(
        header.border.bottom.as_ref().map(|edge| edge.line),
        Some(BorderLineStyle::Medium)
    );
    assert_eq!(header.alignment.horizontal, HorizontalAlignment::Center);

    assert_eq!(
        fill_at(sheet, "A2"),
        Some(FillStyle::solid(Color::rgb(0xC0, 0x00, 0x00)))
    );
    assert_eq!(fill_at(sheet, "B2"), None);
    for address in ["A3", "B3"] {
        assert_eq!(
            fill_at(sheet, address),
            Some(FillStyle::solid(Color::rgb(0xC6, 0xEF, 0xCE))),
            "{}",
            address
        );
    }
    assert_eq!(sheet.cell_text_at(1, 0).as_deref(), Some("failed"));
    assert_eq!(sheet.get_value_at(2, 1), CellValue::Number(9.0));
}

/// Test that a whole-row match styles the cells right of the matched one
#[test]
fn test_whole_row_reaches_columns_after_match() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("log.xlsx");
    let stylesheet = dir.path().join("log.yaml");

    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Level").unwrap();
    sheet.set_cell_value("A2", "info").unwrap();
    sheet.set_cell_value("B2", "started").unwrap();
    sheet.set_cell_value("A3", "WARN").unwrap();
    sheet.set_cell_value("B3", "slow disk").unwrap();
    sheet.set_cell_value("C3", 812.0).unwrap();
    sheet
        .set_cell_style("E3", &Style::new().number_format("0.00"))
        .unwrap();
    XlsxWriter::write_file(&wb, &infile).unwrap();
    fs::write(
        &stylesheet,
        "keywords:\n  warn: {fg: '000000', bg: 'FFFF00', whole_row: true}\n",
    )
    .unwrap();

    let stats = Colorizer::default()
        .run(&ColorizeJob::new(&infile).with_stylesheet(&stylesheet))
        .unwrap();
    assert_eq!(stats.matched_cells, 1);
    assert_eq!(stats.styled_cells, 4);

    let wb = XlsxReader::read_file(&infile).unwrap();
    let sheet = wb.worksheet(0).unwrap();
    for address in ["A3", "B3", "C3", "E3"] {
        assert_eq!(
            fill_at(sheet, address),
            Some(FillStyle::solid(Color::YELLOW)),
            "{}",
            address
        );
    }
    // Columns with no cell stay unstyled
    assert!(sheet.cell_at(2, 3).is_none());
    let e3 = sheet.cell_style("E3").unwrap().unwrap();
    assert_eq!(e3.number_format, xlscolors_core::NumberFormat::Custom("0.00".into()));
    assert_eq!(fill_at(sheet, "A2"), None);
    assert_eq!(fill_at(sheet, "B2"), None);
    assert_eq!(sheet.cell_text_at(2, 2).as_deref(), Some("812"));
}

/// Test that color names the workbook may not know are written as given
#[test]
fn test_unrecognized_colors_are_written_as_given() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("report.xlsx");
    let stylesheet = dir.path().join("named.yaml");
    write_report(&infile);
    fs::write(
        &stylesheet,
        "keywords:\n  never seen: {fg: red, bg: '00FF00'}\n  disk full: {fg: '000000', bg: tomato}\n",
    )
    .unwrap();

    let stats = Colorizer::default()
        .run(&ColorizeJob::new(&infile).with_stylesheet(&stylesheet))
        .unwrap();
    assert_eq!(stats.matched_cells, 1);

    let parts = package_parts(&infile);
    assert!(parts["xl/styles.xml"].contains("<fgColor rgb=\"tomato\"/>"));
    assert!(!parts["xl/styles.xml"].contains("rgb=\"red\""));

    let wb = XlsxReader::read_file(&infile).unwrap();
    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(
        fill_at(sheet, "B2"),
        Some(FillStyle::solid(Color::Raw("tomato".into())))
    );
}
