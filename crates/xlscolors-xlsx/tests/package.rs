//! Saving edits back into an Excel-written package

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};

use pretty_assertions::assert_eq;
use xlscolors_core::style::{BorderLineStyle, HorizontalAlignment};
use xlscolors_core::{CellValue, Color, FillStyle, NumberFormat};
use xlscolors_xlsx::{XlsxPackage, XlsxReader};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="vml" ContentType="application/vnd.openxmlformats-officedocument.vmlDrawing"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/chartsheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.chartsheet+xml"/><Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/><Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/><Override PartName="/xl/charts/chart1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/><Override PartName="/xl/comments1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView xWindow="0" yWindow="0" windowWidth="28800" windowHeight="12300"/></bookViews><sheets><sheet name="Runs" sheetId="1" r:id="rId1"/><sheet name="Trend" sheetId="2" r:id="rId2"/></sheets><definedNames><definedName name="Results">Runs!$A$1:$C$3</definedName></definedNames><calcPr calcId="191029"/></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chartsheet" Target="chartsheets/sheet1.xml"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><dimension ref="A1:C3"/><sheetViews><sheetView tabSelected="1" workbookViewId="0"/></sheetViews><sheetFormatPr defaultRowHeight="15"/><cols><col min="1" max="1" width="18.7109375" customWidth="1"/></cols><sheetData><row r="1" spans="1:3"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1" s="1" t="s"><v>1</v></c><c r="C1" s="1" t="s"><v>2</v></c></row><row r="2" spans="1:3"><c r="A2" t="s"><v>3</v></c><c r="B2" s="2"><v>0.25</v></c><c r="C2"><f>B2*2</f><v>0.5</v></c></row><row r="3" spans="1:3"><c r="A3" t="s"><v>4</v></c><c r="B3" s="2"><v>0.75</v></c></row></sheetData><conditionalFormatting sqref="B2:B3"><cfRule type="cellIs" dxfId="0" priority="1" operator="greaterThan"><formula>0.5</formula></cfRule></conditionalFormatting><dataValidations count="1"><dataValidation type="list" allowBlank="1" sqref="A2:A3"><formula1>"done,failed,pending"</formula1></dataValidation></dataValidations><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><legacyDrawing r:id="rId1"/></worksheet>"#;

const SHEET_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="../comments1.xml"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/vmlDrawing" Target="../drawings/vmlDrawing1.vml"/></Relationships>"#;

const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="5"><si><t>Task</t></si><si><t>Share</t></si><si><t>Double</t></si><si><t>done</t></si><si><t>failed</t></si></sst>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="0.0%"/></numFmts><fonts count="2"><font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font><font><b/><sz val="11"/><color theme="1" tint="-0.249977111117893"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="2"><border><left/><right/><top/><bottom/><diagonal/></border><border><left style="thin"><color indexed="64"/></left><right style="thin"><color indexed="64"/></right><top style="thin"><color indexed="64"/></top><bottom style="medium"><color rgb="FFFF0000"/></bottom><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" wrapText="1"/></xf><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles><dxfs count="1"><dxf><font><color rgb="FF9C0006"/></font><fill><patternFill><bgColor rgb="FFFFC7CE"/></patternFill></fill></dxf></dxfs><tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/></styleSheet>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#;

const CHARTSHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<chartsheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetPr/><sheetViews><sheetView zoomScale="115" workbookViewId="0" zoomToFit="1"/></sheetViews><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><drawing r:id="rId1"/></chartsheet>"#;

const CHARTSHEET_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/></Relationships>"#;

const DRAWING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><xdr:absoluteAnchor><xdr:pos x="0" y="0"/><xdr:ext cx="8666238" cy="6292362"/><xdr:graphicFrame macro=""><xdr:nvGraphicFramePr><xdr:cNvPr id="2" name="Chart 1"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr><xdr:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></xdr:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="rId1"/></a:graphicData></a:graphic></xdr:graphicFrame><xdr:clientData/></xdr:absoluteAnchor></xdr:wsDr>"#;

const DRAWING_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/></Relationships>"#;

const CHART: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart><c:plotArea><c:barChart><c:barDir val="col"/><c:ser><c:idx val="0"/><c:order val="0"/><c:val><c:numRef><c:f>Runs!$B$2:$B$3</c:f></c:numRef></c:val></c:ser></c:barChart></c:plotArea></c:chart></c:chartSpace>"#;

const COMMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><authors><author>qa</author></authors><commentList><comment ref="A3" authorId="0"><text><r><t>rerun tomorrow</t></r></text></comment></commentList></comments>"#;

const VML: &str = r##"<xml xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel"><v:shape id="_x0000_s1025" type="#_x0000_t202" style="position:absolute;visibility:hidden"><x:ClientData ObjectType="Note"><x:Row>2</x:Row><x:Column>0</x:Column></x:ClientData></v:shape></xml>"##;

const PARTS: [(&str, &str); 15] = [
    ("[Content_Types].xml", CONTENT_TYPES),
    ("_rels/.rels", ROOT_RELS),
    ("xl/workbook.xml", WORKBOOK),
    ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
    ("xl/worksheets/sheet1.xml", SHEET),
    ("xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS),
    ("xl/sharedStrings.xml", SHARED_STRINGS),
    ("xl/styles.xml", STYLES),
    ("xl/theme/theme1.xml", THEME),
    ("xl/chartsheets/sheet1.xml", CHARTSHEET),
    ("xl/chartsheets/_rels/sheet1.xml.rels", CHARTSHEET_RELS),
    ("xl/drawings/drawing1.xml", DRAWING),
    ("xl/drawings/_rels/drawing1.xml.rels", DRAWING_RELS),
    ("xl/charts/chart1.xml", CHART),
    ("xl/comments1.xml", COMMENTS),
];

/// A package laid out the way Excel writes one
fn excel_package() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in PARTS {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.start_file("xl/drawings/vmlDrawing1.vml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(VML.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

fn parts(package: &[u8]) -> BTreeMap<String, String> {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut part = archive.by_index(i).unwrap();
            let mut body = String::new();
            part.read_to_string(&mut body).unwrap();
            (part.name().to_string(), body)
        })
        .collect()
}

fn save(package: &XlsxPackage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    package.write(&mut out).unwrap();
    out.into_inner()
}

#[test]
fn test_unedited_package_is_unchanged() {
    let source = excel_package();
    let package = XlsxPackage::from_bytes(source.clone()).unwrap();

    assert_eq!(parts(&save(&package)), parts(&source));
}

#[test]
fn test_model_sees_shared_strings_and_formats() {
    let package = XlsxPackage::from_bytes(excel_package()).unwrap();
    let workbook = package.workbook();

    // The chart sheet is not a worksheet
    assert_eq!(workbook.sheet_count(), 1);
    let sheet = workbook.worksheet(0).unwrap();
    assert_eq!(sheet.name(), "Runs");
    assert_eq!(sheet.cell_text_at(2, 0).as_deref(), Some("failed"));

    let header = sheet.cell_style_at(0, 0).unwrap();
    assert!(header.font.bold);
    assert_eq!(
        header.font.color,
        Color::Theme {
            index: 1,
            tint: -0.249977111117893
        }
    );
    assert_eq!(header.alignment.horizontal, HorizontalAlignment::Center);
    assert!(header.alignment.wrap_text);
    let bottom = header.border.bottom.as_ref().unwrap();
    assert_eq!(bottom.line, BorderLineStyle::Medium);
    assert_eq!(
        sheet.cell_style_at(1, 1).unwrap().number_format,
        NumberFormat::Custom("0.0%".into())
    );
}

#[test]
fn test_edits_keep_unmodeled_parts() {
    let source = excel_package();
    let mut package = XlsxPackage::from_bytes(source.clone()).unwrap();
    let sheet = package.workbook_mut().worksheet_mut(0).unwrap();
    sheet
        .update_cell_style_at(2, 0, |style| style.fill = FillStyle::solid(Color::RED))
        .unwrap();
    sheet
        .update_cell_style_at(0, 1, |style| style.font.italic = true)
        .unwrap();

    let saved = save(&package);
    let before = parts(&source);
    let after = parts(&saved);

    assert_eq!(
        after.keys().collect::<Vec<_>>(),
        before.keys().collect::<Vec<_>>()
    );
    for name in [
        "[Content_Types].xml",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/sharedStrings.xml",
        "xl/theme/theme1.xml",
        "xl/chartsheets/sheet1.xml",
        "xl/drawings/drawing1.xml",
        "xl/charts/chart1.xml",
        "xl/comments1.xml",
        "xl/drawings/vmlDrawing1.vml",
        "xl/worksheets/_rels/sheet1.xml.rels",
    ] {
        assert_eq!(after[name], before[name], "{} changed", name);
    }

    let sheet_xml = &after["xl/worksheets/sheet1.xml"];
    assert!(sheet_xml.contains("<c r=\"A1\" s=\"1\" t=\"s\"><v>0</v></c>"));
    assert!(sheet_xml.contains("<c r=\"B1\" s=\"3\" t=\"s\"><v>1</v></c>"));
    assert!(sheet_xml.contains("<c r=\"A3\" t=\"s\" s=\"4\"><v>4</v></c>"));
    assert!(sheet_xml.contains("<conditionalFormatting sqref=\"B2:B3\">"));
    assert!(sheet_xml.contains("<formula1>\"done,failed,pending\"</formula1>"));
    assert!(sheet_xml.contains("<legacyDrawing r:id=\"rId1\"/>"));
    assert!(sheet_xml.contains("<cols><col min=\"1\" max=\"1\" width=\"18.7109375\" customWidth=\"1\"/></cols>"));

    let styles = &after["xl/styles.xml"];
    assert!(styles.starts_with(&STYLES[..STYLES.find("<fonts").unwrap()]));
    assert!(styles.contains("<color theme=\"1\" tint=\"-0.249977111117893\"/>"));
    assert!(styles.contains("<bottom style=\"medium\"><color rgb=\"FFFF0000\"/></bottom>"));
    assert!(styles.contains("<cellXfs count=\"5\">"));
    assert!(styles.contains("<dxfs count=\"1\"><dxf><font><color rgb=\"FF9C0006\"/>"));
    assert!(styles.contains(MAIN_NS));

    // The italic header keeps its border and alignment
    let workbook = XlsxReader::read(Cursor::new(&saved)).unwrap();
    let sheet = workbook.worksheet(0).unwrap();
    let header = sheet.cell_style_at(0, 1).unwrap();
    assert!(header.font.bold && header.font.italic);
    assert_eq!(
        header.font.color,
        Color::Theme {
            index: 1,
            tint: -0.249977111117893
        }
    );
    assert_eq!(header.alignment.horizontal, HorizontalAlignment::Center);
    assert_eq!(
        header.border.bottom.as_ref().map(|edge| edge.line),
        Some(BorderLineStyle::Medium)
    );
    assert_eq!(
        sheet.cell_style_at(2, 0).unwrap().fill,
        FillStyle::solid(Color::RED)
    );
    assert_eq!(sheet.cell_text_at(2, 0).as_deref(), Some("failed"));
}

#[test]
fn test_changed_values_are_written() {
    let mut package = XlsxPackage::from_bytes(excel_package()).unwrap();
    let sheet = package.workbook_mut().worksheet_mut(0).unwrap();
    sheet.set_cell_value("A2", "passed").unwrap();
    sheet.set_cell_value("D3", 7.0).unwrap();

    let saved = save(&package);
    let sheet_xml = &parts(&saved)["xl/worksheets/sheet1.xml"];
    assert!(sheet_xml.contains("<c r=\"A2\" t=\"inlineStr\"><is><t>passed</t></is></c>"));
    assert!(sheet_xml.contains("<c r=\"B3\" s=\"2\"><v>0.75</v></c><c r=\"D3\"><v>7</v></c></row>"));

    let workbook = XlsxReader::read(Cursor::new(&saved)).unwrap();
    let sheet = workbook.worksheet(0).unwrap();
    assert_eq!(sheet.cell_text_at(1, 0).as_deref(), Some("passed"));
    assert_eq!(sheet.get_value_at(2, 3), CellValue::Number(7.0));
    assert_eq!(sheet.cell_text_at(2, 0).as_deref(), Some("failed"));
}

#[test]
fn test_added_sheet_writes_new_package() {
    let mut package = XlsxPackage::from_bytes(excel_package()).unwrap();
    package.workbook_mut().add_worksheet_with_name("Extra").unwrap();

    let saved = save(&package);
    assert!(!parts(&saved).contains_key("xl/theme/theme1.xml"));

    let workbook = XlsxReader::read(Cursor::new(&saved)).unwrap();
    assert_eq!(workbook.sheet_count(), 2);
    assert_eq!(workbook.worksheet(0).unwrap().cell_text_at(0, 0).as_deref(), Some("Task"));
}

#[test]
fn test_save_replaces_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.xlsx");
    fs::write(&path, excel_package()).unwrap();

    let mut package = XlsxPackage::open(&path).unwrap();
    package
        .workbook_mut()
        .worksheet_mut(0)
        .unwrap()
        .update_cell_style_at(1, 0, |style| style.fill = FillStyle::solid(Color::GREEN))
        .unwrap();
    package.save(&path).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let reopened = XlsxPackage::open(&path).unwrap();
    let sheet = reopened.workbook().worksheet(0).unwrap();
    assert_eq!(
        sheet.cell_style_at(1, 0).unwrap().fill,
        FillStyle::solid(Color::GREEN)
    );
}
