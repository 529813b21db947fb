//! The `xl/styles.xml` part
//!
//! Writing flattens every sheet's style pool into one `cellXfs` list;
//! reading turns each `cellXfs` entry back into a [`Style`] and keeps the
//! font, fill, border and number format lists so formats can be appended to
//! an existing part.

use std::collections::HashMap;
use std::hash::Hash;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::escape::escape_xml;
use xlscolors_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, DiagonalDirection, FillStyle,
    FontStyle, HorizontalAlignment, NumberFormat, PatternType, Protection, ReadingOrder, Style,
    Underline, VerticalAlignment,
};
use xlscolors_core::Workbook;

// === Writing ===

/// Distinct values in first-seen order, each with its position
#[derive(Debug)]
pub(crate) struct Interned<T> {
    pub(crate) items: Vec<T>,
    ids: HashMap<T, u32>,
}

impl<T: Clone + Eq + Hash> Interned<T> {
    pub(crate) fn seeded<I: IntoIterator<Item = T>>(seed: I) -> Self {
        let mut table = Self {
            items: Vec::new(),
            ids: HashMap::new(),
        };
        for item in seed {
            table.id(&item);
        }
        table
    }

    pub(crate) fn id(&mut self, item: &T) -> u32 {
        if let Some(&id) = self.ids.get(item) {
            return id;
        }
        let id = self.items.len() as u32;
        self.items.push(item.clone());
        self.ids.insert(item.clone(), id);
        id
    }

    pub(crate) fn get(&self, item: &T) -> Option<u32> {
        self.ids.get(item).copied()
    }
}

/// The `cellXfs` of a workbook being written.
///
/// Every sheet interns its own styles; this merges the per-sheet pools into
/// one workbook-wide list and remembers how each sheet's indices map onto it.
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    styles: Interned<Style>,
    sheet_xf_ids: Vec<HashMap<u32, u32>>,
}

/// Positions of a cell format's parts in the numFmts, fonts, fills and
/// borders lists
#[derive(Debug, Clone, Copy)]
pub(crate) struct XfParts {
    pub(crate) num_fmt: u32,
    pub(crate) font: u32,
    pub(crate) fill: u32,
    pub(crate) border: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles = Interned::seeded([Style::default()]);

        let sheet_xf_ids = workbook
            .worksheets()
            .map(|sheet| {
                let mut xf_ids = HashMap::from([(0, 0)]);
                for (_, _, cell) in sheet.iter_cells() {
                    xf_ids.entry(cell.style_index).or_insert_with(|| {
                        let style = sheet
                            .style_by_index(cell.style_index)
                            .cloned()
                            .unwrap_or_default();
                        styles.id(&style)
                    });
                }
                xf_ids
            })
            .collect();

        Self {
            styles,
            sheet_xf_ids,
        }
    }

    /// The `s` attribute for a cell of sheet `sheet` styled with pool index `local`
    pub(crate) fn xf_id_for(&self, sheet: usize, local: u32) -> u32 {
        self.sheet_xf_ids
            .get(sheet)
            .and_then(|ids| ids.get(&local))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts = Interned::seeded([FontStyle::default()]);
        // The first two fills are reserved and must be none and gray125
        let mut fills = Interned::seeded([
            FillStyle::None,
            FillStyle::Pattern {
                pattern: PatternType::Gray125,
                foreground: Color::Auto,
                background: Color::Auto,
            },
        ]);
        let mut borders = Interned::seeded([BorderStyle::default()]);
        let mut custom_formats = Interned::seeded(Vec::<String>::new());

        let parts: Vec<XfParts> = self
            .styles
            .items
            .iter()
            .map(|style| XfParts {
                num_fmt: match &style.number_format {
                    NumberFormat::General => 0,
                    NumberFormat::BuiltIn(id) => *id,
                    NumberFormat::Custom(code) => {
                        NumberFormat::FIRST_CUSTOM_ID + custom_formats.id(code)
                    }
                },
                font: fonts.id(&style.font),
                fill: fills.id(&style.fill),
                border: borders.id(&style.border),
            })
            .collect();

        let mut xml = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        ));

        if !custom_formats.items.is_empty() {
            let numbered: Vec<_> = (NumberFormat::FIRST_CUSTOM_ID..)
                .zip(custom_formats.items.iter().map(String::as_str))
                .collect();
            push_list(&mut xml, "numFmts", &numbered, |(id, code)| num_fmt_xml(*id, code));
        }
        push_list(&mut xml, "fonts", &fonts.items, font_xml);
        push_list(&mut xml, "fills", &fills.items, fill_xml);
        push_list(&mut xml, "borders", &borders.items, border_xml);
        xml.push_str(
            "\n  <cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
        );

        let xfs: Vec<_> = self.styles.items.iter().zip(parts).collect();
        push_list(&mut xml, "cellXfs", &xfs, |(style, parts)| xf_xml(style, *parts));

        xml.push_str(concat!(
            "\n  <cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>",
            "\n  <dxfs count=\"0\"/>",
            "\n  <tableStyles count=\"0\"/>",
            "\n</styleSheet>",
        ));
        xml
    }
}

/// Append `<tag count="n">` with one rendered child per item
fn push_list<T>(xml: &mut String, tag: &str, items: &[T], render: impl Fn(&T) -> String) {
    xml.push_str(&format!("\n  <{} count=\"{}\">", tag, items.len()));
    for item in items {
        xml.push_str("\n    ");
        xml.push_str(&render(item));
    }
    xml.push_str(&format!("\n  </{}>", tag));
}

pub(crate) fn num_fmt_xml(id: u32, code: &str) -> String {
    format!(
        "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
        id,
        escape_xml(code)
    )
}

fn color_xml(tag: &str, color: &Color) -> String {
    let attrs = match color {
        Color::Auto => "indexed=\"64\"".to_string(),
        Color::Rgb { .. } | Color::Argb { .. } => {
            format!("rgb=\"{}\"", color.to_argb_hex().unwrap_or_default())
        }
        Color::Indexed(index) => format!("indexed=\"{}\"", index),
        Color::Theme { index, tint } if *tint == 0.0 => format!("theme=\"{}\"", index),
        Color::Theme { index, tint } => format!("theme=\"{}\" tint=\"{}\"", index, tint),
        Color::Raw(text) => format!("rgb=\"{}\"", escape_xml(text)),
    };
    format!("<{} {}/>", tag, attrs)
}

pub(crate) fn font_xml(font: &FontStyle) -> String {
    let mut xml = String::from("<font>");
    for (on, tag) in [
        (font.bold, "<b/>"),
        (font.italic, "<i/>"),
        (font.strikethrough, "<strike/>"),
    ] {
        if on {
            xml.push_str(tag);
        }
    }
    match font.underline.xlsx_name() {
        Some("single") => xml.push_str("<u/>"),
        Some(val) => xml.push_str(&format!("<u val=\"{}\"/>", val)),
        None => {}
    }
    xml.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        xml.push_str(&color_xml("color", &font.color));
    }
    xml.push_str(&format!("<name val=\"{}\"/></font>", escape_xml(&font.name)));
    xml
}

pub(crate) fn fill_xml(fill: &FillStyle) -> String {
    let pattern = match fill {
        FillStyle::None => "<patternFill patternType=\"none\"/>".to_string(),
        FillStyle::Solid { color } => format!(
            "<patternFill patternType=\"solid\">{}{}</patternFill>",
            color_xml("fgColor", color),
            color_xml("bgColor", &Color::Auto)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => format!(
            "<patternFill patternType=\"{}\">{}{}</patternFill>",
            pattern.xlsx_name(),
            color_xml("fgColor", foreground),
            color_xml("bgColor", background)
        ),
    };
    format!("<fill>{}</fill>", pattern)
}

pub(crate) fn border_xml(border: &BorderStyle) -> String {
    let mut xml = String::from("<border");
    if border.diagonal_direction.is_up() {
        xml.push_str(" diagonalUp=\"1\"");
    }
    if border.diagonal_direction.is_down() {
        xml.push_str(" diagonalDown=\"1\"");
    }
    xml.push('>');
    for (tag, edge) in [
        ("left", &border.left),
        ("right", &border.right),
        ("top", &border.top),
        ("bottom", &border.bottom),
        ("diagonal", &border.diagonal),
    ] {
        match edge {
            None => xml.push_str(&format!("<{}/>", tag)),
            Some(edge) => xml.push_str(&format!(
                "<{} style=\"{}\">{}</{}>",
                tag,
                edge.line.xlsx_name(),
                color_xml("color", &edge.color),
                tag
            )),
        }
    }
    xml.push_str("</border>");
    xml
}

fn alignment_xml(alignment: &Alignment) -> Option<String> {
    if alignment.is_default() {
        return None;
    }
    let default = Alignment::default();
    let mut xml = String::from("<alignment");
    if alignment.horizontal != default.horizontal {
        xml.push_str(&format!(" horizontal=\"{}\"", alignment.horizontal.xlsx_name()));
    }
    if alignment.vertical != default.vertical {
        xml.push_str(&format!(" vertical=\"{}\"", alignment.vertical.xlsx_name()));
    }
    if alignment.rotation != 0 {
        xml.push_str(&format!(" textRotation=\"{}\"", alignment.rotation));
    }
    if alignment.wrap_text {
        xml.push_str(" wrapText=\"1\"");
    }
    if alignment.indent != 0 {
        xml.push_str(&format!(" indent=\"{}\"", alignment.indent));
    }
    if alignment.shrink_to_fit {
        xml.push_str(" shrinkToFit=\"1\"");
    }
    if alignment.reading_order != default.reading_order {
        xml.push_str(&format!(" readingOrder=\"{}\"", alignment.reading_order.xlsx_value()));
    }
    xml.push_str("/>");
    Some(xml)
}

fn protection_xml(protection: &Protection) -> Option<String> {
    if *protection == Protection::default() {
        return None;
    }
    Some(format!(
        "<protection locked=\"{}\" hidden=\"{}\"/>",
        u8::from(protection.locked),
        u8::from(protection.hidden)
    ))
}

pub(crate) fn xf_xml(style: &Style, parts: XfParts) -> String {
    let mut xml = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        parts.num_fmt, parts.font, parts.fill, parts.border
    );
    for (applies, attr) in [
        (parts.num_fmt != 0, " applyNumberFormat=\"1\""),
        (style.font != FontStyle::default(), " applyFont=\"1\""),
        (!style.fill.is_none(), " applyFill=\"1\""),
        (!style.border.is_empty(), " applyBorder=\"1\""),
        (!style.alignment.is_default(), " applyAlignment=\"1\""),
        (style.protection != Protection::default(), " applyProtection=\"1\""),
    ] {
        if applies {
            xml.push_str(attr);
        }
    }

    let children: String = [
        alignment_xml(&style.alignment),
        protection_xml(&style.protection),
    ]
    .into_iter()
    .flatten()
    .collect();
    if children.is_empty() {
        xml.push_str("/>");
    } else {
        xml.push_str(&format!(">{}</xf>", children));
    }
    xml
}

// === Reading ===

/// The lists of a `styles.xml` part, in file order
#[derive(Debug, Default)]
pub(crate) struct StylesPart {
    pub(crate) numfmts: HashMap<u32, String>,
    pub(crate) fonts: Vec<FontStyle>,
    pub(crate) fills: Vec<FillStyle>,
    pub(crate) borders: Vec<BorderStyle>,
    /// One style per `cellXfs` entry
    pub(crate) cell_xfs: Vec<Style>,
}

impl StylesPart {
    /// The style a cell's `s` attribute stands for; 0 and unknown indices
    /// are the default style
    pub(crate) fn cell_style(&self, xf: u32) -> Style {
        match xf {
            0 => Style::default(),
            _ => self.cell_xfs.get(xf as usize).cloned().unwrap_or_default(),
        }
    }
}

/// Read `styles.xml`, resolving each `cellXfs` entry into a [`Style`].
///
/// Named cell styles (`cellStyleXfs`) and differential formats are skipped.
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<StylesPart> {
    let mut xml = Reader::from_reader(BufReader::new(reader));
    xml.trim_text(true);

    let mut parser = StylesParser::default();
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => parser.open(&e, false),
            Event::Empty(e) => parser.open(&e, true),
            Event::End(e) => parser.close(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let part = parser.part;
    log::debug!(
        "styles.xml: {} fonts, {} fills, {} borders, {} cell formats",
        part.fonts.len(),
        part.fills.len(),
        part.borders.len(),
        part.cell_xfs.len()
    );
    Ok(part)
}

/// Which edge of the `<border>` being read a child element sets
#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    Diagonal,
}

impl Edge {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        Some(match tag {
            b"left" | b"start" => Edge::Left,
            b"right" | b"end" => Edge::Right,
            b"top" => Edge::Top,
            b"bottom" => Edge::Bottom,
            b"diagonal" => Edge::Diagonal,
            _ => return None,
        })
    }

    fn slot(self, border: &mut BorderStyle) -> &mut Option<BorderEdge> {
        match self {
            Edge::Left => &mut border.left,
            Edge::Right => &mut border.right,
            Edge::Top => &mut border.top,
            Edge::Bottom => &mut border.bottom,
            Edge::Diagonal => &mut border.diagonal,
        }
    }
}

#[derive(Default)]
struct StylesParser {
    part: StylesPart,

    current_font: Option<FontStyle>,
    in_fill: bool,
    fill_pattern: Option<PatternType>,
    fill_fg: Color,
    fill_bg: Color,
    current_border: Option<BorderStyle>,
    current_edge: Option<(Edge, BorderEdge)>,
    current_xf: Option<Style>,

    in_cell_xfs: bool,
    // Differential formats reuse <font>/<fill>/<border>; they must not land
    // in the tables
    in_dxfs: bool,
}

impl StylesParser {
    fn open(&mut self, e: &BytesStart<'_>, is_empty: bool) {
        let tag = e.local_name();
        match tag.as_ref() {
            b"dxfs" => self.in_dxfs = !is_empty,
            _ if self.in_dxfs => {}
            b"cellXfs" => self.in_cell_xfs = !is_empty,
            b"numFmt" => {
                let id = attr_value(e, b"numFmtId").and_then(|s| s.parse().ok());
                if let (Some(id), Some(code)) = (id, attr_value(e, b"formatCode")) {
                    self.part.numfmts.insert(id, code);
                }
            }
            b"font" => {
                if is_empty {
                    self.part.fonts.push(FontStyle::default());
                } else {
                    self.current_font = Some(FontStyle::default());
                }
            }
            b"color" if self.current_edge.is_some() => {
                if let Some((_, edge)) = self.current_edge.as_mut() {
                    edge.color = parse_color_attrs(e);
                }
            }
            b"b" | b"i" | b"strike" | b"u" | b"sz" | b"name" | b"color" => {
                if let Some(font) = self.current_font.as_mut() {
                    apply_font_property(font, e);
                }
            }
            b"fill" => {
                self.fill_pattern = None;
                self.fill_fg = Color::Auto;
                self.fill_bg = Color::Auto;
                if is_empty {
                    self.part.fills.push(FillStyle::None);
                } else {
                    self.in_fill = true;
                }
            }
            b"patternFill" if self.in_fill => {
                self.fill_pattern =
                    attr_value(e, b"patternType").and_then(|v| PatternType::from_xlsx(&v));
            }
            b"fgColor" if self.in_fill => self.fill_fg = parse_color_attrs(e),
            b"bgColor" if self.in_fill => self.fill_bg = parse_color_attrs(e),
            b"border" => {
                let border = BorderStyle {
                    diagonal_direction: DiagonalDirection::from_flags(
                        flag_attr(e, b"diagonalDown"),
                        flag_attr(e, b"diagonalUp"),
                    ),
                    ..BorderStyle::default()
                };
                if is_empty {
                    self.part.borders.push(border);
                } else {
                    self.current_border = Some(border);
                }
            }
            name if self.current_border.is_some() => {
                let line = attr_value(e, b"style").and_then(|v| BorderLineStyle::from_xlsx(&v));
                if let (Some(edge), Some(line)) = (Edge::from_tag(name), line) {
                    let read = (edge, BorderEdge::new(line, Color::Auto));
                    if is_empty {
                        self.set_edge(read);
                    } else {
                        self.current_edge = Some(read);
                    }
                }
            }
            b"xf" if self.in_cell_xfs => {
                let style = self.cell_format(e);
                if is_empty {
                    self.part.cell_xfs.push(style);
                } else {
                    self.current_xf = Some(style);
                }
            }
            b"alignment" => {
                if let Some(xf) = self.current_xf.as_mut() {
                    xf.alignment = parse_alignment(e);
                }
            }
            b"protection" => {
                if let Some(xf) = self.current_xf.as_mut() {
                    let default = Protection::default();
                    xf.protection = Protection {
                        locked: attr_value(e, b"locked").map_or(default.locked, |v| is_true(&v)),
                        hidden: attr_value(e, b"hidden").map_or(default.hidden, |v| is_true(&v)),
                    };
                }
            }
            _ => {}
        }
    }

    fn set_edge(&mut self, (edge, read): (Edge, BorderEdge)) {
        if let Some(border) = self.current_border.as_mut() {
            *edge.slot(border) = Some(read);
        }
    }

    /// Style of an `<xf>`, looking its parts up in the lists read so far
    fn cell_format(&self, xf: &BytesStart<'_>) -> Style {
        let num_fmt_id = id_attr(xf, b"numFmtId");
        let number_format = match self.part.numfmts.get(&num_fmt_id) {
            _ if num_fmt_id == 0 => NumberFormat::General,
            Some(code) => NumberFormat::Custom(code.clone()),
            None => NumberFormat::BuiltIn(num_fmt_id),
        };
        let font = self.part.fonts.get(id_attr(xf, b"fontId") as usize);
        let fill = self.part.fills.get(id_attr(xf, b"fillId") as usize);
        let border = self.part.borders.get(id_attr(xf, b"borderId") as usize);

        Style {
            font: font.cloned().unwrap_or_default(),
            fill: fill.cloned().unwrap_or_default(),
            border: border.cloned().unwrap_or_default(),
            number_format,
            ..Style::default()
        }
    }

    /// The `<fill>` just closed; a solid fill's color is its `fgColor`
    fn pattern_fill(&mut self) -> FillStyle {
        let fg = std::mem::take(&mut self.fill_fg);
        let bg = std::mem::take(&mut self.fill_bg);
        match self.fill_pattern {
            None | Some(PatternType::None) => FillStyle::None,
            Some(PatternType::Solid) => FillStyle::solid(fg),
            Some(pattern) => FillStyle::Pattern {
                pattern,
                foreground: fg,
                background: bg,
            },
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"dxfs" => self.in_dxfs = false,
            _ if self.in_dxfs => {}
            b"font" => {
                if let Some(font) = self.current_font.take() {
                    self.part.fonts.push(font);
                }
            }
            b"fill" if self.in_fill => {
                let fill = self.pattern_fill();
                self.part.fills.push(fill);
                self.in_fill = false;
            }
            b"border" => {
                if let Some(border) = self.current_border.take() {
                    self.part.borders.push(border);
                }
            }
            b"xf" => {
                if let Some(style) = self.current_xf.take() {
                    self.part.cell_xfs.push(style);
                }
            }
            b"cellXfs" => self.in_cell_xfs = false,
            edge if Edge::from_tag(edge).is_some() => {
                if let Some(read) = self.current_edge.take() {
                    self.set_edge(read);
                }
            }
            _ => {}
        }
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn id_attr(e: &BytesStart<'_>, key: &[u8]) -> u32 {
    attr_value(e, key)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn is_true(value: &str) -> bool {
    matches!(value, "1" | "true")
}

fn flag_attr(e: &BytesStart<'_>, key: &[u8]) -> bool {
    attr_value(e, key).map_or(false, |v| is_true(&v))
}

fn apply_font_property(font: &mut FontStyle, e: &BytesStart<'_>) {
    // <b/>, <i/> and <strike/> may carry val="0" to switch the flag off
    let flag = || !matches!(attr_value(e, b"val").as_deref(), Some("0") | Some("false"));
    match e.local_name().as_ref() {
        b"b" => font.bold = flag(),
        b"i" => font.italic = flag(),
        b"strike" => font.strikethrough = flag(),
        b"u" => {
            font.underline = attr_value(e, b"val")
                .map(|v| Underline::from_xlsx(&v))
                .unwrap_or(Underline::Single)
        }
        b"sz" => {
            if let Some(size) = attr_value(e, b"val").and_then(|v| v.parse::<f64>().ok()) {
                font.size = size;
            }
        }
        b"name" => {
            if let Some(name) = attr_value(e, b"val") {
                font.name = name;
            }
        }
        b"color" => font.color = parse_color_attrs(e),
        _ => {}
    }
}

fn parse_alignment(e: &BytesStart<'_>) -> Alignment {
    let number = |key: &[u8]| attr_value(e, key).and_then(|v| v.parse::<u8>().ok());
    Alignment {
        horizontal: attr_value(e, b"horizontal")
            .and_then(|v| HorizontalAlignment::from_xlsx(&v))
            .unwrap_or_default(),
        vertical: attr_value(e, b"vertical")
            .and_then(|v| VerticalAlignment::from_xlsx(&v))
            .unwrap_or_default(),
        wrap_text: flag_attr(e, b"wrapText"),
        shrink_to_fit: flag_attr(e, b"shrinkToFit"),
        indent: number(b"indent").unwrap_or(0),
        rotation: number(b"textRotation").unwrap_or(0),
        reading_order: ReadingOrder::from_xlsx(number(b"readingOrder").unwrap_or(0)),
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // rgb wins over theme, theme over indexed
    if let Some(rgb) = attr_value(e, b"rgb") {
        // Opaque colors read back the way they were written
        return match Color::from_hex_or_raw(&rgb) {
            Color::Argb { a: 0xFF, r, g, b } => Color::rgb(r, g, b),
            other => other,
        };
    }
    if let Some(index) = attr_value(e, b"theme").and_then(|s| s.parse::<u8>().ok()) {
        let tint = attr_value(e, b"tint")
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|t| t.is_finite())
            .unwrap_or(0.0);
        return Color::Theme { index, tint };
    }
    if let Some(i) = attr_value(e, b"indexed").and_then(|s| s.parse::<u8>().ok()) {
        // 64 is the "system foreground" placeholder, i.e. automatic
        if i != 64 {
            return Color::Indexed(i);
        }
    }
    Color::Auto
}
