//! Appending cell formats to an existing `styles.xml`
//!
//! Everything already in the part keeps its position, so every `s`, `fontId`
//! and `dxfId` in the rest of the package stays valid. New fonts, fills,
//! borders, number formats and cell formats go at the end of their lists.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use quick_xml::events::{BytesEnd, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::with_attribute;
use crate::error::{XlsxError, XlsxResult};
use crate::styles::{
    border_xml, fill_xml, font_xml, num_fmt_xml, xf_xml, Interned, StylesPart, XfParts,
};
use xlscolors_core::style::{BorderStyle, FillStyle, FontStyle, NumberFormat, Style};

/// Index of the first occurrence of every item
fn first_positions<T: Clone + Eq + std::hash::Hash>(items: &[T]) -> HashMap<T, u32> {
    let mut positions = HashMap::new();
    for (index, item) in (0u32..).zip(items) {
        positions.entry(item.clone()).or_insert(index);
    }
    positions
}

/// Cell formats to write on top of the ones a package already has
pub(crate) struct StyleAppender<'a> {
    base: &'a StylesPart,
    xfs: HashMap<Style, u32>,
    fonts: HashMap<FontStyle, u32>,
    fills: HashMap<FillStyle, u32>,
    borders: HashMap<BorderStyle, u32>,

    new_xfs: Vec<(Style, XfParts)>,
    new_fonts: Interned<FontStyle>,
    new_fills: Interned<FillStyle>,
    new_borders: Interned<BorderStyle>,
    new_formats: Interned<String>,
    first_custom_format: u32,
}

impl<'a> StyleAppender<'a> {
    pub(crate) fn new(base: &'a StylesPart) -> Self {
        let first_custom_format = base
            .numfmts
            .keys()
            .map(|id| id + 1)
            .max()
            .unwrap_or(0)
            .max(NumberFormat::FIRST_CUSTOM_ID);

        Self {
            base,
            xfs: first_positions(&base.cell_xfs),
            fonts: first_positions(&base.fonts),
            fills: first_positions(&base.fills),
            borders: first_positions(&base.borders),
            new_xfs: Vec::new(),
            new_fonts: Interned::seeded([]),
            new_fills: Interned::seeded([]),
            new_borders: Interned::seeded([]),
            new_formats: Interned::seeded([]),
            first_custom_format,
        }
    }

    /// `s` for a cell that was written with `original` and now looks like `style`
    pub(crate) fn xf_for(&mut self, style: &Style, original: Option<u32>) -> u32 {
        if let Some(xf) = original.filter(|&xf| self.base.cell_style(xf) == *style) {
            return xf;
        }
        if *style == Style::default() {
            return 0;
        }
        if let Some(&xf) = self.xfs.get(style) {
            return xf;
        }

        let parts = XfParts {
            num_fmt: self.num_fmt_id(&style.number_format),
            font: self.fonts.get(&style.font).copied().unwrap_or_else(|| {
                self.base.fonts.len() as u32 + self.new_fonts.id(&style.font)
            }),
            fill: self.fills.get(&style.fill).copied().unwrap_or_else(|| {
                self.base.fills.len() as u32 + self.new_fills.id(&style.fill)
            }),
            border: self.borders.get(&style.border).copied().unwrap_or_else(|| {
                self.base.borders.len() as u32 + self.new_borders.id(&style.border)
            }),
        };
        let xf = (self.base.cell_xfs.len() + self.new_xfs.len()) as u32;
        self.new_xfs.push((style.clone(), parts));
        self.xfs.insert(style.clone(), xf);
        xf
    }

    fn num_fmt_id(&mut self, format: &NumberFormat) -> u32 {
        match format {
            NumberFormat::General => 0,
            NumberFormat::BuiltIn(id) => *id,
            NumberFormat::Custom(code) => {
                let existing = self
                    .base
                    .numfmts
                    .iter()
                    .filter(|(_, known)| *known == code)
                    .map(|(id, _)| *id)
                    .min();
                existing.unwrap_or_else(|| self.first_custom_format + self.new_formats.id(code))
            }
        }
    }

    /// `true` when the part needs no new entries
    pub(crate) fn is_unchanged(&self) -> bool {
        self.new_xfs.is_empty()
    }

    /// The children to append to each list, with the list's final count
    fn additions(&self) -> HashMap<&'static [u8], (usize, Vec<String>)> {
        let base = self.base;
        let formats: Vec<String> = (self.first_custom_format..)
            .zip(&self.new_formats.items)
            .map(|(id, code)| num_fmt_xml(id, code))
            .collect();
        let lists: [(&'static [u8], usize, Vec<String>); 5] = [
            (b"numFmts", base.numfmts.len(), formats),
            (b"fonts", base.fonts.len(), self.new_fonts.items.iter().map(font_xml).collect()),
            (b"fills", base.fills.len(), self.new_fills.items.iter().map(fill_xml).collect()),
            (
                b"borders",
                base.borders.len(),
                self.new_borders.items.iter().map(border_xml).collect(),
            ),
            (
                b"cellXfs",
                base.cell_xfs.len(),
                self.new_xfs.iter().map(|(style, parts)| xf_xml(style, *parts)).collect(),
            ),
        ];
        lists
            .into_iter()
            .filter(|(_, _, added)| !added.is_empty())
            .map(|(tag, count, added)| (tag, (count + added.len(), added)))
            .collect()
    }

    /// Copy `source` with the new entries appended and the list counts updated.
    ///
    /// A missing `<numFmts>` is created in front of `<fonts>`; any other list
    /// that needs entries but is absent makes the part unpatchable.
    pub(crate) fn rewrite(&self, source: &[u8]) -> XlsxResult<Vec<u8>> {
        let additions = self.additions();
        let mut written: HashSet<&[u8]> = HashSet::new();

        let mut reader = Reader::from_reader(source);
        reader.trim_text(false);
        let mut writer = Writer::new(Vec::with_capacity(source.len() + 1024));
        let mut depth = 0usize;

        loop {
            let event = reader.read_event()?;
            match &event {
                // Lists are direct children of <styleSheet>
                Event::Start(e) | Event::Empty(e) if depth == 1 => {
                    let tag = e.local_name();
                    let is_empty = matches!(event, Event::Empty(_));
                    if tag.as_ref() == b"fonts" && !written.contains(&b"numFmts"[..]) {
                        if let Some((count, added)) = additions.get(&b"numFmts"[..]) {
                            let list = format!(
                                "<numFmts count=\"{}\">{}</numFmts>",
                                count,
                                added.concat()
                            );
                            writer.get_mut().write_all(list.as_bytes())?;
                            written.insert(b"numFmts");
                        }
                    }

                    match additions.get_key_value(tag.as_ref()) {
                        Some((&key, (count, added))) => {
                            let start = with_attribute(e, "count", Some(&count.to_string()));
                            writer.write_event(Event::Start(start))?;
                            if is_empty {
                                writer.get_mut().write_all(added.concat().as_bytes())?;
                                writer.write_event(Event::End(BytesEnd::new(
                                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                                )))?;
                            } else {
                                depth += 1;
                            }
                            written.insert(key);
                        }
                        None => {
                            writer.write_event(event.borrow())?;
                            if !is_empty {
                                depth += 1;
                            }
                        }
                    }
                }
                Event::Start(_) => {
                    depth += 1;
                    writer.write_event(event.borrow())?;
                }
                Event::End(e) => {
                    if depth == 2 {
                        if let Some((_, added)) = additions.get(e.local_name().as_ref()) {
                            writer.get_mut().write_all(added.concat().as_bytes())?;
                        }
                    }
                    depth = depth.saturating_sub(1);
                    writer.write_event(event.borrow())?;
                }
                Event::Eof => break,
                _ => writer.write_event(event.borrow())?,
            }
        }

        if let Some(missing) = additions.keys().find(|tag| !written.contains(*tag)) {
            return Err(XlsxError::InvalidFormat(format!(
                "styles part has no <{}> list",
                String::from_utf8_lossy(missing)
            )));
        }
        Ok(writer.into_inner())
    }
}
