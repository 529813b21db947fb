//! Workbooks

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

const FORBIDDEN_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Worksheets in tab order
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// A workbook with a single empty `Sheet1`
    pub fn new() -> Self {
        Self {
            sheets: vec![Worksheet::default()],
        }
    }

    /// A workbook without sheets, for readers to fill
    pub fn empty() -> Self {
        Self { sheets: Vec::new() }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|sheet| sheet.name() == name)
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheets.iter()
    }

    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.sheets.iter_mut()
    }

    /// Append an empty sheet named `SheetN`, with `N` the first free number
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = (self.sheets.len() + 1..)
            .map(|n| format!("Sheet{}", n))
            .find(|name| !self.has_sheet_named(name))
            .unwrap_or_default();
        self.add_worksheet_with_name(&name)
    }

    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append `worksheet` and return its index
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        check_sheet_name(worksheet.name())?;
        if self.has_sheet_named(worksheet.name()) {
            return Err(Error::DuplicateSheetName(worksheet.name().to_string()));
        }
        self.sheets.push(worksheet);
        Ok(self.sheets.len() - 1)
    }

    /// Sheet names compare case-insensitively
    fn has_sheet_named(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.sheets
            .iter()
            .any(|sheet| sheet.name().to_lowercase() == wanted)
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

fn check_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("name is empty".into()));
    }
    let len = name.chars().count();
    if len > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "'{}' has {} characters, at most {} are allowed",
            name, len, MAX_SHEET_NAME_LEN
        )));
    }
    match name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        Some(c) => Err(Error::InvalidSheetName(format!(
            "'{}' contains '{}'",
            name, c
        ))),
        None => Ok(()),
    }
}
