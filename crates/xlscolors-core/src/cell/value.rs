//! Cell values
//!
//! A [`CellValue`] is what a cell holds. Its [`Display`](fmt::Display) form
//! is the text keyword rules are matched against.

use std::fmt;
use std::sync::Arc;

/// The value held by a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value; the cell may still carry a style
    #[default]
    Empty,
    /// TRUE or FALSE
    Boolean(bool),
    /// Any number, dates included (as serial numbers)
    Number(f64),
    /// Text
    String(SharedString),
    /// An error code such as `#N/A`
    Error(CellError),
    /// A formula and the result last computed for it, when the file had one
    Formula {
        /// Formula source, starting with `=`
        text: String,
        /// Cached result
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// Text value
    pub fn string<S: AsRef<str>>(text: S) -> Self {
        CellValue::String(SharedString::new(text))
    }

    /// Formula value with no cached result
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
        }
    }

    /// `true` for [`CellValue::Empty`] only
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// `true` when the cell shows nothing: no value or an empty string,
    /// held directly or as a formula's cached result.
    ///
    /// Zero and FALSE are not blank, nor is a formula with no cached result.
    pub fn is_blank(&self) -> bool {
        match self.resolved() {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// `true` for formulas
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// The number held directly or as a formula's cached result
    pub fn as_number(&self) -> Option<f64> {
        match self.resolved() {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The formula source, for formula cells
    pub fn formula_text(&self) -> Option<&str> {
        if let CellValue::Formula { text, .. } = self {
            Some(text)
        } else {
            None
        }
    }

    /// The cached result for formulas, the value itself otherwise
    fn resolved(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(cached),
                ..
            } => cached.resolved(),
            other => other,
        }
    }
}

/// Writes the text the cell displays.
///
/// Whole numbers have no fractional part (`42`, not `42.0`). A formula
/// without a cached result shows its source.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolved() {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s.as_str()),
            CellValue::Error(e) => f.write_str(e.as_str()),
            CellValue::Formula { text, .. } => f.write_str(text),
        }
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::string(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::string(value)
    }
}

impl From<CellError> for CellValue {
    fn from(value: CellError) -> Self {
        CellValue::Error(value)
    }
}

/// Spreadsheet error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
    GettingData,
    Spill,
    Calc,
}

impl CellError {
    const CODES: [(CellError, &'static str); 10] = [
        (CellError::Null, "#NULL!"),
        (CellError::Div0, "#DIV/0!"),
        (CellError::Value, "#VALUE!"),
        (CellError::Ref, "#REF!"),
        (CellError::Name, "#NAME?"),
        (CellError::Num, "#NUM!"),
        (CellError::Na, "#N/A"),
        (CellError::GettingData, "#GETTING_DATA"),
        (CellError::Spill, "#SPILL!"),
        (CellError::Calc, "#CALC!"),
    ];

    /// The code as written in a cell, e.g. `#DIV/0!`
    pub fn as_str(&self) -> &'static str {
        Self::CODES
            .iter()
            .find(|(error, _)| error == self)
            .map(|(_, code)| *code)
            .unwrap_or("#VALUE!")
    }

    /// Look up an error code, ignoring case
    pub fn parse(code: &str) -> Option<Self> {
        Self::CODES
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(code))
            .map(|(error, _)| *error)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable text shared between cells.
///
/// Every cell that references the same shared-strings entry of a workbook
/// points at one allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Wrap a string
    pub fn new<S: AsRef<str>>(text: S) -> Self {
        SharedString(Arc::from(text.as_ref()))
    }

    /// The text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(text: &str) -> Self {
        SharedString::new(text)
    }
}

impl From<String> for SharedString {
    fn from(text: String) -> Self {
        SharedString::new(text)
    }
}
