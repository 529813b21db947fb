//! A1-style cell references

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A cell position, 0-based (`A1` is row 0, column 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `A1` notation; `$` anchors are accepted and ignored.
    ///
    /// ```
    /// use xlscolors_core::CellAddress;
    ///
    /// assert_eq!(CellAddress::parse("C2").unwrap(), CellAddress::new(1, 2));
    /// assert_eq!(CellAddress::parse("$AB$12").unwrap(), CellAddress::new(11, 27));
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let text = reference.trim();
        let invalid = |why: &str| Error::InvalidAddress(format!("{} in '{}'", why, text));

        let unanchored = text.strip_prefix('$').unwrap_or(text);
        let split = unanchored
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(unanchored.len());
        let (letters, rest) = unanchored.split_at(split);
        if letters.is_empty() {
            return Err(invalid("no column letters"));
        }
        let digits = rest.strip_prefix('$').unwrap_or(rest);
        if digits.is_empty() {
            return Err(invalid("no row number"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("bad row number"));
        }

        let col = Self::letters_to_column(letters)?;
        let number: u32 = digits.parse().map_err(|_| invalid("bad row number"))?;
        if number == 0 {
            return Err(invalid("row 0"));
        }
        if number > MAX_ROWS {
            return Err(Error::RowOutOfBounds {
                row: number - 1,
                max: MAX_ROWS - 1,
            });
        }

        Ok(Self::new(number - 1, col))
    }

    /// `0` -> `A`, `25` -> `Z`, `26` -> `AA`
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::new();
        let mut n = u32::from(col) + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// `A` -> `0`, case-insensitive
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut number: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "'{}' is not a column letter",
                    c
                )));
            }
            number = number * 26 + u32::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
            if number > u32::from(MAX_COLS) {
                return Err(Error::ColumnOutOfBounds {
                    col: u16::MAX,
                    max: MAX_COLS - 1,
                });
            }
        }
        Ok((number - 1) as u16)
    }

    /// `A1` form of this address
    pub fn to_a1_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangle of cells; `start` is always the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Range spanning two corners given in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Parse `A1:C3`; a lone `B2` is a single-cell range
    pub fn parse(reference: &str) -> Result<Self> {
        let (first, second) = match reference.trim().split_once(':') {
            Some((first, second)) => (first, second),
            None => (reference, reference),
        };
        Ok(Self::new(CellAddress::parse(first)?, CellAddress::parse(second)?))
    }

    /// `true` when the two rectangles share at least one cell
    pub fn overlaps(&self, other: &CellRange) -> bool {
        let rows = self.start.row <= other.end.row && other.start.row <= self.end.row;
        let cols = self.start.col <= other.end.col && other.start.col <= self.end.col;
        rows && cols
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if self.start != self.end {
            write!(f, ":{}", self.end)?;
        }
        Ok(())
    }
}
