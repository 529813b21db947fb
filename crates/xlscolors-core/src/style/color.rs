//! Colors

use std::fmt;
use std::hash::{Hash, Hasher};

/// A font, fill or border color.
///
/// Stylesheet colors are normally RGB/ARGB; theme and indexed colors only
/// appear when they are read from an existing workbook and are written back
/// unchanged. Text that is not a hex color is carried as [`Color::Raw`] and
/// written out verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Color {
    /// Whatever the application picks (black text, no fill)
    #[default]
    Auto,

    Rgb { r: u8, g: u8, b: u8 },

    /// Only produced for colors that are not fully opaque
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Slot of the workbook theme, lightened or darkened by `tint`
    /// (-1.0..=1.0, exactly as stored in the file)
    Theme { index: u8, tint: f64 },

    /// Entry of the legacy 64-color palette
    Indexed(u8),

    /// Color text that is not `RRGGBB`/`AARRGGBB`, kept as given
    Raw(String),
}

// Tints are parsed from finite numbers, so bitwise equality is enough.
impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Color::Auto => {}
            Color::Rgb { r, g, b } => (r, g, b).hash(state),
            Color::Argb { a, r, g, b } => (a, r, g, b).hash(state),
            Color::Theme { index, tint } => (index, tint.to_bits()).hash(state),
            Color::Indexed(i) => i.hash(state),
            Color::Raw(text) => text.hash(state),
        }
    }
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Parse `RRGGBB` or `AARRGGBB`, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Color::Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            8 => Some(Color::Argb {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// Parse a hex color, keeping any other text as [`Color::Raw`]
    pub fn from_hex_or_raw(text: &str) -> Self {
        Self::from_hex(text).unwrap_or_else(|| Color::Raw(text.to_string()))
    }

    /// `AARRGGBB` as stored in `rgb` attributes; `None` for theme, indexed
    /// and automatic colors
    pub fn to_argb_hex(&self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("FF{:02X}{:02X}{:02X}", r, g, b)),
            Color::Argb { a, r, g, b } => Some(format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b)),
            _ => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => write!(f, "#{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } if *tint == 0.0 => write!(f, "theme {}", index),
            Color::Theme { index, tint } => write!(f, "theme {} {:+}", index, tint),
            Color::Indexed(i) => write!(f, "palette {}", i),
            Color::Raw(text) => f.write_str(text),
            Color::Auto => f.write_str("auto"),
        }
    }
}
