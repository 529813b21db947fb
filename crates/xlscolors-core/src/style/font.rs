//! Fonts

use std::hash::{Hash, Hasher};

use super::Color;

/// Font of a cell; the default is 11pt Calibri in the automatic color
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    pub name: String,
    /// Points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    pub color: Color,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            name: String::from("Calibri"),
            size: 11.0,
            bold: false,
            italic: false,
            underline: Underline::default(),
            strikethrough: false,
            color: Color::Auto,
        }
    }
}

// Sizes are never NaN, so bitwise equality is enough for pooling.
impl Eq for FontStyle {}

impl Hash for FontStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (&self.name, self.size.to_bits(), &self.color).hash(state);
        (self.bold, self.italic, self.strikethrough, self.underline).hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl Underline {
    /// Value of the `<u val="...">` attribute, `None` when not underlined
    pub fn xlsx_name(&self) -> Option<&'static str> {
        Some(match self {
            Underline::None => return None,
            Underline::Single => "single",
            Underline::Double => "double",
            Underline::SingleAccounting => "singleAccounting",
            Underline::DoubleAccounting => "doubleAccounting",
        })
    }

    /// Inverse of [`Underline::xlsx_name`]; unknown values read as single
    pub fn from_xlsx(value: &str) -> Self {
        match value {
            "none" => Underline::None,
            "double" => Underline::Double,
            "singleAccounting" => Underline::SingleAccounting,
            "doubleAccounting" => Underline::DoubleAccounting,
            _ => Underline::Single,
        }
    }
}
