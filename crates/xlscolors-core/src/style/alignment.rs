//! Text alignment

/// Placement of text inside a cell; the default is what Excel shows for an
/// unformatted cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    /// Indent level
    pub indent: u8,
    /// `textRotation` as stored: 0-90 counter-clockwise, 91-180 clockwise,
    /// 255 for stacked text
    pub rotation: u8,
    pub reading_order: ReadingOrder,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn horizontal(mut self, horizontal: HorizontalAlignment) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Text left, numbers right
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlignment {
    const NAMES: [(HorizontalAlignment, &'static str); 8] = [
        (HorizontalAlignment::General, "general"),
        (HorizontalAlignment::Left, "left"),
        (HorizontalAlignment::Center, "center"),
        (HorizontalAlignment::Right, "right"),
        (HorizontalAlignment::Fill, "fill"),
        (HorizontalAlignment::Justify, "justify"),
        (HorizontalAlignment::CenterContinuous, "centerContinuous"),
        (HorizontalAlignment::Distributed, "distributed"),
    ];

    pub fn xlsx_name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(h, _)| h == self)
            .map(|(_, name)| *name)
            .unwrap_or("general")
    }

    pub fn from_xlsx(s: &str) -> Option<Self> {
        Self::NAMES.iter().find(|(_, name)| *name == s).map(|(h, _)| *h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlignment {
    const NAMES: [(VerticalAlignment, &'static str); 5] = [
        (VerticalAlignment::Top, "top"),
        (VerticalAlignment::Center, "center"),
        (VerticalAlignment::Bottom, "bottom"),
        (VerticalAlignment::Justify, "justify"),
        (VerticalAlignment::Distributed, "distributed"),
    ];

    pub fn xlsx_name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(v, _)| v == self)
            .map(|(_, name)| *name)
            .unwrap_or("bottom")
    }

    pub fn from_xlsx(s: &str) -> Option<Self> {
        Self::NAMES.iter().find(|(_, name)| *name == s).map(|(v, _)| *v)
    }
}

/// `readingOrder`: 0, 1 or 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadingOrder {
    #[default]
    ContextDependent,
    LeftToRight,
    RightToLeft,
}

impl ReadingOrder {
    pub fn from_xlsx(value: u8) -> Self {
        match value {
            1 => ReadingOrder::LeftToRight,
            2 => ReadingOrder::RightToLeft,
            _ => ReadingOrder::ContextDependent,
        }
    }

    pub fn xlsx_value(&self) -> u8 {
        match self {
            ReadingOrder::ContextDependent => 0,
            ReadingOrder::LeftToRight => 1,
            ReadingOrder::RightToLeft => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_general_bottom() {
        let alignment = Alignment::new();
        assert_eq!(alignment.horizontal, HorizontalAlignment::General);
        assert_eq!(alignment.vertical, VerticalAlignment::Bottom);
        assert!(alignment.is_default());
        assert!(!Alignment::new().wrap(true).is_default());
    }

    #[test]
    fn test_names() {
        assert_eq!(
            HorizontalAlignment::from_xlsx("centerContinuous"),
            Some(HorizontalAlignment::CenterContinuous)
        );
        assert_eq!(HorizontalAlignment::Right.xlsx_name(), "right");
        assert_eq!(VerticalAlignment::from_xlsx("top"), Some(VerticalAlignment::Top));
        assert_eq!(VerticalAlignment::from_xlsx("middle"), None);
        assert_eq!(ReadingOrder::from_xlsx(2).xlsx_value(), 2);
    }
}
