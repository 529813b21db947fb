//! Cell borders
//!
//! Keyword rules never touch borders; they are modelled so a restyled cell
//! keeps the edges it was read with.

use super::Color;

/// The four edges and the diagonal of a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
    pub diagonal: Option<BorderEdge>,
    pub diagonal_direction: DiagonalDirection,
}

impl BorderStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same line on the four outer edges
    pub fn outline(line: BorderLineStyle, color: Color) -> Self {
        let edge = Some(BorderEdge::new(line, color));
        Self {
            left: edge.clone(),
            right: edge.clone(),
            top: edge.clone(),
            bottom: edge,
            ..Self::default()
        }
    }

    pub fn with_bottom(mut self, line: BorderLineStyle, color: Color) -> Self {
        self.bottom = Some(BorderEdge::new(line, color));
        self
    }

    /// No edge drawn at all
    pub fn is_empty(&self) -> bool {
        [
            &self.left,
            &self.right,
            &self.top,
            &self.bottom,
            &self.diagonal,
        ]
        .iter()
        .all(|edge| edge.is_none())
    }
}

/// One drawn edge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    pub line: BorderLineStyle,
    pub color: Color,
}

impl BorderEdge {
    pub fn new(line: BorderLineStyle, color: Color) -> Self {
        Self { line, color }
    }
}

/// `style` attribute of a border edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderLineStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderLineStyle {
    const NAMES: [(BorderLineStyle, &'static str); 13] = [
        (BorderLineStyle::Thin, "thin"),
        (BorderLineStyle::Medium, "medium"),
        (BorderLineStyle::Thick, "thick"),
        (BorderLineStyle::Dashed, "dashed"),
        (BorderLineStyle::Dotted, "dotted"),
        (BorderLineStyle::Double, "double"),
        (BorderLineStyle::Hair, "hair"),
        (BorderLineStyle::MediumDashed, "mediumDashed"),
        (BorderLineStyle::DashDot, "dashDot"),
        (BorderLineStyle::MediumDashDot, "mediumDashDot"),
        (BorderLineStyle::DashDotDot, "dashDotDot"),
        (BorderLineStyle::MediumDashDotDot, "mediumDashDotDot"),
        (BorderLineStyle::SlantDashDot, "slantDashDot"),
    ];

    pub fn xlsx_name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(line, _)| line == self)
            .map(|(_, name)| *name)
            .unwrap_or("thin")
    }

    /// `None` for `none` and unknown values, i.e. no edge
    pub fn from_xlsx(s: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(line, _)| *line)
    }
}

/// Which diagonals the `diagonal` edge is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagonalDirection {
    #[default]
    None,
    /// Top-left to bottom-right
    Down,
    /// Bottom-left to top-right
    Up,
    Both,
}

impl DiagonalDirection {
    pub fn from_flags(down: bool, up: bool) -> Self {
        match (down, up) {
            (false, false) => DiagonalDirection::None,
            (true, false) => DiagonalDirection::Down,
            (false, true) => DiagonalDirection::Up,
            (true, true) => DiagonalDirection::Both,
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self, DiagonalDirection::Down | DiagonalDirection::Both)
    }

    pub fn is_up(&self) -> bool {
        matches!(self, DiagonalDirection::Up | DiagonalDirection::Both)
    }
}
