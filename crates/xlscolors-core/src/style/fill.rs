//! Cell backgrounds

use super::Color;

/// How a cell's background is painted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    #[default]
    None,

    /// One flat color; what keyword rules produce
    Solid { color: Color },

    /// Two-color pattern, kept as read from the file
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl FillStyle {
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FillStyle::None)
    }
}

/// `patternType` values of `<patternFill>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternType {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl PatternType {
    const NAMES: [(PatternType, &'static str); 19] = [
        (PatternType::None, "none"),
        (PatternType::Solid, "solid"),
        (PatternType::MediumGray, "mediumGray"),
        (PatternType::DarkGray, "darkGray"),
        (PatternType::LightGray, "lightGray"),
        (PatternType::DarkHorizontal, "darkHorizontal"),
        (PatternType::DarkVertical, "darkVertical"),
        (PatternType::DarkDown, "darkDown"),
        (PatternType::DarkUp, "darkUp"),
        (PatternType::DarkGrid, "darkGrid"),
        (PatternType::DarkTrellis, "darkTrellis"),
        (PatternType::LightHorizontal, "lightHorizontal"),
        (PatternType::LightVertical, "lightVertical"),
        (PatternType::LightDown, "lightDown"),
        (PatternType::LightUp, "lightUp"),
        (PatternType::LightGrid, "lightGrid"),
        (PatternType::LightTrellis, "lightTrellis"),
        (PatternType::Gray125, "gray125"),
        (PatternType::Gray0625, "gray0625"),
    ];

    /// OOXML `patternType` attribute value
    pub fn xlsx_name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(p, _)| p == self)
            .map(|(_, name)| *name)
            .unwrap_or("none")
    }

    /// Parse an OOXML `patternType` attribute value
    pub fn from_xlsx(s: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(p, _)| *p)
    }
}
