//! Style interning

use ahash::AHashMap;

use super::Style;

/// Unique styles of a worksheet, addressed by index.
///
/// Index 0 always holds [`Style::default`]. Inserting a style that is
/// already present returns the existing index, so colorizing thousands of
/// cells with one rule adds a single entry.
#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    lookup: AHashMap<Style, u32>,
}

impl StylePool {
    pub fn new() -> Self {
        let default = Style::default();
        let mut lookup = AHashMap::new();
        lookup.insert(default.clone(), 0);
        Self {
            styles: vec![default],
            lookup,
        }
    }

    /// Index of `style`, adding it when unseen
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&index) = self.lookup.get(&style) {
            return index;
        }
        let index = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.lookup.insert(style, index);
        index
    }

    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of styles, the default one included
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// `true` when only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() == 1
    }

    /// `(index, style)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        (0u32..).zip(&self.styles)
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}
