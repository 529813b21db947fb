//! Number formats

/// How a cell's value is rendered (dates, percentages, currency).
///
/// Read from the file and written back as-is; colorizing never changes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    #[default]
    General,
    /// One of the predefined ids below 164, e.g. 14 for a short date
    BuiltIn(u32),
    /// A format code such as `0.0%`
    Custom(String),
}

impl NumberFormat {
    /// Custom formats are numbered from here when written
    pub const FIRST_CUSTOM_ID: u32 = 164;
}
