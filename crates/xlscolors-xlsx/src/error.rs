//! Errors from reading and writing `.xlsx` packages

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Not a zip archive, or a damaged one
    #[error("not a valid zip archive")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed XML")]
    Xml(#[from] quick_xml::Error),

    /// The package is readable but is not a workbook we understand
    #[error("unsupported workbook: {0}")]
    InvalidFormat(String),

    /// A part the workbook cannot do without, e.g. `xl/workbook.xml`
    #[error("package has no {0}")]
    MissingPart(String),

    /// An attribute or cell value that does not parse
    #[error("bad value: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] xlscolors_core::Error),
}
