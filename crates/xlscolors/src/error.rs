//! Error types for xlscolors

use std::path::PathBuf;

use thiserror::Error;
use xlscolors_xlsx::XlsxError;

use crate::stylesheet::ConfigError;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a colorizing run
#[derive(Debug, Error)]
pub enum Error {
    /// The stylesheet file could not be read
    #[error("Could not read stylesheet {}", .path.display())]
    StylesheetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stylesheet file is not a valid stylesheet
    #[error("Could not load stylesheet {} (check YAML syntax)", .path.display())]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// The input workbook could not be opened
    #[error("Could not open {}", .path.display())]
    WorkbookOpen {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },

    /// The colorized workbook could not be written
    #[error("Could not write to {}", .path.display())]
    WorkbookSave {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },

    /// A worksheet rejected a style change
    #[error("Could not colorize worksheet {sheet}")]
    Worksheet {
        sheet: String,
        #[source]
        source: xlscolors_core::Error,
    },
}

impl Error {
    /// The file this error concerns, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::StylesheetRead { path, .. }
            | Error::Stylesheet { path, .. }
            | Error::WorkbookOpen { path, .. }
            | Error::WorkbookSave { path, .. } => Some(path),
            Error::Worksheet { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_messages_name_the_file() {
        let err = Error::WorkbookOpen {
            path: PathBuf::from("data/report.xlsx"),
            source: XlsxError::InvalidFormat("not a zip".into()),
        };
        assert_eq!(err.to_string(), "Could not open data/report.xlsx");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("unsupported workbook: not a zip")
        );
        assert_eq!(err.path(), Some(std::path::Path::new("data/report.xlsx")));

        let err = Error::Stylesheet {
            path: PathBuf::from("report.yaml"),
            source: ConfigError::MissingKeywords,
        };
        assert_eq!(
            err.to_string(),
            "Could not load stylesheet report.yaml (check YAML syntax)"
        );
    }
}
