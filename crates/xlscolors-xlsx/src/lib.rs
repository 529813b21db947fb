//! # xlscolors-xlsx
//!
//! XLSX (Office Open XML) reader and writer for the xlscolors workbook model.
//!
//! Reading keeps cell values, cached formula results, fonts, fills, borders,
//! alignment, number formats, column widths, row heights and merged regions.
//! [`XlsxWriter`] produces a fresh package from that model;
//! [`XlsxPackage`] saves edits back into the package they were read from,
//! keeping every part the model does not cover.

pub mod error;
pub mod package;
pub mod reader;
pub mod writer;

mod escape;
mod styles;

pub use error::{XlsxError, XlsxResult};
pub use package::XlsxPackage;
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
