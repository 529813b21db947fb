//! Workbook colorizing
//!
//! [`Colorizer`] ties the pieces together: it picks the stylesheet for an
//! input file, loads it once, walks every worksheet and writes the workbook
//! back in a single save at the end. The save patches the original package,
//! so charts, themes, comments and other content the model does not cover
//! come through unchanged, and it replaces the output file only once the
//! new one is complete.
//!
//! # Example
//!
//! ```rust,no_run
//! use xlscolors::{ColorizeJob, Colorizer, ColorizerConfig};
//!
//! let colorizer = Colorizer::new(ColorizerConfig::default());
//! let job = ColorizeJob::new("report.xlsx").with_outfile("report-colored.xlsx");
//! let stats = colorizer.run(&job).unwrap();
//! println!("{} cells matched", stats.matched_cells);
//! ```

use std::path::{Path, PathBuf};

use xlscolors_core::Workbook;
use xlscolors_xlsx::XlsxPackage;

use crate::error::{Error, Result};
use crate::stylesheet::Stylesheet;
use crate::walker::{walk_worksheet, SheetStats};

/// Stylesheet used when no explicit or per-workbook stylesheet exists
pub const DEFAULT_STYLESHEET: &str = "xlscolors.yaml";

/// Extensions replaced by `.yaml` when deriving a workbook's stylesheet
const WORKBOOK_EXTENSIONS: [&str; 3] = ["xls", "xlsx", "xlsm"];

/// Settings shared by every run of a [`Colorizer`]
#[derive(Debug, Clone)]
pub struct ColorizerConfig {
    /// Fallback stylesheet path
    pub default_stylesheet: PathBuf,
}

impl Default for ColorizerConfig {
    fn default() -> Self {
        Self {
            default_stylesheet: PathBuf::from(DEFAULT_STYLESHEET),
        }
    }
}

/// One input workbook to colorize
#[derive(Debug, Clone)]
pub struct ColorizeJob {
    /// Workbook to read
    pub infile: PathBuf,
    /// Where to write the result (default: overwrite `infile`)
    pub outfile: Option<PathBuf>,
    /// Explicit stylesheet, bypassing resolution
    pub stylesheet: Option<PathBuf>,
}

impl ColorizeJob {
    /// Create a job that colorizes a workbook in place
    pub fn new<P: Into<PathBuf>>(infile: P) -> Self {
        Self {
            infile: infile.into(),
            outfile: None,
            stylesheet: None,
        }
    }

    /// Write the result to another file
    pub fn with_outfile<P: Into<PathBuf>>(mut self, outfile: P) -> Self {
        self.outfile = Some(outfile.into());
        self
    }

    /// Use this stylesheet instead of resolving one
    pub fn with_stylesheet<P: Into<PathBuf>>(mut self, stylesheet: P) -> Self {
        self.stylesheet = Some(stylesheet.into());
        self
    }

    /// The file the result is written to
    pub fn output_path(&self) -> &Path {
        self.outfile.as_deref().unwrap_or(&self.infile)
    }
}

/// Totals for a colorizing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorizeStats {
    /// Worksheets walked
    pub sheets: usize,
    /// Cells given the header style
    pub header_cells: usize,
    /// Cells whose text selected a rule
    pub matched_cells: usize,
    /// Cells restyled by rule matches
    pub styled_cells: usize,
}

impl ColorizeStats {
    fn add_sheet(&mut self, sheet: SheetStats) {
        self.sheets += 1;
        self.header_cells += sheet.header_cells;
        self.matched_cells += sheet.matched_cells;
        self.styled_cells += sheet.styled_cells;
    }
}

/// Colorizes workbooks from YAML stylesheets
#[derive(Debug, Clone, Default)]
pub struct Colorizer {
    config: ColorizerConfig,
}

impl Colorizer {
    /// Create a colorizer
    pub fn new(config: ColorizerConfig) -> Self {
        Self { config }
    }

    /// The colorizer's configuration
    pub fn config(&self) -> &ColorizerConfig {
        &self.config
    }

    /// Pick the stylesheet for a workbook.
    ///
    /// An explicit path always wins. Otherwise `report.xlsx` uses
    /// `report.yaml` when that file exists, and the configured default
    /// stylesheet when it does not.
    pub fn resolve_stylesheet(&self, infile: &Path, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        let sibling = sibling_stylesheet(infile);
        if sibling.is_file() {
            sibling
        } else {
            log::debug!(
                "[+] No stylesheet at {}, using {}",
                sibling.display(),
                self.config.default_stylesheet.display()
            );
            self.config.default_stylesheet.clone()
        }
    }

    /// Colorize one workbook file
    pub fn run(&self, job: &ColorizeJob) -> Result<ColorizeStats> {
        let stylesheet_path = self.resolve_stylesheet(&job.infile, job.stylesheet.as_deref());
        log::debug!("[+] Loading stylesheet from {}", stylesheet_path.display());
        let stylesheet = Stylesheet::load(&stylesheet_path)?;

        let mut package = XlsxPackage::open(&job.infile).map_err(|source| Error::WorkbookOpen {
            path: job.infile.clone(),
            source,
        })?;

        log::debug!(
            "[+] Starting colorizing process for {}...",
            job.infile.display()
        );
        let stats = colorize_workbook(package.workbook_mut(), &stylesheet)?;

        let outfile = job.output_path();
        package.save(outfile).map_err(|source| Error::WorkbookSave {
            path: outfile.to_path_buf(),
            source,
        })?;
        log::debug!("[+] Done writing to {}", outfile.display());

        Ok(stats)
    }
}

/// Colorize every worksheet of an open workbook, in document order
pub fn colorize_workbook(workbook: &mut Workbook, stylesheet: &Stylesheet) -> Result<ColorizeStats> {
    let mut stats = ColorizeStats::default();

    for sheet in workbook.worksheets_mut() {
        log::debug!("[+] Colorizing worksheet {}", sheet.name());
        let sheet_stats = walk_worksheet(sheet, stylesheet).map_err(|source| Error::Worksheet {
            sheet: sheet.name().to_string(),
            source,
        })?;
        stats.add_sheet(sheet_stats);
    }

    Ok(stats)
}

/// `data/report.xlsx` -> `data/report.yaml`; unknown extensions keep theirs
fn sibling_stylesheet(infile: &Path) -> PathBuf {
    let is_workbook = infile
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);

    if is_workbook {
        infile.with_extension("yaml")
    } else {
        let mut name = infile.as_os_str().to_os_string();
        name.push(".yaml");
        PathBuf::from(name)
    }
}
