//! xlscolors CLI - colorize Excel workbooks from a YAML stylesheet

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use xlscolors::{ColorizeJob, Colorizer, ColorizerConfig, DEFAULT_STYLESHEET};

#[derive(Parser)]
#[command(name = "xlscolors")]
#[command(author, version, about = "Colorize Excel workbooks")]
struct Cli {
    /// Workbook to colorize
    #[arg(value_name = "filename.xlsx")]
    infile: PathBuf,

    /// Save colorized output to file (default: overwrite input file)
    #[arg(long, value_name = "filename.xlsx")]
    outfile: Option<PathBuf>,

    /// Stylesheet file in YAML format (default: <infile>.yaml, then xlscolors.yaml)
    #[arg(long, value_name = "filename.yaml")]
    stylesheet: Option<PathBuf>,

    /// Print additional information to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for cause in err.chain() {
                log::error!("[!] {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Ctrl-C prints a blank line and exits with status 1
    ctrlc::set_handler(|| {
        println!();
        std::process::exit(1);
    })
    .context("Could not install the interrupt handler")?;

    let colorizer = Colorizer::new(ColorizerConfig {
        default_stylesheet: PathBuf::from(DEFAULT_STYLESHEET),
    });

    let mut job = ColorizeJob::new(cli.infile);
    job.outfile = cli.outfile;
    job.stylesheet = cli.stylesheet;

    let stats = colorizer.run(&job)?;
    log::debug!(
        "[+] {} worksheet(s): {} header cell(s), {} matched cell(s), {} cell(s) styled",
        stats.sheets,
        stats.header_cells,
        stats.matched_cells,
        stats.styled_cells
    );

    Ok(())
}
