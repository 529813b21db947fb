//! Stderr logger
//!
//! Prints the bare message of every record from the xlscolors crates, the
//! way the tool's `[+]`/`[!]` progress lines are meant to be read.

use std::io::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && metadata.target().starts_with("xlscolors")
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(io::stderr().lock(), "{}", record.args());
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Install the logger; `Debug` shows progress, `Info` only the outcome
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
