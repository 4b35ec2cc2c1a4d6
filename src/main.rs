//! # tidemark CLI
//!
//! Checks a directory tree against a stored baseline and reports modified,
//! deleted, and new files.
//!
//! ## Commands
//!
//! - **check** (default): compare against the baseline, then offer to update
//!   it; the first run records the baseline
//! - **baseline**: record the current state without comparing
//! - **status**: compare without prompting or writing
//! - **reset**: remove the baseline
//!
//! ## Quick Start
//!
//! ```bash
//! # First run records the baseline
//! tidemark --root /media/usb --snapshot usb.json
//!
//! # Later runs report changes and ask before updating
//! tidemark --root /media/usb --snapshot usb.json
//!
//! # In scripts: fail when anything changed
//! tidemark --root /media/usb --snapshot usb.json status --exit-code
//! ```
//!
//! ## Environment Variables
//!
//! - `TIDEMARK_ROOT`: Directory to scan (default: .)
//! - `TIDEMARK_SNAPSHOT`: Baseline file (default: snapshot.json)
//! - `TIDEMARK_ALGORITHM`, `TIDEMARK_MAX_HASH_BYTES`: Fingerprint settings
//! - `TIDEMARK_JOBS`: Parallel hashing limit
//! - `TIDEMARK_EXCLUDE`: Comma-separated exclusion regexes
//! - `TIDEMARK_VERBOSE`: Enable verbose output
//! - `TIDEMARK_QUIET`: Silence all output except errors and reports

use std::io::IsTerminal;

use tidemark::cli::Cli;

fn main() -> miette::Result<()> {
    // Install miette's fancy panic and error report handler
    miette::set_panic_hook();

    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Use a simpler handler for non-TTY environments (CI, logs, etc.)
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    let outcome = tidemark::commands::execute(&cli)?;

    if outcome.exit_with_failure() {
        std::process::exit(1);
    }

    Ok(())
}
