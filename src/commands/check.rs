//! Check command implementation.

use std::io::Write;

use crate::commands::CommandContext;
use crate::commands::confirm::Confirm;
use crate::commands::report::write_diff;
use crate::diff::{DiffResult, diff};
use crate::error::{Result, TidemarkError};

/// Question asked before the baseline is replaced.
const UPDATE_QUESTION: &str = "Update snapshot with current state?";

/// How `check` decides whether to replace the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Replace the baseline without asking
    pub assume_yes: bool,
    /// Never touch the store, not even to move a corrupt baseline aside
    pub no_update: bool,
}

/// Result of a `check` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// There was no usable baseline; the current state became the baseline.
    BaselineEstablished {
        /// Number of files captured
        files: usize,
        /// Whether the baseline was written (false with `--no-update`)
        saved: bool,
    },
    /// The current state was compared against the baseline.
    Compared {
        /// What changed
        diff: DiffResult,
        /// Whether the baseline was replaced with the current state
        updated: bool,
    },
}

/// Executes the check command.
///
/// Loads the baseline and scans the tree. Without a baseline the scan is
/// saved as the first one and nothing is reported. Otherwise the three
/// change lists are written to `out` and, if anything changed, `confirm`
/// decides whether the scan replaces the baseline.
///
/// # Errors
///
/// Returns an error if the root is unavailable, the baseline was produced
/// with different fingerprint settings, or the store cannot be read or
/// written.
pub fn check(
    ctx: &CommandContext,
    options: &CheckOptions,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<CheckOutcome> {
    let log = ctx.log();

    let stored = ctx.load_baseline(!options.no_update)?;
    ctx.ensure_comparable(&stored)?;

    let current = ctx.scan_current()?;

    if stored.is_empty() {
        log.info("No snapshot found. Saving first-time snapshot...");
        let saved = !options.no_update;
        if saved {
            ctx.store().save(&current)?;
            log.info(format!(
                "Baseline saved: {} files in {}",
                current.len(),
                ctx.store().path().display()
            ));
        } else {
            log.info("Not saving the baseline (--no-update)");
        }
        return Ok(CheckOutcome::BaselineEstablished {
            files: current.len(),
            saved,
        });
    }

    let changes = diff(&stored, &current);
    write_diff(out, &changes).map_err(TidemarkError::ConsoleError)?;

    if changes.is_empty() {
        log.verbose(1, "No changes since the baseline");
        return Ok(CheckOutcome::Compared {
            diff: changes,
            updated: false,
        });
    }

    let accepted = if options.no_update {
        false
    } else if options.assume_yes {
        true
    } else {
        confirm.confirm(UPDATE_QUESTION)?
    };

    if accepted {
        ctx.store().save(&current)?;
        log.info("Snapshot updated.");
    } else {
        log.info("Snapshot left unchanged.");
    }

    Ok(CheckOutcome::Compared {
        diff: changes,
        updated: accepted,
    })
}
