//! Status command implementation.

use std::io::Write;

use crate::commands::CommandContext;
use crate::commands::report::write_diff;
use crate::diff::{DiffResult, diff};
use crate::error::{Result, TidemarkError};

/// Executes the status command.
///
/// Compares the tree against the baseline and writes the change lists to
/// `out`. Never prompts and never writes to the store; an unparsable
/// baseline is an error here rather than being moved aside. Without a
/// baseline every file is reported as new.
pub fn status(ctx: &CommandContext, out: &mut dyn Write) -> Result<DiffResult> {
    let stored = ctx.store().load()?;
    ctx.ensure_comparable(&stored)?;

    if stored.is_empty() {
        ctx.log().warn(format!(
            "No baseline at {}; run 'tidemark check' or 'tidemark baseline' to record one",
            ctx.store().path().display()
        ));
    }

    let current = ctx.scan_current()?;
    let changes = diff(&stored, &current);
    write_diff(out, &changes).map_err(TidemarkError::ConsoleError)?;

    Ok(changes)
}
