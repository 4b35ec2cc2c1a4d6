//! Baseline command implementation.

use crate::commands::CommandContext;
use crate::error::Result;

/// Executes the baseline command.
///
/// Scans the tree and saves the result as the baseline, replacing whatever
/// was stored. Returns the number of files recorded.
pub fn baseline(ctx: &CommandContext) -> Result<usize> {
    let current = ctx.scan_current()?;
    ctx.store().save(&current)?;

    ctx.log().info(format!(
        "Baseline saved: {} files in {}",
        current.len(),
        ctx.store().path().display()
    ));

    Ok(current.len())
}
