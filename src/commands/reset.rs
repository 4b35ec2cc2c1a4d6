//! Reset command implementation.

use crate::commands::CommandContext;
use crate::error::Result;

/// Executes the reset command (remove the baseline file).
///
/// Returns whether there was a baseline to remove.
pub fn reset(ctx: &CommandContext) -> Result<bool> {
    let path = ctx.store().path();
    ctx.log()
        .verbose(1, format!("Removing baseline at {}", path.display()));

    let existed = path.exists();
    ctx.store().clear()?;

    if existed {
        ctx.log().info("Baseline removed; the next check starts fresh");
    } else {
        ctx.log().verbose(1, "No baseline to remove");
    }

    Ok(existed)
}
