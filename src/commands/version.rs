//! Command: print version information.
use std::io::Write as _;

use anyhow::Result;

/// Print the niri-mcp version to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> Result<()> {
    writeln!(std::io::stdout().lock(), "niri-mcp {}", crate::version())?;
    Ok(())
}
