//! Command: list the registered tools.
use std::io::Write;

use anyhow::Result;

use crate::tools::Registry;

/// Write one `name  description` line per tool.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_list(registry: &Registry, out: &mut impl Write) -> Result<()> {
    let width = registry
        .tools()
        .iter()
        .map(|t| t.name().len())
        .max()
        .unwrap_or(0);
    for tool in registry.tools() {
        writeln!(out, "{:<width$}  {}", tool.name(), tool.description())?;
    }
    Ok(())
}

/// Run the tools command.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> Result<()> {
    write_list(&Registry::new(), &mut std::io::stdout().lock())
}
