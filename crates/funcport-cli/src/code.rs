//! Code command implementation for the funcport CLI.
//!
//! Prints the source a notebook would export, without building a descriptor.

use std::path::Path;

use funcport_export::{ExportConfig, extract_code};

/// Execute the code command.
pub fn execute(notebook_path: &Path, config: &ExportConfig) -> anyhow::Result<()> {
    if config.handler_path().is_none() && !notebook_path.exists() {
        anyhow::bail!("Notebook not found: {}", notebook_path.display());
    }

    let code = extract_code(notebook_path, config)?;
    print!("{code}");
    Ok(())
}
