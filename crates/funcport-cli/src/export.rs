//! Export command implementation for the funcport CLI.
//!
//! Writes the function descriptor for a notebook.

use std::path::Path;
use std::time::Instant;

use funcport_export::{ExportConfig, default_descriptor_path, export_notebook, write_descriptor};

use crate::colors;

/// Execute the export command.
pub fn execute(
    notebook_path: &Path,
    output_path: Option<&Path>,
    to_stdout: bool,
    mut config: ExportConfig,
) -> anyhow::Result<()> {
    if config.handler_path().is_none() && !notebook_path.exists() {
        anyhow::bail!("Notebook not found: {}", notebook_path.display());
    }

    if config.name.is_none() {
        if let Some(stem) = notebook_path.file_stem() {
            config.name = Some(stem.to_string_lossy().into_owned());
        }
    }

    let start = Instant::now();
    let export = export_notebook(notebook_path, &config)?;

    if to_stdout {
        print!("{}", export.yaml);
        return Ok(());
    }

    let descriptor_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_descriptor_path(notebook_path));
    write_descriptor(&export, &descriptor_path)?;

    println!(
        "\n{}funcport Export{} - {}{}{}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        export.descriptor.metadata.name,
        colors::RESET
    );
    println!("{}", "─".repeat(50));
    println!(
        "  handler  {}",
        export.descriptor.spec.handler.as_deref().unwrap_or_default()
    );
    match &config.code_target_path {
        Some(target) => println!("  source   {}", target.display()),
        None => println!(
            "  source   {}embedded, {} lines{}",
            colors::DIM,
            export.code.lines().count(),
            colors::RESET
        ),
    }

    let elapsed = start.elapsed();
    println!(
        "\n{}✓{} Wrote {} ({:.2}ms)",
        colors::GREEN,
        colors::RESET,
        descriptor_path.display(),
        elapsed.as_secs_f64() * 1000.0
    );

    Ok(())
}
