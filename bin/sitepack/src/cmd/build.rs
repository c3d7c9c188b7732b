//! Build command - compiles the site into registry source

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

/// Run the build command.
///
/// The output file is only written once the whole pipeline has succeeded.
pub fn run(site: &Path, config: Option<&Path>, output: &Path) -> Result<()> {
    tracing::info!(?site, ?config, ?output, "Starting build");

    let registry = super::compile(site, config)?;
    registry
        .write_to(output)
        .wrap_err("Failed to write registry source")?;

    let stats = &registry.stats;
    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Entries:    {}", stats.entries);
    println!("  Artifacts:  {}", stats.artifacts);
    println!("  Raw:        {} bytes", stats.raw_bytes);
    println!("  Compressed: {} bytes", stats.compressed_bytes);
    println!();
    println!("  Duration:   {}ms", stats.duration_ms);
    println!("  Output:     {}", output.display());
    println!();

    Ok(())
}
