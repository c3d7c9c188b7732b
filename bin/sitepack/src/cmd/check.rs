//! Check command - run the pipeline without writing anything

use std::path::Path;

use color_eyre::eyre::Result;

/// Run the check command.
///
/// Lists every registry key with its raw and compressed size.
pub fn run(site: &Path, config: Option<&Path>) -> Result<()> {
    tracing::info!(?site, ?config, "Checking site");

    let registry = super::compile(site, config)?;

    let width = registry
        .assets
        .iter()
        .map(|a| a.key.len())
        .max()
        .unwrap_or(0);

    println!();
    for asset in &registry.assets {
        println!(
            "  {:<width$}  {:>8}  {:>8}",
            asset.key, asset.raw_len, asset.compressed_len
        );
    }
    println!();
    println!(
        "✓ {} entries, {} artifacts",
        registry.stats.entries, registry.stats.artifacts
    );

    Ok(())
}
