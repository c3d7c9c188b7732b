//! Command implementations.

pub mod build;
pub mod check;

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use sitepack_compiler::{CompiledRegistry, Compiler};
use sitepack_core::Config;

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "sitepack.toml";

/// Resolve the config path, defaulting to `<site>/sitepack.toml`.
pub fn config_path(site: &Path, config: Option<&Path>) -> PathBuf {
    config.map_or_else(|| site.join(DEFAULT_CONFIG), Path::to_path_buf)
}

/// Load configuration and run the whole pipeline in memory.
pub(crate) fn compile(site: &Path, config: Option<&Path>) -> Result<CompiledRegistry> {
    let path = config_path(site, config);
    let config = Config::load_with_env(&path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!(?config, "Loaded configuration");

    Compiler::new(config, site).compile().wrap_err("Build failed")
}
