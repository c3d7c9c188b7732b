//! Static files and fixed pages.
//!
//! Static files are published byte for byte under their path relative to the
//! static directory. Fixed pages are templates expanded with the site context
//! and published at `/<stem>/`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::assemble::Artifact;

/// Asset collection errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Path that cannot be turned into a URL path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Template source of one fixed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPage {
    /// Registry key, `/<stem>/`.
    pub key: String,

    /// Template text.
    pub source: String,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Every non-hidden file under `dir`, sorted by path, keyed by its relative path.
///
/// A missing directory yields no artifacts.
pub fn collect_static(dir: &Path) -> Result<Vec<Artifact>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no static directory, skipping");
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(dir)
            .map_err(|_| AssetError::InvalidPath(path.to_path_buf()))?;
        let segments = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| AssetError::InvalidPath(path.to_path_buf()))?;
        let key = format!("/{}", segments.join("/"));

        debug!(src = %path.display(), key = %key, "collected static file");
        artifacts.push(Artifact::new(key, read(path)?));
    }

    info!(count = artifacts.len(), "static files collected");
    Ok(artifacts)
}

/// Every `*.html` file directly inside `dir`, sorted by name.
///
/// A missing directory yields no pages.
pub fn collect_pages(dir: &Path) -> Result<Vec<FixedPage>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no pages directory, skipping");
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let is_page = entry.file_type().is_file()
            && !is_hidden(path)
            && path.extension().is_some_and(|ext| ext == "html");
        if !is_page {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| AssetError::InvalidPath(path.to_path_buf()))?;
        let source = String::from_utf8(read(path)?).map_err(|e| AssetError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        pages.push(FixedPage {
            key: format!("/{stem}/"),
            source,
        });
    }

    info!(count = pages.len(), "fixed pages collected");
    Ok(pages)
}
