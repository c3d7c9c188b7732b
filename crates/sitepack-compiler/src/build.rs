//! Build orchestration.
//!
//! Runs the whole pipeline in a single sequential pass. Any error aborts the
//! build; nothing is written until every artifact has been encoded.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use sitepack_core::Config;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    assemble::{AssembleError, Artifact, ArtifactAssembler},
    assets::{self, AssetError},
    collector::{CollectorError, SourceCollector, SourceKind},
    encoder::{self, EncodeError, EncodedAsset, RegistryEncoder},
    render::{ContentRenderer, Entry, RenderError},
    template::{TemplateError, TemplateRegistry},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Collector error.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Template loading error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Assembly error.
    #[error("assembly error: {0}")]
    Assemble(#[from] AssembleError),

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Encoding error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of blog entries rendered.
    pub entries: usize,

    /// Number of registry entries produced.
    pub artifacts: usize,

    /// Total artifact size before compression.
    pub raw_bytes: usize,

    /// Total size of the gzip payloads.
    pub compressed_bytes: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Output of a successful build.
#[derive(Debug, Clone)]
pub struct CompiledRegistry {
    /// Encoded registry entries in publishing order.
    pub assets: Vec<EncodedAsset>,

    /// Build statistics.
    pub stats: BuildStats,
}

impl CompiledRegistry {
    /// The generated registry source.
    #[must_use]
    pub fn to_source(&self) -> String {
        encoder::render_source(&self.assets)
    }

    /// Write the generated registry source to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_source()).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "wrote registry source");
        Ok(())
    }
}

/// Site compiler that orchestrates the build process.
#[derive(Debug)]
pub struct Compiler {
    config: Config,
    site_dir: PathBuf,
}

impl Compiler {
    /// Create a new compiler for the site rooted at `site_dir`.
    #[must_use]
    pub fn new(config: Config, site_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            site_dir: site_dir.into(),
        }
    }

    fn dir(&self, relative: &str) -> PathBuf {
        self.site_dir.join(relative)
    }

    /// Execute the full build process.
    pub fn compile(&self) -> Result<CompiledRegistry> {
        let start = Instant::now();

        info!(site = %self.site_dir.display(), "starting build");

        // 1. Templates
        let mut templates = TemplateRegistry::new();
        let overrides = templates.load_dir(&self.dir(&self.config.build.templates_dir))?;
        debug!(overrides, "templates ready");

        let assembler = ArtifactAssembler::new(&self.config, &templates)?;
        let mut encoder = RegistryEncoder::new();

        // 2. Fixed pages
        for page in assets::collect_pages(&self.dir(&self.config.build.pages_dir))? {
            encoder.push(assembler.fixed_page(page.key, &page.source)?)?;
        }

        // 3. Static files
        encoder.extend(assets::collect_static(
            &self.dir(&self.config.build.static_dir),
        )?)?;

        // 4. Blog documents, newest first
        let entries = self.compile_blog(&assembler, &mut encoder)?;

        // 5. Listing, feed and homepage
        encoder.push(assembler.archive(&entries)?)?;
        encoder.push(assembler.feed(&entries)?)?;
        encoder.push(assembler.home(&entries)?)?;

        let assets = encoder.finish();
        let stats = BuildStats {
            entries: entries.len(),
            artifacts: assets.len(),
            raw_bytes: assets.iter().map(|a| a.raw_len).sum(),
            compressed_bytes: assets.iter().map(|a| a.compressed_len).sum(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            entries = stats.entries,
            artifacts = stats.artifacts,
            raw_bytes = stats.raw_bytes,
            compressed_bytes = stats.compressed_bytes,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(CompiledRegistry { assets, stats })
    }

    /// Render every post and publish its page; pass other files through.
    fn compile_blog(
        &self,
        assembler: &ArtifactAssembler<'_>,
        encoder: &mut RegistryEncoder,
    ) -> Result<Vec<Entry>> {
        let collector = SourceCollector::new(self.dir(&self.config.build.blog_dir));
        let renderer = ContentRenderer::new(self.config.paths.blog_prefix.clone());
        let mut entries = Vec::new();

        for document in collector.collect()? {
            match &document.kind {
                SourceKind::Post(post) => {
                    let entry = renderer.render(&document, post)?;
                    encoder.push(assembler.entry_page(&entry)?)?;
                    entries.push(entry);
                }
                SourceKind::Passthrough => {
                    let key = format!("{}{}", self.config.paths.blog_prefix, document.file_name);
                    debug!(key = %key, "passing file through");
                    encoder.push(Artifact::new(key, document.bytes))?;
                }
            }
        }

        Ok(entries)
    }
}
