//! Sitepack Compiler Library
//!
//! Offline half of sitepack: turns a site directory into the Rust source of
//! an asset registry that the server embeds at build time.
//!
//! # Modules
//!
//! - [`collector`] - Blog source discovery and ordering
//! - [`render`] - Markup conversion into entries
//! - [`template`] - HTML template system with variable interpolation
//! - [`assemble`] - Entry pages, archive, feed and homepage
//! - [`feed`] - RSS feed generation
//! - [`assets`] - Static files and fixed pages
//! - [`encoder`] - Compression and registry source generation
//! - [`build`] - Build orchestration

pub mod assemble;
pub mod assets;
pub mod build;
pub mod collector;
pub mod encoder;
pub mod feed;
pub mod render;
pub mod template;

pub use assemble::{Artifact, ArtifactAssembler};
pub use build::{BuildError, BuildStats, CompiledRegistry, Compiler};
pub use collector::{SourceCollector, SourceDocument, SourceKind};
pub use encoder::{EncodedAsset, RegistryEncoder};
pub use feed::FeedGenerator;
pub use render::{ContentRenderer, Entry, MarkdownConverter, MarkupConverter};
pub use template::{Template, TemplateContext, TemplateRegistry};
