//! Registry encoding.
//!
//! Compresses artifacts into registry payloads and emits the registry as a
//! Rust source file the server embeds at compile time.

use std::collections::HashSet;

use sitepack_core::codec;
use thiserror::Error;
use tracing::debug;

use crate::assemble::Artifact;

/// Width of one base64 line in the generated source.
const LINE_WIDTH: usize = 72;

/// Encoding errors.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Compression failed.
    #[error("cannot compress {key}: {source}")]
    Compress {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Two artifacts claim the same registry key.
    #[error("duplicate registry key: {0}")]
    DuplicateKey(String),

    /// Registry key is not an absolute URL path.
    #[error("registry key must start with '/': {0:?}")]
    RelativeKey(String),
}

/// Result type for encoding operations.
pub type Result<T> = std::result::Result<T, EncodeError>;

/// One encoded registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    /// Registry key.
    pub key: String,

    /// Base64 of the gzip stream.
    pub payload: String,

    /// Artifact size before compression.
    pub raw_len: usize,

    /// Size of the gzip stream.
    pub compressed_len: usize,
}

/// Accumulates encoded artifacts in insertion order.
#[derive(Debug, Default)]
pub struct RegistryEncoder {
    assets: Vec<EncodedAsset>,
    keys: HashSet<String>,
}

impl RegistryEncoder {
    /// Create an empty encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and append one artifact.
    pub fn push(&mut self, artifact: Artifact) -> Result<()> {
        let Artifact { key, bytes } = artifact;

        if !key.starts_with('/') {
            return Err(EncodeError::RelativeKey(key));
        }
        if self.keys.contains(&key) {
            return Err(EncodeError::DuplicateKey(key));
        }

        let compressed = codec::compress(&bytes).map_err(|source| EncodeError::Compress {
            key: key.clone(),
            source,
        })?;

        debug!(
            key = %key,
            raw = bytes.len(),
            compressed = compressed.len(),
            "encoded artifact"
        );

        self.keys.insert(key.clone());
        self.assets.push(EncodedAsset {
            key,
            payload: codec::encode_base64(&compressed),
            raw_len: bytes.len(),
            compressed_len: compressed.len(),
        });
        Ok(())
    }

    /// Encode and append several artifacts.
    pub fn extend(&mut self, artifacts: impl IntoIterator<Item = Artifact>) -> Result<()> {
        artifacts.into_iter().try_for_each(|a| self.push(a))
    }

    /// Finish encoding.
    #[must_use]
    pub fn finish(self) -> Vec<EncodedAsset> {
        self.assets
    }
}

/// Render encoded assets as the generated registry source.
pub fn render_source(assets: &[EncodedAsset]) -> String {
    let mut out = String::from("// @generated by sitepack. Do not edit.\n\n");
    out.push_str("pub static ASSETS: &[(&str, &str)] = &[\n");

    for asset in assets {
        // Debug formatting of a str is a valid Rust string literal.
        out.push_str(&format!("    (\n        {:?},\n        concat!(\n", asset.key));
        let mut rest = asset.payload.as_str();
        while !rest.is_empty() {
            // base64 is ASCII, any index is a char boundary.
            let (line, tail) = rest.split_at(rest.len().min(LINE_WIDTH));
            out.push_str(&format!("            \"{line}\",\n"));
            rest = tail;
        }
        out.push_str("        ),\n    ),\n");
    }

    out.push_str("];\n");
    out
}
