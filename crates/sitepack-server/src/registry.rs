//! Runtime asset registry.
//!
//! Built once from the embedded `(key, payload)` table before the server
//! accepts connections and never mutated afterwards, so request handlers
//! share it without locking.

use std::collections::HashMap;

use axum::body::Bytes;
use headers::ETag;
use http::HeaderValue;
use sitepack_core::codec::{self, CodecError};
use thiserror::Error;
use tracing::{debug, info};

use crate::content_type;

/// Registry loading errors. All of them abort startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Payload is not valid base64 or gzip.
    #[error("corrupt payload for {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// Key appears twice in the table.
    #[error("duplicate asset key: {0}")]
    DuplicateKey(String),

    /// Key is not an absolute URL path.
    #[error("asset key must start with '/': {0:?}")]
    RelativeKey(String),

    /// A derived header value is not representable.
    #[error("invalid header value for {key}: {message}")]
    Header { key: String, message: String },
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// One servable representation of an asset.
#[derive(Debug, Clone, Copy)]
pub struct Representation<'a> {
    /// Response body.
    pub body: &'a Bytes,

    /// Validator for exactly these bytes.
    pub etag: &'a ETag,

    /// `Content-Encoding` of the body, if any.
    pub encoding: Option<&'static str>,
}

/// A loaded registry entry.
#[derive(Debug, Clone)]
pub struct Asset {
    compressed: Bytes,
    raw: Bytes,
    content_type: HeaderValue,
    gzip_etag: ETag,
    etag: ETag,
}

impl Asset {
    fn load(key: &str, payload: &str) -> Result<Self> {
        let decoded = codec::decode_payload(payload).map_err(|source| RegistryError::Decode {
            key: key.to_string(),
            source,
        })?;

        let content_type = content_type::content_type(key, &decoded.raw);
        let header = |value: &str| RegistryError::Header {
            key: key.to_string(),
            message: value.to_string(),
        };

        let gzip_etag = codec::validator_token(&decoded.compressed);
        let etag = codec::validator_token(&decoded.raw);

        Ok(Self {
            content_type: HeaderValue::from_str(&content_type).map_err(|_| header(&content_type))?,
            gzip_etag: gzip_etag.parse().map_err(|_| header(&gzip_etag))?,
            etag: etag.parse().map_err(|_| header(&etag))?,
            compressed: Bytes::from(decoded.compressed),
            raw: Bytes::from(decoded.raw),
        })
    }

    /// Gzip stream as stored in the registry.
    pub fn compressed(&self) -> &Bytes {
        &self.compressed
    }

    /// Decompressed artifact bytes.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// `Content-Type` for both representations.
    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }

    /// The representation to serve, gzip or identity.
    pub fn representation(&self, gzip: bool) -> Representation<'_> {
        if gzip {
            Representation {
                body: &self.compressed,
                etag: &self.gzip_etag,
                encoding: Some("gzip"),
            }
        } else {
            Representation {
                body: &self.raw,
                etag: &self.etag,
                encoding: None,
            }
        }
    }
}

/// Immutable map from URL path to asset.
#[derive(Debug, Default)]
pub struct Registry {
    assets: HashMap<String, Asset>,
}

impl Registry {
    /// Decode every entry of an embedded table.
    pub fn load(table: &[(&str, &str)]) -> Result<Self> {
        let mut assets = HashMap::with_capacity(table.len());

        for &(key, payload) in table {
            if !key.starts_with('/') {
                return Err(RegistryError::RelativeKey(key.to_string()));
            }
            let asset = Asset::load(key, payload)?;
            debug!(
                key,
                content_type = ?asset.content_type,
                raw = asset.raw.len(),
                compressed = asset.compressed.len(),
                "loaded asset"
            );
            if assets.insert(key.to_string(), asset).is_some() {
                return Err(RegistryError::DuplicateKey(key.to_string()));
            }
        }

        info!(assets = assets.len(), "registry loaded");
        Ok(Self { assets })
    }

    /// Asset registered under exactly `path`.
    pub fn get(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the registry holds no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Registered paths, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.assets.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
