//! Registry wire codec.
//!
//! Payloads cross the build/runtime boundary as base64 text wrapping a gzip
//! stream. The compiler encodes, the server decodes; both sides compute
//! validator tokens with [`validator_token`].

use std::io::{self, Read, Write};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Payload decoding errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text form is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The compressed form is not a valid gzip stream.
    #[error("invalid gzip payload: {0}")]
    Gzip(#[from] io::Error),
}

/// Both representations of a decoded registry payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// The gzip stream as stored in the registry.
    pub compressed: Vec<u8>,

    /// The original artifact bytes.
    pub raw: Vec<u8>,
}

/// Gzip `raw` at the best compression level.
///
/// The gzip header carries no file name and a zero mtime, so identical
/// input always yields identical output.
pub fn compress(raw: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(raw)?;
    encoder.finish()
}

/// Inflate a gzip stream.
pub fn decompress(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(compressed);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(raw)
}

/// Base64 text form of an already compressed payload.
pub fn encode_base64(compressed: &[u8]) -> String {
    STANDARD.encode(compressed)
}

/// Compress and base64-encode artifact bytes into their registry form.
pub fn encode_payload(raw: &[u8]) -> io::Result<String> {
    Ok(encode_base64(&compress(raw)?))
}

/// Reverse [`encode_payload`], keeping the compressed bytes around.
pub fn decode_payload(encoded: &str) -> Result<DecodedPayload, CodecError> {
    let compressed = STANDARD.decode(encoded)?;
    let raw = decompress(&compressed)?;
    Ok(DecodedPayload { compressed, raw })
}

/// Strong validator token: quoted base64 SHA-256 of `bytes`.
pub fn validator_token(bytes: &[u8]) -> String {
    format!("\"{}\"", STANDARD.encode(Sha256::digest(bytes)))
}
