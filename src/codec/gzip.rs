//! Gzip + base64 byte codec.
//!
//! This is the only codec that touches raw bytes. Text is UTF-8 encoded,
//! gzip-compressed and base64-encoded (standard alphabet, padded).
//!
//! Decoding is tolerant of copy/paste damage: whitespace and any character
//! outside the base64 alphabet are stripped before decoding, and padding is
//! optional.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD as BASE64};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use super::registry::ByteCodec;
use super::Algorithm;
use crate::error::{Result, SqzError};

/// Deflate level used by the JVM `GZIPOutputStream` default
const DEFAULT_LEVEL: u32 = 6;

/// Standard alphabet decoder that accepts missing or present padding
const TOLERANT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Gzip codec
#[derive(Debug, Clone)]
pub struct GzipCodec {
    /// Compression level (0-9)
    pub level: u32,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }
}

impl GzipCodec {
    /// Create new gzip codec with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create codec with custom level
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// Compress text to base64-encoded gzip.
    ///
    /// Empty input maps to empty output.
    pub fn compress(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let compressed = self.compress_bytes(text.as_bytes())?;
        Ok(BASE64.encode(compressed))
    }

    /// Decompress base64-encoded gzip back to text.
    ///
    /// Empty (or whitespace-only) input maps to empty output.
    pub fn decompress(&self, encoded: &str) -> Result<String> {
        if encoded.trim().is_empty() {
            return Ok(String::new());
        }
        let compressed = decode_base64(encoded)?;
        let bytes = self.decompress_bytes(&compressed)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Check whether `text` is a payload this codec can decode.
    ///
    /// True only if the cleaned text base64-decodes and the gzip stream
    /// yields at least one byte. A hint, not a guarantee.
    pub fn is_likely_compressed(&self, text: &str) -> bool {
        let cleaned = clean_base64(text);
        if cleaned.is_empty() {
            return false;
        }

        let Ok(bytes) = TOLERANT_BASE64.decode(cleaned) else {
            return false;
        };

        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut first = [0u8; 1];
        matches!(decoder.read(&mut first), Ok(n) if n > 0)
    }

    /// Decompress a payload that may carry an extra zlib layer under gzip.
    ///
    /// Used by the legacy ultra-compact v1 reader.
    pub fn decompress_layered(&self, compressed: &[u8]) -> Result<String> {
        match self.decompress_bytes(compressed) {
            Ok(bytes) => Ok(String::from_utf8(bytes)?),
            Err(first) => {
                tracing::debug!("gzip decode failed ({first}), retrying as zlib-wrapped gzip");
                let mut inflated = Vec::new();
                ZlibDecoder::new(compressed)
                    .read_to_end(&mut inflated)
                    .map_err(|e| SqzError::Codec(format!("not gzip or zlib-wrapped gzip: {e}")))?;
                let bytes = self.decompress_bytes(&inflated)?;
                Ok(String::from_utf8(bytes)?)
            },
        }
    }
}

impl ByteCodec for GzipCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Gzip
    }

    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| SqzError::Codec(e.to_string()))?;
        encoder.finish().map_err(|e| SqzError::Codec(e.to_string()))
    }

    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| SqzError::Codec(e.to_string()))?;
        Ok(decompressed)
    }
}

/// Strip whitespace and every character outside the standard base64 alphabet
pub fn clean_base64(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect()
}

/// Clean and decode a base64 payload
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let cleaned = clean_base64(text);
    if cleaned.is_empty() {
        return Err(SqzError::Format(
            "no base64 content in payload".to_string(),
        ));
    }
    Ok(TOLERANT_BASE64.decode(cleaned)?)
}

/// Encode bytes with the standard padded alphabet
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}
