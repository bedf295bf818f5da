//! Neuro JSON envelope: metadata-rich body for LLM consumption.
//!
//! ```text
//! // SqText JSON Compressed Format v1.0
//! // For LLM: Base64+GZIP compressed data in JSON
//! {
//!   "metadata": {
//!     "format": "sqz",
//!     "version": "1.0",
//!     "compressed": true,
//!     "algorithm": "GZIP",
//!     "depth": 1,
//!     "original_length": 11,
//!     "compressed_length": 44,
//!     "timestamp": 1760659200000
//!   },
//!   "data": "H4sI..."
//! }
//! ```

use crate::codec::record::{find_str, find_u64, Layout, Record};
use crate::codec::recursive::{RecursiveCompressor, RecursiveOutput};
use crate::codec::registry::CodecRegistry;
use crate::codec::{Algorithm, CodecWarning};
use crate::error::{Result, SqzError};

/// First comment line
pub const NEURO_TITLE: &str = "// SqText JSON Compressed Format v1.0";

/// Second comment line
pub const NEURO_HINT: &str = "// For LLM: Base64+GZIP compressed data in JSON";

/// Format tag in the metadata
pub const NEURO_FORMAT: &str = "sqz";

/// Envelope version
pub const NEURO_VERSION: &str = "1.0";

/// Algorithm label for multi-layer payloads
pub const RECURSIVE_LABEL: &str = "RECURSIVE_GZIP";

/// Recursive label written by older SqText builds
pub const LEGACY_RECURSIVE_LABEL: &str = "Рекурсивный GZIP";

/// Envelope metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuroMetadata {
    /// Algorithm label (`GZIP`, `ZSTD`, `BROTLI` or [`RECURSIVE_LABEL`])
    pub algorithm: String,
    /// Codec layers in `data`
    pub depth: u32,
    /// Input length in characters
    pub original_length: usize,
    /// Payload length in characters
    pub compressed_length: usize,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

/// Neuro JSON envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuroEnvelope {
    /// Metadata section
    pub metadata: NeuroMetadata,
    /// Base64 payload
    pub data: String,
}

/// Is `label` one of the recursive labels?
pub fn is_recursive_label(label: &str) -> bool {
    label == RECURSIVE_LABEL || label == LEGACY_RECURSIVE_LABEL
}

impl NeuroEnvelope {
    /// Compress `text`.
    ///
    /// `depth > 1` runs the recursive compressor and records the layers it
    /// kept; otherwise `algorithm` is compressed once through the registry.
    pub fn encode(
        registry: &CodecRegistry,
        text: &str,
        algorithm: Algorithm,
        depth: u32,
        timestamp: i64,
    ) -> Result<(Self, Vec<CodecWarning>)> {
        if depth > 1 {
            let out = RecursiveCompressor::new(registry.clone()).compress(text, depth)?;
            let envelope = Self::from_recursive(text, &out, timestamp);
            return Ok((envelope, out.warnings));
        }

        let resolved = registry.resolve(algorithm);
        let data = resolved.compress(text)?;
        let envelope = Self::with_layers(text, data, algorithm.label(), 1, timestamp);
        Ok((envelope, resolved.warning.into_iter().collect()))
    }

    /// Wrap an already computed recursive compression of `text`
    pub fn from_recursive(text: &str, out: &RecursiveOutput, timestamp: i64) -> Self {
        let label = if out.layers > 1 {
            RECURSIVE_LABEL
        } else {
            Algorithm::Gzip.label()
        };
        Self::with_layers(text, out.data.clone(), label, out.layers.max(1), timestamp)
    }

    fn with_layers(text: &str, data: String, label: &str, layers: u32, timestamp: i64) -> Self {
        Self {
            metadata: NeuroMetadata {
                algorithm: label.to_string(),
                depth: layers,
                original_length: text.chars().count(),
                compressed_length: data.chars().count(),
                timestamp,
            },
            data,
        }
    }

    /// Render the comment lines and pretty body
    pub fn render(&self) -> String {
        let metadata = Record::new()
            .str("format", NEURO_FORMAT)
            .str("version", NEURO_VERSION)
            .bool("compressed", true)
            .str("algorithm", self.metadata.algorithm.as_str())
            .uint("depth", u64::from(self.metadata.depth))
            .uint("original_length", self.metadata.original_length as u64)
            .uint("compressed_length", self.metadata.compressed_length as u64)
            .int("timestamp", self.metadata.timestamp);

        let body = Record::new()
            .record("metadata", metadata)
            .str("data", self.data.as_str())
            .render(Layout::Pretty);

        format!("{NEURO_TITLE}\n{NEURO_HINT}\n{body}")
    }

    /// Parse from the first `{`.
    ///
    /// `data` is required. Each metadata field is looked up on its own:
    /// `algorithm` defaults to `GZIP`, `depth` to 1, the rest to 0.
    pub fn parse(text: &str) -> Result<Self> {
        let start = text
            .find('{')
            .ok_or_else(|| SqzError::Format("No JSON body in neuro envelope".to_string()))?;
        let body = &text[start..];

        let data = find_str(body, "data")?
            .ok_or_else(|| SqzError::Format("No \"data\" in neuro envelope".to_string()))?;
        let algorithm = find_str(body, "algorithm")?.unwrap_or_else(|| Algorithm::Gzip.label().to_string());
        let depth = find_u64(body, "depth")?.unwrap_or(1);
        let original_length = find_u64(body, "original_length")?.unwrap_or(0);
        let compressed_length = find_u64(body, "compressed_length")?.unwrap_or(0);
        let timestamp = find_u64(body, "timestamp")?.unwrap_or(0);

        Ok(Self {
            metadata: NeuroMetadata {
                algorithm,
                depth: u32::try_from(depth).unwrap_or(u32::MAX),
                original_length: original_length as usize,
                compressed_length: compressed_length as usize,
                timestamp: i64::try_from(timestamp).unwrap_or(i64::MAX),
            },
            data,
        })
    }

    /// Recursive labels peel exactly `depth` layers; any other label is a
    /// single pass with that algorithm's codec (unknown labels mean GZIP).
    pub fn decode(&self, registry: &CodecRegistry) -> Result<String> {
        if is_recursive_label(&self.metadata.algorithm) {
            return RecursiveCompressor::new(registry.clone()).decompress(&self.data, self.metadata.depth);
        }

        let algorithm = Algorithm::from_name(&self.metadata.algorithm).unwrap_or(Algorithm::Gzip);
        registry.resolve(algorithm).decompress(&self.data)
    }
}
