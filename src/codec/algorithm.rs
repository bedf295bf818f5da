//! Compression algorithm tags, selection heuristic and results.

use serde::{Deserialize, Serialize};

use super::{FormatTag, RecursionTrace};

/// Texts shorter than this (in characters) select GZIP.
pub const GZIP_MAX_CHARS: usize = 1000;

/// Texts shorter than this (in characters) select ZSTD, longer ones BROTLI.
pub const ZSTD_MAX_CHARS: usize = 10_000;

/// Named compression strategies.
///
/// Only [`Algorithm::Gzip`] has a codec registered by default. The other
/// tags are recorded in envelopes but resolve to the GZIP codec, see
/// [`CodecRegistry`](super::CodecRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Gzip (deflate with header)
    #[default]
    Gzip,
    /// Zstandard (declared, degrades to gzip)
    Zstd,
    /// Brotli (declared, degrades to gzip)
    Brotli,
}

impl Algorithm {
    /// Wire name used by the ultra-compact `"a"` key
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Gzip => "gzip",
            Algorithm::Zstd => "zstd",
            Algorithm::Brotli => "brotli",
        }
    }

    /// Upper-case label used in neuro metadata
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Gzip => "GZIP",
            Algorithm::Zstd => "ZSTD",
            Algorithm::Brotli => "BROTLI",
        }
    }

    /// Base64 prefix that identifies a payload produced by this algorithm.
    ///
    /// Every gzip stream starts with `1f 8b 08`, which base64-encodes to `H4sI`.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Algorithm::Gzip => Some("H4s"),
            Algorithm::Zstd | Algorithm::Brotli => None,
        }
    }

    /// Parse a wire name or label (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// All algorithm tags in declaration order
    pub fn all() -> &'static [Algorithm] {
        &[Algorithm::Gzip, Algorithm::Zstd, Algorithm::Brotli]
    }

    /// Pick an algorithm from the character count of `text`.
    ///
    /// `< 1000` selects GZIP, `< 10000` ZSTD, anything longer BROTLI.
    pub fn select_best(text: &str) -> Self {
        let length = text.chars().count();

        if length < GZIP_MAX_CHARS {
            Algorithm::Gzip
        } else if length < ZSTD_MAX_CHARS {
            Algorithm::Zstd
        } else {
            Algorithm::Brotli
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = crate::error::SqzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            crate::error::SqzError::Config(format!(
                "Unknown algorithm: {s}. Use: gzip, zstd, brotli"
            ))
        })
    }
}

/// Non-fatal signals attached to a [`CompressionResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecWarning {
    /// The requested algorithm has no registered codec and was served by
    /// `fallback` instead.
    UnsupportedAlgorithm {
        /// Algorithm the caller (or the selector) asked for
        requested: Algorithm,
        /// Algorithm whose codec actually produced the bytes
        fallback: Algorithm,
    },
}

impl std::fmt::Display for CodecWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecWarning::UnsupportedAlgorithm {
                requested,
                fallback,
            } => write!(f, "{requested} is not available, compressed with {fallback}"),
        }
    }
}

/// Result of a top-level compression
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// Encoded output (envelope or raw codec string)
    pub data: String,
    /// Format the output was encoded as
    pub format: FormatTag,
    /// Algorithm recorded in the output
    pub algorithm: Algorithm,
    /// Algorithm whose codec produced the bytes
    pub effective_algorithm: Algorithm,
    /// Number of codec layers in the payload
    pub layers: u32,
    /// Original size in bytes
    pub original_bytes: usize,
    /// Output size in bytes
    pub compressed_bytes: usize,
    /// Degradation signals
    pub warnings: Vec<CodecWarning>,
    /// Recursion steps (empty for single-pass formats)
    pub trace: RecursionTrace,
}

impl CompressionResult {
    /// Create new compression result
    pub fn new(data: String, format: FormatTag, algorithm: Algorithm, original_bytes: usize) -> Self {
        let compressed_bytes = data.len();
        Self {
            data,
            format,
            algorithm,
            effective_algorithm: algorithm,
            layers: 1,
            original_bytes,
            compressed_bytes,
            warnings: Vec::new(),
            trace: RecursionTrace::default(),
        }
    }

    /// Set the layer count
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Attach the recursion steps that produced the payload
    pub fn with_trace(mut self, trace: RecursionTrace) -> Self {
        self.trace = trace;
        self
    }

    /// Attach warnings and derive the effective algorithm from them
    pub fn with_warnings(mut self, warnings: Vec<CodecWarning>) -> Self {
        for warning in &warnings {
            let CodecWarning::UnsupportedAlgorithm { fallback, .. } = warning;
            self.effective_algorithm = *fallback;
        }
        self.warnings = warnings;
        self
    }

    /// Calculate byte compression ratio (original / compressed)
    pub fn byte_ratio(&self) -> f64 {
        if self.compressed_bytes == 0 {
            0.0
        } else {
            self.original_bytes as f64 / self.compressed_bytes as f64
        }
    }

    /// Percentage of bytes saved (negative when the output grew)
    pub fn savings_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            0.0
        } else {
            (self.original_bytes as f64 - self.compressed_bytes as f64)
                / self.original_bytes as f64
                * 100.0
        }
    }

    /// Check if compression was beneficial
    pub fn is_beneficial(&self) -> bool {
        self.compressed_bytes < self.original_bytes
    }

    /// True when the recorded algorithm was served by a fallback codec
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}
