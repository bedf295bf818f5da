//! # SqText - Text Compression Formats
//!
//! Compresses text into self-describing textual representations that can be
//! pasted into chats, stored in JSON, or handed to an LLM, and turns any of
//! them back into the original text without being told which one it got.
//!
//! ## Formats
//!
//! | Format           | Shape                                         | Notes                    |
//! |------------------|-----------------------------------------------|--------------------------|
//! | Raw codec        | `H4sIAAAAAAAA...`                             | bare base64, recursive   |
//! | Ultra-compact v1 | `{"d":"..."}`                                 | decode-only              |
//! | Ultra-compact v2 | `{"a":"gzip","d":"..."}`                      | default                  |
//! | Neuro JSON       | two `//` lines, `metadata` object, `data`     | recursive, timestamped   |
//! | Chat envelope    | instruction banner, flat body with `data`     | GZIP only                |
//!
//! Detection order is fixed: chat, neuro, ultra-compact (v2 before v1),
//! raw codec, then envelope-shaped text is `Unknown` and everything else is
//! `Plain`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sqtext::{CompressionEngine, FormatTag};
//!
//! let engine = CompressionEngine::new();
//! let text = "The quick brown fox jumps over the lazy dog";
//!
//! let result = engine.compress(text, FormatTag::NeuroJson, None, 3).unwrap();
//! println!("{} layers, ratio {:.2}", result.layers, result.byte_ratio());
//!
//! // Decompress (auto-detects the format)
//! assert_eq!(engine.decompress(&result.data).unwrap(), text);
//! ```
//!
//! ### Algorithm Selection
//!
//! Texts under 1000 characters get GZIP, under 10000 ZSTD, otherwise BROTLI.
//! Only GZIP is implemented; the others are written into envelopes but
//! compressed with GZIP, and the result carries a [`CodecWarning`].
//!
//! ## Modules
//!
//! - [`codec`]: Formats, detection, recursion and the engine
//! - [`history`]: Optional operation history
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod codec;
pub mod config;
pub mod error;
pub mod history;

// Re-exports for convenience
pub use codec::{
    Algorithm, CodecRegistry, CodecWarning, CompressionEngine, CompressionResult, FormatTag,
    RecursionTrace, RecursiveOutput,
};
pub use config::Config;
pub use error::{ErrorKind, Result, SqzError};
pub use history::{MemoryHistory, OperationKind, OperationRecorder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compress `text` with a default engine
pub fn compress(
    text: &str,
    format: FormatTag,
    algorithm: Option<Algorithm>,
    depth: u32,
) -> Result<CompressionResult> {
    CompressionEngine::new().compress(text, format, algorithm, depth)
}

/// Decompress any supported representation with a default engine
pub fn decompress(text: &str) -> Result<String> {
    CompressionEngine::new().decompress(text)
}

/// Classify `text`
pub fn detect_format(text: &str) -> FormatTag {
    codec::detect_format(text)
}

/// Check if content is a bare gzip+base64 payload
pub fn is_likely_compressed(content: &str) -> bool {
    codec::is_likely_compressed(content)
}
