//! Compression format engine.
//!
//! Turns text into one of several self-describing representations and
//! back, deciding from the text alone which decoder applies.
//!
//! # Formats
//!
//! | Format              | Example                                  |
//! |---------------------|------------------------------------------|
//! | [`RawCodec`]        | `H4sIAAAAAAAA...`                        |
//! | [`UltraCompactV1`]  | `{"d":"H4sI..."}` (decode-only)          |
//! | [`UltraCompactV2`]  | `{"a":"gzip","d":"H4sI..."}`             |
//! | [`NeuroJson`]       | `// SqText JSON ...` + metadata + data   |
//! | [`ChatEnvelope`]    | `// ===== SQText COMPRESSED DATA =====`  |
//!
//! # Algorithms
//!
//! Only GZIP has a codec. ZSTD and BROTLI are recorded in envelopes (the
//! selector picks them for longer texts) but resolve to the GZIP codec
//! through the [`CodecRegistry`], with a [`CodecWarning`] on the result.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqtext::codec::{CompressionEngine, FormatTag};
//!
//! let engine = CompressionEngine::new();
//! let result = engine.compress("hello world", FormatTag::UltraCompactV2, None, 1)?;
//! assert!(result.data.starts_with(r#"{"a":"gzip","d":""#));
//!
//! // Decompress (auto-detects the format)
//! let original = engine.decompress(&result.data)?;
//! ```
//!
//! [`RawCodec`]: FormatTag::RawCodec
//! [`UltraCompactV1`]: FormatTag::UltraCompactV1
//! [`UltraCompactV2`]: FormatTag::UltraCompactV2
//! [`NeuroJson`]: FormatTag::NeuroJson
//! [`ChatEnvelope`]: FormatTag::ChatEnvelope

mod algorithm;
mod detect;
mod engine;
pub mod envelope;
mod gzip;
pub mod record;
mod recursive;
mod registry;

pub use algorithm::{Algorithm, CodecWarning, CompressionResult, GZIP_MAX_CHARS, ZSTD_MAX_CHARS};
pub use detect::{detect_format, is_chat_envelope, is_neuro_json, ultra_compact_version, FormatTag};
pub use engine::CompressionEngine;
pub use envelope::{ChatEnvelope, CompressedPayload, Envelope, NeuroEnvelope, UltraCompactV1, UltraCompactV2};
pub use gzip::{clean_base64, GzipCodec};
pub use recursive::{
    clamp_depth, step_algorithm, RecursionStep, RecursionTrace, RecursiveCompressor,
    RecursiveOutput, MAX_DEPTH,
};
pub use registry::{ByteCodec, CodecRegistry, Resolved};

/// Check if content is a bare gzip+base64 payload
pub fn is_likely_compressed(content: &str) -> bool {
    GzipCodec::new().is_likely_compressed(content)
}
