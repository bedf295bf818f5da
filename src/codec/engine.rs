//! Compression engine: format dispatch and algorithm selection.
//!
//! The engine is the narrow interface the UI layer consumes:
//! `compress`, `decompress`, `detect_format` and `is_likely_compressed`.
//! It is stateless between calls and safe to share across threads.

use super::envelope::{ChatEnvelope, Envelope, NeuroEnvelope, UltraCompactV2};
use super::gzip::GzipCodec;
use super::recursive::{clamp_depth, RecursiveCompressor, RecursiveOutput, MAX_DEPTH};
use super::registry::{ByteCodec, CodecRegistry};
use super::{detect_format, Algorithm, CodecWarning, CompressionResult, FormatTag};
use crate::config::EngineConfig;
use crate::error::{Result, SqzError};

use std::sync::Arc;

/// Compression engine with format auto-detection
#[derive(Debug, Clone)]
pub struct CompressionEngine {
    /// Codec strategies by algorithm
    registry: CodecRegistry,
    /// Maximum recursion depth
    pub max_depth: u32,
}

impl Default for CompressionEngine {
    fn default() -> Self {
        Self {
            registry: CodecRegistry::new(),
            max_depth: MAX_DEPTH,
        }
    }
}

impl CompressionEngine {
    /// Create new engine with the default GZIP registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine from configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            registry: CodecRegistry::with_gzip(GzipCodec::with_level(config.gzip_level)),
            max_depth: clamp_depth(config.max_depth),
        }
    }

    /// Set maximum recursion depth (clamped to `1..=10`)
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = clamp_depth(max_depth);
        self
    }

    /// Register a real codec for an algorithm tag
    pub fn with_codec(mut self, codec: Arc<dyn ByteCodec>) -> Self {
        self.registry.register(codec);
        self
    }

    /// Codec registry in use
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    fn recursive(&self) -> RecursiveCompressor {
        RecursiveCompressor::new(self.registry.clone())
    }

    /// Pick an algorithm from the text length
    pub fn select_algorithm(&self, text: &str) -> Algorithm {
        Algorithm::select_best(text)
    }

    /// Classify `text` without decoding it
    pub fn detect_format(&self, text: &str) -> FormatTag {
        detect_format(text)
    }

    /// Hint whether `text` is a bare gzip+base64 payload
    pub fn is_likely_compressed(&self, text: &str) -> bool {
        GzipCodec::new().is_likely_compressed(text)
    }

    /// Compress `text` into `format`.
    ///
    /// `algorithm` of `None` runs the length-based selector. `depth > 1`
    /// enables recursive compression for `RawCodec` and `NeuroJson`; the
    /// other formats always hold a single layer.
    pub fn compress(
        &self,
        text: &str,
        format: FormatTag,
        algorithm: Option<Algorithm>,
        depth: u32,
    ) -> Result<CompressionResult> {
        let depth = depth.min(self.max_depth);
        let original_bytes = text.len();
        let algorithm = algorithm.unwrap_or_else(|| self.select_algorithm(text));

        let result = match format {
            FormatTag::Plain => {
                CompressionResult::new(text.to_string(), FormatTag::Plain, algorithm, original_bytes)
                    .with_layers(0)
            },
            FormatTag::RawCodec if depth > 1 => {
                let out = self.recursive().compress(text, depth)?;
                CompressionResult::new(out.data, FormatTag::RawCodec, Algorithm::Gzip, original_bytes)
                    .with_layers(out.layers)
                    .with_warnings(out.warnings)
                    .with_trace(out.trace)
            },
            FormatTag::RawCodec => {
                let resolved = self.registry.resolve(algorithm);
                let data = resolved.compress(text)?;
                CompressionResult::new(data, FormatTag::RawCodec, algorithm, original_bytes)
                    .with_warnings(resolved.warning.into_iter().collect())
            },
            FormatTag::UltraCompactV1 | FormatTag::UltraCompactV2 => {
                if format == FormatTag::UltraCompactV1 {
                    tracing::debug!("ultra-compact v1 is decode-only, writing v2");
                }
                let (envelope, warning) = UltraCompactV2::encode(&self.registry, text, algorithm)?;
                CompressionResult::new(envelope.render(), FormatTag::UltraCompactV2, algorithm, original_bytes)
                    .with_warnings(warning.into_iter().collect())
            },
            FormatTag::NeuroJson if depth > 1 => {
                let out = self.recursive().compress(text, depth)?;
                let envelope = NeuroEnvelope::from_recursive(text, &out, now_millis());
                let layers = envelope.metadata.depth;
                CompressionResult::new(envelope.render(), FormatTag::NeuroJson, Algorithm::Gzip, original_bytes)
                    .with_layers(layers)
                    .with_warnings(out.warnings)
                    .with_trace(out.trace)
            },
            FormatTag::NeuroJson => {
                let (envelope, warnings) =
                    NeuroEnvelope::encode(&self.registry, text, algorithm, depth, now_millis())?;
                CompressionResult::new(envelope.render(), FormatTag::NeuroJson, algorithm, original_bytes)
                    .with_warnings(warnings)
            },
            FormatTag::ChatEnvelope => {
                if algorithm != Algorithm::Gzip {
                    tracing::debug!("chat envelope is GZIP only, ignoring {algorithm}");
                }
                let envelope = ChatEnvelope::encode(&self.registry, text, now_millis())?;
                CompressionResult::new(envelope.render(), FormatTag::ChatEnvelope, Algorithm::Gzip, original_bytes)
            },
            FormatTag::Unknown => {
                return Err(SqzError::Format(
                    "Cannot compress to an unknown format".to_string(),
                ))
            },
        };

        for warning in &result.warnings {
            tracing::warn!("{warning}");
        }
        tracing::debug!(
            format = %result.format,
            algorithm = %result.algorithm,
            layers = result.layers,
            original = result.original_bytes,
            compressed = result.compressed_bytes,
            "compressed"
        );

        Ok(result)
    }

    /// Compress into `format` with automatic algorithm selection, one layer
    pub fn compress_auto(&self, text: &str, format: FormatTag) -> Result<CompressionResult> {
        self.compress(text, format, None, 1)
    }

    /// Decompress `text`, detecting its format first.
    ///
    /// Detection picks exactly one decode path. `Plain` and `Unknown`
    /// inputs fail with a format error; nothing else is tried. A bare
    /// `RawCodec` payload loses exactly one layer, multi-layer raw output
    /// goes through [`Self::decompress_recursive`] with its layer count.
    pub fn decompress(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let format = self.detect_format(text);
        self.decompress_as(text, format)
    }

    /// Decompress `text` as `format`, skipping detection
    pub fn decompress_as(&self, text: &str, format: FormatTag) -> Result<String> {
        tracing::debug!(format = %format, "decompressing");
        match format {
            FormatTag::Plain => Err(SqzError::Format(
                "Input is not in a recognised compressed format".to_string(),
            )),
            FormatTag::Unknown => Err(SqzError::Format(
                "Input looks like an envelope but its format is not recognised".to_string(),
            )),
            FormatTag::RawCodec => self.registry.resolve(Algorithm::Gzip).decompress(text),
            _ => Envelope::parse(format, text)?.decode(&self.registry),
        }
    }

    /// Recursive compression with the diminishing-returns stopping rule
    pub fn compress_recursive(&self, text: &str, max_depth: u32) -> Result<RecursiveOutput> {
        self.recursive().compress(text, max_depth.min(self.max_depth))
    }

    /// Peel exactly `depth` codec layers
    pub fn decompress_recursive(&self, text: &str, depth: u32) -> Result<String> {
        self.recursive().decompress(text, depth)
    }

    /// Degradations the registry would report for `algorithm`
    pub fn degradation(&self, algorithm: Algorithm) -> Option<CodecWarning> {
        self.registry.resolve(algorithm).warning
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const FORMATS: [FormatTag; 4] = [
        FormatTag::RawCodec,
        FormatTag::UltraCompactV2,
        FormatTag::NeuroJson,
        FormatTag::ChatEnvelope,
    ];

    #[test]
    fn test_roundtrip_every_format() {
        let engine = CompressionEngine::new();
        let text = "The engine must reproduce this text exactly. Ёжик в тумане.";

        for format in FORMATS {
            let result = engine.compress(text, format, None, 1).unwrap();
            assert_eq!(result.format, format);
            assert_eq!(engine.detect_format(&result.data), format);
            assert_eq!(engine.decompress(&result.data).unwrap(), text);
        }
    }

    #[test]
    fn test_scenario_hello_world_v2() {
        let engine = CompressionEngine::new();
        let result = engine
            .compress("hello world", FormatTag::UltraCompactV2, None, 1)
            .unwrap();

        assert!(result.data.starts_with(r#"{"a":"gzip","d":""#));
        assert!(result.data.ends_with(r#""}"#));
        assert_eq!(engine.decompress(&result.data).unwrap(), "hello world");
    }

    #[test]
    fn test_large_input_selects_brotli_but_decodes_as_gzip() {
        let engine = CompressionEngine::new();
        let text = "abcdefghij".repeat(5_000);
        assert_eq!(engine.select_algorithm(&text), Algorithm::Brotli);

        let result = engine.compress(&text, FormatTag::UltraCompactV2, None, 1).unwrap();
        assert_eq!(result.algorithm, Algorithm::Brotli);
        assert_eq!(result.effective_algorithm, Algorithm::Gzip);
        assert!(result.is_degraded());
        assert!(result.data.starts_with(r#"{"a":"brotli","d":""#));

        let gzip_only = GzipCodec::new().compress(&text).unwrap();
        assert!(result.data.contains(&gzip_only));
        assert_eq!(engine.decompress(&result.data).unwrap(), text);
    }

    #[test]
    fn test_v1_request_writes_v2() {
        let engine = CompressionEngine::new();
        let result = engine.compress("legacy", FormatTag::UltraCompactV1, None, 1).unwrap();
        assert_eq!(result.format, FormatTag::UltraCompactV2);
        assert_eq!(engine.decompress(&result.data).unwrap(), "legacy");
    }

    #[test]
    fn test_plain_passthrough_and_unknown_rejected() {
        let engine = CompressionEngine::new();
        let result = engine.compress("as is", FormatTag::Plain, None, 1).unwrap();
        assert_eq!(result.data, "as is");
        assert_eq!(result.layers, 0);

        let err = engine.compress("x", FormatTag::Unknown, None, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_decompress_plain_and_unknown_fail() {
        let engine = CompressionEngine::new();
        assert_eq!(engine.decompress("just words").unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(
            engine.decompress(r#"{"format": "other", "data": "H4sI"}"#).unwrap_err().kind(),
            ErrorKind::Format
        );
        assert_eq!(engine.decompress("").unwrap(), "");
    }

    #[test]
    fn test_malformed_v1_never_returns_text() {
        let engine = CompressionEngine::new();
        let err = engine.decompress(r#"{"d":"not-base64!!"}"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Format | ErrorKind::Codec));
    }

    #[test]
    fn test_raw_recursive_roundtrip() {
        let engine = CompressionEngine::new();
        let text = "recursive raw ".repeat(500);
        let result = engine.compress(&text, FormatTag::RawCodec, None, 5).unwrap();
        assert!(result.layers >= 1);
        assert_eq!(result.trace.len() as u32, (result.layers + 1).min(5));
        assert_eq!(engine.decompress_recursive(&result.data, result.layers).unwrap(), text);
    }

    #[test]
    fn test_raw_payload_of_a_payload_decodes_one_layer() {
        let engine = CompressionEngine::new();
        let inner = GzipCodec::new().compress("inner secret").unwrap();

        let result = engine.compress(&inner, FormatTag::RawCodec, None, 1).unwrap();
        assert_eq!(result.layers, 1);
        assert!(result.trace.is_empty());
        assert_eq!(engine.decompress(&result.data).unwrap(), inner);

        let v2 = engine.compress(&inner, FormatTag::UltraCompactV2, None, 1).unwrap();
        assert_eq!(engine.decompress(&v2.data).unwrap(), inner);

        let neuro = engine.compress(&inner, FormatTag::NeuroJson, None, 3).unwrap();
        assert_eq!(engine.decompress(&neuro.data).unwrap(), inner);
    }

    #[test]
    fn test_neuro_recursive_roundtrip() {
        let engine = CompressionEngine::new();
        let text = "neuro recursive ".repeat(500);
        let result = engine.compress(&text, FormatTag::NeuroJson, Some(Algorithm::Gzip), 4).unwrap();
        assert_eq!(engine.detect_format(&result.data), FormatTag::NeuroJson);
        assert_eq!(engine.decompress(&result.data).unwrap(), text);
    }

    #[test]
    fn test_chat_ignores_algorithm_hint() {
        let engine = CompressionEngine::new();
        let result = engine
            .compress("chat", FormatTag::ChatEnvelope, Some(Algorithm::Brotli), 3)
            .unwrap();
        assert_eq!(result.algorithm, Algorithm::Gzip);
        assert!(!result.is_degraded());
        assert_eq!(engine.decompress(&result.data).unwrap(), "chat");
    }

    #[test]
    fn test_decompress_as_skips_detection() {
        let engine = CompressionEngine::new();
        let raw = GzipCodec::new().compress("explicit").unwrap();
        assert_eq!(engine.decompress_as(&raw, FormatTag::RawCodec).unwrap(), "explicit");
        assert!(engine.decompress_as(&raw, FormatTag::ChatEnvelope).is_err());
    }

    #[test]
    fn test_degradation_report() {
        let engine = CompressionEngine::new();
        assert!(engine.degradation(Algorithm::Gzip).is_none());
        assert!(engine.degradation(Algorithm::Zstd).is_some());
    }
}
