//! End-to-end engine tests.
//!
//! These tests drive the public API the way a caller would: compress into
//! every format, detect, and decompress without naming the format.

use sqtext::codec::{clean_base64, GzipCodec, RecursiveCompressor};
use sqtext::{Algorithm, CodecWarning, CompressionEngine, ErrorKind, FormatTag};

const SAMPLE: &str = "Привет! SqText keeps \"quotes\", back\\slashes,\nnewlines\tand tabs 🚀";

const ENVELOPES: [FormatTag; 4] = [
    FormatTag::RawCodec,
    FormatTag::UltraCompactV2,
    FormatTag::NeuroJson,
    FormatTag::ChatEnvelope,
];

/// Every writable format decodes back to the input
#[test]
fn test_roundtrip_all_formats() {
    let engine = CompressionEngine::new();

    for format in ENVELOPES {
        let result = engine.compress(SAMPLE, format, None, 1).unwrap();
        assert_eq!(result.format, format);
        assert_eq!(engine.decompress(&result.data).unwrap(), SAMPLE, "format {format}");
    }
}

/// Detection names the format that produced the text
#[test]
fn test_detection_is_idempotent() {
    let engine = CompressionEngine::new();

    for format in ENVELOPES {
        let result = engine.compress(SAMPLE, format, None, 1).unwrap();
        assert_eq!(sqtext::detect_format(&result.data), format);
    }
}

/// "hello world" as ultra-compact v2
#[test]
fn test_hello_world_ultra_compact() {
    let result = sqtext::compress("hello world", FormatTag::UltraCompactV2, None, 1).unwrap();

    assert!(result.data.starts_with(r#"{"a":"gzip","d":""#));
    assert!(result.data.ends_with(r#""}"#));
    assert!(!result.is_degraded());
    assert_eq!(sqtext::decompress(&result.data).unwrap(), "hello world");
}

/// 50,000 characters select BROTLI but decode through GZIP
#[test]
fn test_large_input_degrades_to_gzip() {
    let engine = CompressionEngine::new();
    let text = "lorem ipsum dolor sit amet ".repeat(2000);
    assert!(text.chars().count() >= 50_000);
    assert_eq!(engine.select_algorithm(&text), Algorithm::Brotli);

    let result = engine.compress_auto(&text, FormatTag::UltraCompactV2).unwrap();
    assert!(result.data.starts_with(r#"{"a":"brotli","d":""#));
    assert_eq!(result.effective_algorithm, Algorithm::Gzip);
    assert!(result.warnings.contains(&CodecWarning::UnsupportedAlgorithm {
        requested: Algorithm::Brotli,
        fallback: Algorithm::Gzip,
    }));

    assert_eq!(engine.decompress(&result.data).unwrap(), text);
}

/// ZSTD and BROTLI payloads are byte-identical to GZIP
#[test]
fn test_degradation_is_transparent() {
    let engine = CompressionEngine::new();
    let gzip = GzipCodec::new().compress(SAMPLE).unwrap();

    for algorithm in [Algorithm::Zstd, Algorithm::Brotli] {
        let result = engine
            .compress(SAMPLE, FormatTag::RawCodec, Some(algorithm), 1)
            .unwrap();
        assert_eq!(result.data, gzip);
        assert_eq!(result.algorithm, algorithm);
        assert!(result.is_degraded());

        let v2 = engine
            .compress(SAMPLE, FormatTag::UltraCompactV2, Some(algorithm), 1)
            .unwrap();
        assert_eq!(v2.data, format!(r#"{{"a":"{}","d":"{gzip}"}}"#, algorithm.name()));
    }
}

/// Malformed payloads fail instead of returning text
#[test]
fn test_malformed_envelope_fails() {
    let engine = CompressionEngine::new();

    let err = engine.decompress(r#"{"d":"not-base64!!"}"#).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Format | ErrorKind::Codec));

    let err = engine.decompress(r#"{"a":"gzip","d":"aGVsbG8="}"#).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Format | ErrorKind::Codec));
}

/// Plain and unknown inputs are rejected
#[test]
fn test_decompress_rejects_non_compressed() {
    let engine = CompressionEngine::new();

    let err = engine.decompress("just some words").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    let err = engine.decompress(r#"{"data": 42, "other": true}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    assert_eq!(engine.decompress("   ").unwrap(), "");
}

/// Whitespace inserted into base64 does not break decoding
#[test]
fn test_tolerant_decode() {
    let engine = CompressionEngine::new();

    let raw = engine.compress(SAMPLE, FormatTag::RawCodec, None, 1).unwrap().data;
    let mangled: String = raw
        .chars()
        .enumerate()
        .flat_map(|(i, c)| if i % 7 == 6 { vec![c, '\n', ' '] } else { vec![c] })
        .collect();
    assert_eq!(clean_base64(&mangled), raw);
    assert_eq!(engine.decompress(&mangled).unwrap(), SAMPLE);

    let v2 = format!(r#"{{"a":"gzip","d":"{}"}}"#, mangled.replace('\n', "\r\n"));
    assert_eq!(engine.decompress(&v2).unwrap(), SAMPLE);
}

/// Repetitive input stops recursing after one or two steps
#[test]
fn test_recursion_stops_on_diminishing_returns() {
    let text = "A".repeat(10_000);
    let out = RecursiveCompressor::default().compress(&text, 5).unwrap();

    assert!(out.layers <= 2);
    assert!(out.trace.len() < 5);

    let accepted: Vec<_> = out.trace.steps().iter().filter(|s| s.accepted).collect();
    for step in &accepted {
        assert!(out.data.len() <= step.size_bytes);
    }

    let engine = CompressionEngine::new();
    assert_eq!(engine.decompress_recursive(&out.data, out.layers).unwrap(), text);
}

/// A gzip+base64 string is compressed like any other text
#[test]
fn test_compressed_text_survives_every_format() {
    let engine = CompressionEngine::new();
    let inner = GzipCodec::new().compress("inner secret").unwrap();
    assert!(engine.is_likely_compressed(&inner));

    for format in ENVELOPES {
        let result = engine.compress(&inner, format, None, 1).unwrap();
        assert_eq!(engine.decompress(&result.data).unwrap(), inner, "format {format}");
    }

    let recursive = engine.compress_recursive(&inner, 3).unwrap();
    assert_eq!(engine.decompress_recursive(&recursive.data, recursive.layers).unwrap(), inner);
}

/// Neuro records the number of layers it kept
#[test]
fn test_neuro_recursive_metadata() {
    let engine = CompressionEngine::new();
    let text = "recursive neuro payload ".repeat(40);

    let result = engine.compress(&text, FormatTag::NeuroJson, None, 4).unwrap();
    assert!(result.layers >= 1);
    assert!(result.data.contains(&format!("\"depth\": {}", result.layers)));
    if result.layers > 1 {
        assert!(result.data.contains("\"algorithm\": \"RECURSIVE_GZIP\""));
    }

    assert_eq!(engine.decompress(&result.data).unwrap(), text);
}

/// Legacy v1 payloads still decode; writing v1 produces v2
#[test]
fn test_ultra_compact_v1() {
    let engine = CompressionEngine::new();
    let data = GzipCodec::new().compress("legacy").unwrap();

    let v1 = format!(r#"{{"d":"{data}"}}"#);
    assert_eq!(engine.detect_format(&v1), FormatTag::UltraCompactV1);
    assert_eq!(engine.decompress(&v1).unwrap(), "legacy");

    let written = engine.compress("legacy", FormatTag::UltraCompactV1, None, 1).unwrap();
    assert_eq!(written.format, FormatTag::UltraCompactV2);
}

/// Plain passthrough and unknown target
#[test]
fn test_compress_dispatch_edges() {
    let engine = CompressionEngine::new();

    let plain = engine.compress(SAMPLE, FormatTag::Plain, None, 1).unwrap();
    assert_eq!(plain.data, SAMPLE);
    assert_eq!(plain.layers, 0);

    let err = engine.compress(SAMPLE, FormatTag::Unknown, None, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}
