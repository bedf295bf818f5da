//! Algorithm tag to codec strategy registry.
//!
//! Tags without a registered codec resolve to the GZIP codec and carry a
//! [`CodecWarning::UnsupportedAlgorithm`], so callers always get bytes plus
//! an explicit record of the degradation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::gzip::{decode_base64, encode_base64, GzipCodec};
use super::{Algorithm, CodecWarning};
use crate::error::Result;

/// A byte-level compression strategy
pub trait ByteCodec: Send + Sync {
    /// Algorithm this codec implements
    fn algorithm(&self) -> Algorithm;

    /// Compress raw bytes
    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress raw bytes
    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Outcome of resolving an algorithm tag
#[derive(Clone)]
pub struct Resolved {
    /// Codec that will do the work
    pub codec: Arc<dyn ByteCodec>,
    /// Tag originally asked for
    pub requested: Algorithm,
    /// Set when `codec` implements a different algorithm than `requested`
    pub warning: Option<CodecWarning>,
}

impl Resolved {
    /// Compress text to base64 with the resolved codec (empty stays empty)
    pub fn compress(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let bytes = self.codec.compress_bytes(text.as_bytes())?;
        Ok(encode_base64(&bytes))
    }

    /// Decompress a base64 payload with the resolved codec
    pub fn decompress(&self, encoded: &str) -> Result<String> {
        if encoded.trim().is_empty() {
            return Ok(String::new());
        }
        let bytes = self.codec.decompress_bytes(&decode_base64(encoded)?)?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Registry of available codecs
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<Algorithm, Arc<dyn ByteCodec>>,
    fallback: Arc<dyn ByteCodec>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_gzip(GzipCodec::new())
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.codecs.keys().map(|a| a.name()).collect();
        registered.sort_unstable();
        f.debug_struct("CodecRegistry")
            .field("registered", &registered)
            .field("fallback", &self.fallback.algorithm())
            .finish()
    }
}

impl CodecRegistry {
    /// Registry with only the default GZIP codec
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose GZIP codec (and fallback) is `gzip`
    pub fn with_gzip(gzip: GzipCodec) -> Self {
        let gzip: Arc<dyn ByteCodec> = Arc::new(gzip);
        let mut codecs = HashMap::new();
        codecs.insert(Algorithm::Gzip, Arc::clone(&gzip));
        Self {
            codecs,
            fallback: gzip,
        }
    }

    /// Register (or replace) the codec for its algorithm
    pub fn register(&mut self, codec: Arc<dyn ByteCodec>) {
        self.codecs.insert(codec.algorithm(), codec);
    }

    /// Is a real codec registered for `algorithm`?
    pub fn is_registered(&self, algorithm: Algorithm) -> bool {
        self.codecs.contains_key(&algorithm)
    }

    /// Resolve a tag to a codec, falling back to GZIP
    pub fn resolve(&self, requested: Algorithm) -> Resolved {
        if let Some(codec) = self.codecs.get(&requested) {
            return Resolved {
                codec: Arc::clone(codec),
                requested,
                warning: None,
            };
        }

        let fallback = self.fallback.algorithm();
        tracing::debug!("{requested} codec not registered, using {fallback}");
        Resolved {
            codec: Arc::clone(&self.fallback),
            requested,
            warning: Some(CodecWarning::UnsupportedAlgorithm {
                requested,
                fallback,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReverseCodec;

    impl ByteCodec for ReverseCodec {
        fn algorithm(&self) -> Algorithm {
            Algorithm::Zstd
        }

        fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().rev().copied().collect())
        }

        fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().rev().copied().collect())
        }
    }

    #[test]
    fn test_gzip_registered_by_default() {
        let registry = CodecRegistry::new();
        assert!(registry.is_registered(Algorithm::Gzip));
        assert!(!registry.is_registered(Algorithm::Zstd));
        assert!(!registry.is_registered(Algorithm::Brotli));

        let resolved = registry.resolve(Algorithm::Gzip);
        assert!(resolved.warning.is_none());
        assert_eq!(resolved.codec.algorithm(), Algorithm::Gzip);
    }

    #[test]
    fn test_unregistered_falls_back_to_gzip() {
        let registry = CodecRegistry::new();
        for requested in [Algorithm::Zstd, Algorithm::Brotli] {
            let resolved = registry.resolve(requested);
            assert_eq!(resolved.codec.algorithm(), Algorithm::Gzip);
            assert_eq!(
                resolved.warning,
                Some(CodecWarning::UnsupportedAlgorithm {
                    requested,
                    fallback: Algorithm::Gzip,
                })
            );
        }
    }

    #[test]
    fn test_fallback_output_matches_gzip() {
        let registry = CodecRegistry::new();
        let text = "degradation must be byte-identical";

        let gzip = registry.resolve(Algorithm::Gzip).compress(text).unwrap();
        let brotli = registry.resolve(Algorithm::Brotli).compress(text).unwrap();
        assert_eq!(gzip, brotli);
        assert_eq!(GzipCodec::new().compress(text).unwrap(), gzip);
    }

    #[test]
    fn test_registered_codec_is_used() {
        let mut registry = CodecRegistry::new();
        registry.register(Arc::new(ReverseCodec));

        let resolved = registry.resolve(Algorithm::Zstd);
        assert!(resolved.warning.is_none());

        let encoded = resolved.compress("abc").unwrap();
        assert_eq!(encoded, encode_base64(b"cba"));
        assert_eq!(resolved.decompress(&encoded).unwrap(), "abc");
    }
}
