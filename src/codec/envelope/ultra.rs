//! Ultra-compact envelopes.
//!
//! ```text
//! v1 (legacy, decode-only):  {"d":"<base64>"}
//! v2:                        {"a":"<algorithm>","d":"<base64>"}
//! ```

use crate::codec::gzip::{decode_base64, GzipCodec};
use crate::codec::record::{find_str, Layout, Record};
use crate::codec::registry::CodecRegistry;
use crate::codec::{Algorithm, CodecWarning};
use crate::error::{ErrorKind, Result, SqzError};

use super::CompressedPayload;

/// Algorithm key
pub const ALGORITHM_KEY: &str = "a";

/// Data key
pub const DATA_KEY: &str = "d";

/// Ultra-compact v2 envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UltraCompactV2 {
    /// Algorithm tag and base64 payload
    pub payload: CompressedPayload,
}

impl UltraCompactV2 {
    /// Compress `text` with `algorithm`, degrading through the registry
    pub fn encode(
        registry: &CodecRegistry,
        text: &str,
        algorithm: Algorithm,
    ) -> Result<(Self, Option<CodecWarning>)> {
        let resolved = registry.resolve(algorithm);
        let data = resolved.compress(text)?;
        let envelope = Self {
            payload: CompressedPayload { algorithm, data },
        };
        Ok((envelope, resolved.warning))
    }

    /// Render as `{"a":"...","d":"..."}`
    pub fn render(&self) -> String {
        Record::new()
            .str(ALGORITHM_KEY, self.payload.algorithm.name())
            .str(DATA_KEY, self.payload.data.as_str())
            .render(Layout::Compact)
    }

    /// Parse; both keys are required, an unknown algorithm name means GZIP
    pub fn parse(text: &str) -> Result<Self> {
        let name = find_str(text, ALGORITHM_KEY)?.ok_or_else(|| {
            SqzError::Format("Invalid ultra-compact v2 format: missing \"a\"".to_string())
        })?;
        let data = find_str(text, DATA_KEY)?.ok_or_else(|| {
            SqzError::Format("Invalid ultra-compact v2 format: missing \"d\"".to_string())
        })?;

        let algorithm = Algorithm::from_name(&name).unwrap_or_else(|| {
            tracing::debug!("unrecognised algorithm {name:?}, assuming gzip");
            Algorithm::Gzip
        });

        Ok(Self {
            payload: CompressedPayload { algorithm, data },
        })
    }

    /// Decompress the payload with the codec registered for its tag
    pub fn decode(&self, registry: &CodecRegistry) -> Result<String> {
        registry
            .resolve(self.payload.algorithm)
            .decompress(&self.payload.data)
    }
}

/// Legacy ultra-compact v1 envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UltraCompactV1 {
    /// Base64 payload
    pub data: String,
}

impl UltraCompactV1 {
    /// Render as `{"d":"..."}`
    pub fn render(&self) -> String {
        Record::new()
            .str(DATA_KEY, self.data.as_str())
            .render(Layout::Compact)
    }

    /// Parse; the `"d"` key is required
    pub fn parse(text: &str) -> Result<Self> {
        let data = find_str(text, DATA_KEY)?.ok_or_else(|| {
            SqzError::Format("Invalid ultra-compact v1 format: missing \"d\"".to_string())
        })?;
        Ok(Self { data })
    }

    /// Decode as gzip, then as zlib-wrapped gzip.
    ///
    /// A payload neither form accepts is a format error.
    pub fn decode(&self) -> Result<String> {
        let bytes = decode_base64(&self.data)?;
        GzipCodec::new()
            .decompress_layered(&bytes)
            .map_err(|e| match e.kind() {
                ErrorKind::Codec => SqzError::Format(format!("Invalid ultra-compact v1 payload: {e}")),
                _ => e,
            })
    }
}
