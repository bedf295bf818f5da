//! Chat envelope: bannered GZIP payload meant to be pasted into a chat.
//!
//! Always a single GZIP layer; the algorithm is not selectable.

use crate::codec::record::{find_str, find_u64, Layout, Record};
use crate::codec::registry::CodecRegistry;
use crate::codec::Algorithm;
use crate::error::{Result, SqzError};

/// Marker phrase in the first banner line
pub const CHAT_BANNER_MARKER: &str = "SQText COMPRESSED DATA";

/// Marker phrase in the second banner line
pub const CHAT_INSTRUCTION_MARKER: &str = "INSTRUCTION FOR AI";

/// Value of the `sqtext_format` field
pub const CHAT_FORMAT: &str = "chat_v1";

/// Value of the `compression` field
pub const CHAT_COMPRESSION: &str = "gzip+base64";

/// Banner placed before the body
pub const CHAT_BANNER: &str = "// ===== SQText COMPRESSED DATA =====\n\
// INSTRUCTION FOR AI:\n\
// 1. This is Base64+GZIP compressed JSON\n\
// 2. Decode Base64, then decompress GZIP\n\
// 3. Read the JSON below\n\
// ==================================\n\n";

/// Chat envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEnvelope {
    /// Input length in characters
    pub original_size: usize,
    /// Payload length in characters
    pub compressed_size: usize,
    /// Unix epoch milliseconds
    pub timestamp: i64,
    /// Base64 GZIP payload
    pub data: String,
}

impl ChatEnvelope {
    /// Compress `text` with GZIP
    pub fn encode(registry: &CodecRegistry, text: &str, timestamp: i64) -> Result<Self> {
        let data = registry.resolve(Algorithm::Gzip).compress(text)?;
        Ok(Self {
            original_size: text.chars().count(),
            compressed_size: data.chars().count(),
            timestamp,
            data,
        })
    }

    /// Render the banner and pretty body
    pub fn render(&self) -> String {
        let body = Record::new()
            .str("sqtext_format", CHAT_FORMAT)
            .str("compression", CHAT_COMPRESSION)
            .uint("original_size", self.original_size as u64)
            .uint("compressed_size", self.compressed_size as u64)
            .int("timestamp", self.timestamp)
            .str("data", self.data.as_str())
            .render(Layout::Pretty);

        format!("{CHAT_BANNER}{body}")
    }

    /// Parse from the first `{`; the body and `data` are required
    pub fn parse(text: &str) -> Result<Self> {
        let start = text
            .find('{')
            .ok_or_else(|| SqzError::Format("No JSON body in chat envelope".to_string()))?;
        let body = &text[start..];

        let data = find_str(body, "data")?
            .ok_or_else(|| SqzError::Format("No \"data\" in chat envelope".to_string()))?;

        Ok(Self {
            original_size: find_u64(body, "original_size")?.unwrap_or(0) as usize,
            compressed_size: find_u64(body, "compressed_size")?.unwrap_or(0) as usize,
            timestamp: find_u64(body, "timestamp")?
                .and_then(|t| i64::try_from(t).ok())
                .unwrap_or(0),
            data,
        })
    }

    /// Decompress with the GZIP codec
    pub fn decode(&self, registry: &CodecRegistry) -> Result<String> {
        registry.resolve(Algorithm::Gzip).decompress(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const TS: i64 = 1_760_659_200_000;

    #[test]
    fn test_banner_and_fields() {
        let registry = CodecRegistry::new();
        let envelope = ChatEnvelope::encode(&registry, "Привет, chat!", TS).unwrap();
        let text = envelope.render();

        assert!(text.starts_with("// ===== SQText COMPRESSED DATA =====\n// INSTRUCTION FOR AI:\n"));
        assert!(text.contains("\n\n{\n  \"sqtext_format\": \"chat_v1\",\n  \"compression\": \"gzip+base64\",\n"));
        assert!(text.contains("\"original_size\": 13,"));
        assert!(text.ends_with("\"\n}"));
    }

    #[test]
    fn test_roundtrip() {
        let registry = CodecRegistry::new();
        let original = "line one\nline \"two\"\n\ttabbed";
        let envelope = ChatEnvelope::encode(&registry, original, TS).unwrap();

        let parsed = ChatEnvelope::parse(&envelope.render()).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(parsed.decode(&registry).unwrap(), original);
    }

    #[test]
    fn test_body_is_valid_json() {
        let registry = CodecRegistry::new();
        let text = ChatEnvelope::encode(&registry, "json", TS).unwrap().render();
        let value: serde_json::Value = serde_json::from_str(&text[text.find('{').unwrap()..]).unwrap();
        assert_eq!(value["sqtext_format"], "chat_v1");
        assert_eq!(value["timestamp"], TS);
    }

    #[test]
    fn test_accepts_compact_data_key() {
        let registry = CodecRegistry::new();
        let data = registry.resolve(Algorithm::Gzip).compress("compact").unwrap();
        let text = format!("{CHAT_BANNER}{{\"data\":\"{data}\"}}");
        assert_eq!(ChatEnvelope::parse(&text).unwrap().decode(&registry).unwrap(), "compact");
    }

    #[test]
    fn test_missing_body_or_data() {
        let err = ChatEnvelope::parse(CHAT_BANNER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = ChatEnvelope::parse(&format!("{CHAT_BANNER}{{\"sqtext_format\": \"chat_v1\"}}")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
