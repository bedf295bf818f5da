//! Format classification from text alone.
//!
//! Checks run in a fixed order, most specific first, and the first match
//! wins:
//!
//! | # | Check                                             | Tag                |
//! |---|---------------------------------------------------|--------------------|
//! | 1 | chat banner + AI instruction markers              | `ChatEnvelope`     |
//! | 2 | `"format":"sqz"` and `"compressed":true` tokens   | `NeuroJson`        |
//! | 3 | starts `{"a":"` and contains `"d":"`              | `UltraCompactV2`   |
//! | 3 | starts `{"d":"` and ends `"}`                     | `UltraCompactV1`   |
//! | 4 | gzip+base64 check succeeds                        | `RawCodec`         |
//! | 5 | looks like a JSON envelope with a data key        | `Unknown`          |
//! | 6 | anything else                                     | `Plain`            |
//!
//! A neuro body also contains `"data":` and would be misread by a looser
//! check, so the order must not change.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::envelope::{CHAT_BANNER_MARKER, CHAT_INSTRUCTION_MARKER};
use super::gzip::GzipCodec;

/// Classification of a text blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FormatTag {
    /// Uncompressed text
    Plain,
    /// Bare base64+gzip, no envelope
    #[serde(alias = "raw")]
    RawCodec,
    /// `{"d":"<base64>"}` (legacy, decode-only)
    UltraCompactV1,
    /// `{"a":"<algo>","d":"<base64>"}`
    #[default]
    #[serde(alias = "v2")]
    UltraCompactV2,
    /// Metadata-rich JSON envelope behind two comment lines
    #[serde(alias = "neuro")]
    NeuroJson,
    /// Bannered envelope for chat assistants, GZIP only
    #[serde(alias = "chat")]
    ChatEnvelope,
    /// Envelope-shaped text no check recognises
    Unknown,
}

impl FormatTag {
    /// Stable kebab-case name
    pub fn name(&self) -> &'static str {
        match self {
            FormatTag::Plain => "plain",
            FormatTag::RawCodec => "raw-codec",
            FormatTag::UltraCompactV1 => "ultra-compact-v1",
            FormatTag::UltraCompactV2 => "ultra-compact-v2",
            FormatTag::NeuroJson => "neuro-json",
            FormatTag::ChatEnvelope => "chat-envelope",
            FormatTag::Unknown => "unknown",
        }
    }

    /// True for the four textual envelope formats
    pub fn is_envelope(&self) -> bool {
        matches!(
            self,
            FormatTag::UltraCompactV1
                | FormatTag::UltraCompactV2
                | FormatTag::NeuroJson
                | FormatTag::ChatEnvelope
        )
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for FormatTag {
    type Err = crate::error::SqzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "none" => Ok(FormatTag::Plain),
            "raw-codec" | "raw" | "gzip" => Ok(FormatTag::RawCodec),
            "ultra-compact-v1" | "v1" => Ok(FormatTag::UltraCompactV1),
            "ultra-compact-v2" | "v2" | "ultra" | "ultra-compact" => Ok(FormatTag::UltraCompactV2),
            "neuro-json" | "neuro" => Ok(FormatTag::NeuroJson),
            "chat-envelope" | "chat" => Ok(FormatTag::ChatEnvelope),
            "unknown" => Ok(FormatTag::Unknown),
            other => Err(crate::error::SqzError::Config(format!(
                "Unknown format: {other}. Use: plain, raw, v1, v2, neuro, chat"
            ))),
        }
    }
}

lazy_static! {
    /// `"format":"sqz"` with optional whitespace around the colon
    static ref NEURO_FORMAT: Regex = Regex::new(r#""format"\s*:\s*"sqz""#).unwrap();

    /// `"compressed":true` with optional whitespace around the colon
    static ref NEURO_COMPRESSED: Regex = Regex::new(r#""compressed"\s*:\s*true"#).unwrap();

    /// A `"d"` or `"data"` key
    static ref DATA_KEY: Regex = Regex::new(r#""d(ata)?"\s*:"#).unwrap();
}

/// Check 1: chat banner markers
pub fn is_chat_envelope(text: &str) -> bool {
    text.contains(CHAT_BANNER_MARKER) && text.contains(CHAT_INSTRUCTION_MARKER)
}

/// Check 2: neuro metadata tokens
pub fn is_neuro_json(text: &str) -> bool {
    NEURO_FORMAT.is_match(text) && NEURO_COMPRESSED.is_match(text)
}

/// Check 3: ultra-compact shapes, `None` if neither matches
pub fn ultra_compact_version(text: &str) -> Option<FormatTag> {
    let trimmed = text.trim();
    if trimmed.starts_with(r#"{"a":""#) && trimmed.contains(r#""d":""#) {
        Some(FormatTag::UltraCompactV2)
    } else if trimmed.starts_with(r#"{"d":""#) && trimmed.ends_with(r#""}"#) {
        Some(FormatTag::UltraCompactV1)
    } else {
        None
    }
}

fn looks_like_envelope(text: &str) -> bool {
    let trimmed = text.trim_start();
    (trimmed.starts_with('{') || trimmed.starts_with("//")) && DATA_KEY.is_match(trimmed)
}

/// Classify `text`
pub fn detect_format(text: &str) -> FormatTag {
    let tag = if is_chat_envelope(text) {
        FormatTag::ChatEnvelope
    } else if is_neuro_json(text) {
        FormatTag::NeuroJson
    } else if let Some(tag) = ultra_compact_version(text) {
        tag
    } else if GzipCodec::new().is_likely_compressed(text) {
        FormatTag::RawCodec
    } else if looks_like_envelope(text) {
        FormatTag::Unknown
    } else {
        FormatTag::Plain
    };

    tracing::debug!(format = %tag, len = text.len(), "detected format");
    tag
}
