//! Self-describing textual envelopes.
//!
//! | Format            | Shape                                         | Algorithm        |
//! |-------------------|-----------------------------------------------|------------------|
//! | ultra-compact v1  | `{"d":"<base64>"}`                            | GZIP (decode-only) |
//! | ultra-compact v2  | `{"a":"<algo>","d":"<base64>"}`               | selectable       |
//! | neuro-json        | 2 comment lines + `metadata` + `data`         | selectable, recursive |
//! | chat-envelope     | instruction banner + flat body with `data`    | GZIP only        |
//!
//! Every envelope is parsed from the text alone; [`Envelope::parse`] only
//! needs the [`FormatTag`] the detector produced.

mod chat;
mod neuro;
mod ultra;

pub use chat::{
    ChatEnvelope, CHAT_BANNER, CHAT_BANNER_MARKER, CHAT_COMPRESSION, CHAT_FORMAT,
    CHAT_INSTRUCTION_MARKER,
};
pub use neuro::{
    is_recursive_label, NeuroEnvelope, NeuroMetadata, LEGACY_RECURSIVE_LABEL, NEURO_FORMAT,
    NEURO_HINT, NEURO_TITLE, NEURO_VERSION, RECURSIVE_LABEL,
};
pub use ultra::{UltraCompactV1, UltraCompactV2};

use super::registry::CodecRegistry;
use super::{Algorithm, FormatTag};
use crate::error::{Result, SqzError};

/// Algorithm tag plus the base64 bytes it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPayload {
    /// Algorithm recorded for the payload
    pub algorithm: Algorithm,
    /// Base64 of the compressed bytes
    pub data: String,
}

/// Any parsed envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// `{"d":"..."}`
    UltraCompactV1(UltraCompactV1),
    /// `{"a":"...","d":"..."}`
    UltraCompactV2(UltraCompactV2),
    /// Neuro JSON
    Neuro(NeuroEnvelope),
    /// Chat banner envelope
    Chat(ChatEnvelope),
}

impl Envelope {
    /// Parse `text` as the envelope named by `tag`
    pub fn parse(tag: FormatTag, text: &str) -> Result<Self> {
        match tag {
            FormatTag::UltraCompactV1 => UltraCompactV1::parse(text).map(Envelope::UltraCompactV1),
            FormatTag::UltraCompactV2 => UltraCompactV2::parse(text).map(Envelope::UltraCompactV2),
            FormatTag::NeuroJson => NeuroEnvelope::parse(text).map(Envelope::Neuro),
            FormatTag::ChatEnvelope => ChatEnvelope::parse(text).map(Envelope::Chat),
            FormatTag::Plain | FormatTag::RawCodec | FormatTag::Unknown => Err(SqzError::Format(
                format!("{tag} is not an envelope format"),
            )),
        }
    }

    /// Format tag of this envelope
    pub fn format(&self) -> FormatTag {
        match self {
            Envelope::UltraCompactV1(_) => FormatTag::UltraCompactV1,
            Envelope::UltraCompactV2(_) => FormatTag::UltraCompactV2,
            Envelope::Neuro(_) => FormatTag::NeuroJson,
            Envelope::Chat(_) => FormatTag::ChatEnvelope,
        }
    }

    /// Render back to text
    pub fn render(&self) -> String {
        match self {
            Envelope::UltraCompactV1(e) => e.render(),
            Envelope::UltraCompactV2(e) => e.render(),
            Envelope::Neuro(e) => e.render(),
            Envelope::Chat(e) => e.render(),
        }
    }

    /// Base64 payload carried by the envelope
    pub fn data(&self) -> &str {
        match self {
            Envelope::UltraCompactV1(e) => &e.data,
            Envelope::UltraCompactV2(e) => &e.payload.data,
            Envelope::Neuro(e) => &e.data,
            Envelope::Chat(e) => &e.data,
        }
    }

    /// Decode the payload back to the original text
    pub fn decode(&self, registry: &CodecRegistry) -> Result<String> {
        match self {
            Envelope::UltraCompactV1(e) => e.decode(),
            Envelope::UltraCompactV2(e) => e.decode(registry),
            Envelope::Neuro(e) => e.decode(registry),
            Envelope::Chat(e) => e.decode(registry),
        }
    }
}
