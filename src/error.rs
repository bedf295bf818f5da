//! SqText error types.
//!
//! Errors are split by where the failure happened rather than by which
//! envelope was being processed:
//!
//! - **Format**: the text did not have the structure the selected path
//!   expects (missing delimiter, malformed envelope, invalid base64)
//! - **Codec**: the compression transform itself failed (bad gzip magic,
//!   truncated or corrupt stream)
//! - **Encoding**: bytes could not be turned back into UTF-8 text
//!
//! An algorithm that silently degraded to GZIP is not an error; it is a
//! [`CodecWarning`](crate::codec::CodecWarning) attached to the result.

use thiserror::Error;

/// SqText engine errors.
#[derive(Error, Debug)]
pub enum SqzError {
    /// Structural expectation violated (missing delimiter, malformed envelope).
    #[error("Format error: {0}")]
    Format(String),

    /// The compress/decompress transform failed.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Text/byte charset conversion failed.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`SqzError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`SqzError::Format`].
    Format,
    /// See [`SqzError::Codec`].
    Codec,
    /// See [`SqzError::Encoding`].
    Encoding,
    /// See [`SqzError::Config`].
    Config,
    /// See [`SqzError::Io`].
    Io,
}

impl SqzError {
    /// Get the error kind without matching on messages
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqzError::Format(_) => ErrorKind::Format,
            SqzError::Codec(_) => ErrorKind::Codec,
            SqzError::Encoding(_) => ErrorKind::Encoding,
            SqzError::Config(_) => ErrorKind::Config,
            SqzError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for SqText operations
pub type Result<T> = std::result::Result<T, SqzError>;

impl From<base64::DecodeError> for SqzError {
    fn from(err: base64::DecodeError) -> Self {
        SqzError::Format(format!("Base64 decode error: {err}"))
    }
}

impl From<std::string::FromUtf8Error> for SqzError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        SqzError::Encoding(format!("Invalid UTF-8: {err}"))
    }
}

impl From<toml::de::Error> for SqzError {
    fn from(err: toml::de::Error) -> Self {
        SqzError::Config(format!("Failed to parse config: {err}"))
    }
}
