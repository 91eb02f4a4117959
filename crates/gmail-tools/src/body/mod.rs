//! Message body extraction
//!
//! Turns a [`MimePart`](crate::models::MimePart) tree into one normalized
//! plain-text string: pick the text part, decode it, strip HTML markup if
//! needed, then flatten whitespace.

mod extract;
mod text;

pub use extract::{decode_base64_body, extract_body};
pub use text::{clean_body, html_to_text};

/// Failure to decode a leaf payload
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("body data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("body data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Failure to extract a body from a message
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
