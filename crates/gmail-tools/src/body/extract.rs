//! Body selection and decoding

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use log::debug;

use super::text::{clean_body, html_to_text};
use super::{BodyError, DecodeError};
use crate::models::{MimePart, PartBody};

const TEXT_PLAIN: &str = "text/plain";
const TEXT_HTML: &str = "text/html";

/// Gmail pads inconsistently, so accept both forms
const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextKind {
    Plain,
    Html,
}

impl TextKind {
    fn of(mime_type: &str) -> Option<Self> {
        if mime_type.eq_ignore_ascii_case(TEXT_PLAIN) {
            Some(Self::Plain)
        } else if mime_type.eq_ignore_ascii_case(TEXT_HTML) {
            Some(Self::Html)
        } else {
            None
        }
    }
}

/// Extract the normalized plain-text body of a message.
///
/// For a container, the children are scanned once in order and the first
/// `text/plain` or `text/html` part wins. Nested containers are not searched.
/// `Ok(None)` means the container has no text part at that level.
///
/// A root without children is decoded itself, as HTML if its type is
/// `text/html` and as plain text otherwise.
pub fn extract_body(message: &MimePart) -> Result<Option<String>, BodyError> {
    match &message.body {
        PartBody::Parts(parts) if !parts.is_empty() => {
            let selected = parts
                .iter()
                .find_map(|part| TextKind::of(&part.mime_type).map(|kind| (part, kind)));

            match selected {
                Some((part, kind)) => render(part, kind).map(Some),
                None => {
                    debug!(
                        "No text part among {} children of {}",
                        parts.len(),
                        message.mime_type
                    );
                    Ok(None)
                }
            }
        }
        PartBody::Inline(_) => {
            let kind = TextKind::of(&message.mime_type).unwrap_or(TextKind::Plain);
            render(message, kind).map(Some)
        }
        PartBody::Parts(_) | PartBody::Empty => Err(BodyError::MalformedMessage(format!(
            "{} part has neither body data nor parts",
            message.mime_type
        ))),
    }
}

/// Decode, strip markup if HTML, and clean one leaf
fn render(part: &MimePart, kind: TextKind) -> Result<String, BodyError> {
    let PartBody::Inline(data) = &part.body else {
        return Err(BodyError::MalformedMessage(format!(
            "selected {} part has no inline body data",
            part.mime_type
        )));
    };

    let text = decode_base64_body(data)?;
    let text = match kind {
        TextKind::Plain => text,
        TextKind::Html => html_to_text(&text),
    };

    Ok(clean_body(&text))
}

/// Decode base64 body data to a UTF-8 string.
///
/// Tries the URL-safe alphabet first and falls back to the standard one.
/// Padding is optional for both.
pub fn decode_base64_body(data: &str) -> Result<String, DecodeError> {
    let bytes = match URL_SAFE_LENIENT.decode(data) {
        Ok(bytes) => bytes,
        Err(url_safe_err) => STANDARD_LENIENT.decode(data).map_err(|_| url_safe_err)?,
    };

    Ok(String::from_utf8(bytes)?)
}
