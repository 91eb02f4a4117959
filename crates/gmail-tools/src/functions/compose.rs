//! Outgoing message construction

use anyhow::{Context, Result};
use base64::prelude::*;
use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;

use crate::gmail::api::RawMessage;

/// Build a `text/plain` RFC 5322 message ready for `messages.send`.
///
/// `sender` and `to` accept `addr@example.com` or `Name <addr@example.com>`.
pub fn create_message(sender: &str, to: &str, subject: &str, text: &str) -> Result<RawMessage> {
    let from: Mailbox = sender
        .parse()
        .with_context(|| format!("Invalid sender address: {}", sender))?;
    let to: Mailbox = to
        .parse()
        .with_context(|| format!("Invalid recipient address: {}", to))?;

    let email = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(text.to_string())
        .context("Failed to build email message")?;

    Ok(RawMessage {
        raw: BASE64_URL_SAFE.encode(email.formatted()),
    })
}
