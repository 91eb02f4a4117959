//! Gmail API response normalization
//!
//! Reduces a fetched message to the sender/subject/body summary the
//! function tools return.

use log::warn;

use super::api::{GmailMessage, MessagePayload};
use crate::body::extract_body;
use crate::models::{MailSummary, MimePart};

/// Summarize a Gmail API message.
///
/// Body extraction failures are logged and reported as a `null` body so one
/// bad message does not hide the rest of a listing.
pub fn summarize_message(gmail_msg: &GmailMessage) -> MailSummary {
    let Some(payload) = gmail_msg.payload.as_ref() else {
        warn!("Message {} has no payload", gmail_msg.id);
        return MailSummary::default();
    };

    let body = match MimePart::from_payload(payload).and_then(|part| extract_body(&part)) {
        Ok(body) => body,
        Err(e) => {
            warn!("Could not extract body of message {}: {}", gmail_msg.id, e);
            None
        }
    };

    MailSummary {
        sender: extract_header(payload, "From"),
        subject: extract_header(payload, "Subject"),
        body,
    }
}

/// First header named `name`, compared case-insensitively
pub fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload
        .headers
        .as_ref()?
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_from_json(json: &str) -> GmailMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_header_case_insensitive_first_match() {
        let msg = message_from_json(
            r#"{"id": "m1", "payload": {"headers": [
                {"name": "SUBJECT", "value": "first"},
                {"name": "Subject", "value": "second"}
            ]}}"#,
        );
        let payload = msg.payload.as_ref().unwrap();
        assert_eq!(extract_header(payload, "subject"), Some("first".to_string()));
        assert_eq!(extract_header(payload, "Cc"), None);
    }

    #[test]
    fn test_summarize_plain_message() {
        let msg = message_from_json(
            r#"{
                "id": "m1",
                "threadId": "t1",
                "snippet": "Hello",
                "payload": {
                    "mimeType": "text/plain",
                    "headers": [
                        {"name": "From", "value": "Alice <alice@example.com>"},
                        {"name": "Subject", "value": "Greetings"}
                    ],
                    "body": {"size": 13, "data": "SGVsbG8sCldvcmxkIQ"}
                }
            }"#,
        );

        assert_eq!(
            summarize_message(&msg),
            MailSummary {
                sender: Some("Alice <alice@example.com>".to_string()),
                subject: Some("Greetings".to_string()),
                body: Some("Hello, World!".to_string()),
            }
        );
    }

    #[test]
    fn test_summarize_keeps_headers_when_body_is_malformed() {
        let msg = message_from_json(
            r#"{"id": "m2", "payload": {
                "mimeType": "multipart/mixed",
                "headers": [{"name": "from", "value": "bob@example.com"}],
                "parts": []
            }}"#,
        );

        let summary = summarize_message(&msg);
        assert_eq!(summary.sender.as_deref(), Some("bob@example.com"));
        assert_eq!(summary.subject, None);
        assert_eq!(summary.body, None);
    }

    #[test]
    fn test_summarize_without_payload() {
        let msg = message_from_json(r#"{"id": "m3"}"#);
        assert_eq!(summarize_message(&msg), MailSummary::default());
    }
}
