//! MIME part tree validated from Gmail API payloads

use crate::body::BodyError;
use crate::gmail::api::{MessageBody, MessagePart, MessagePayload};

/// One node of a message's MIME tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    /// Media type, e.g. "text/plain" or "multipart/alternative"
    pub mime_type: String,
    pub body: PartBody,
}

/// Content of a MIME node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    /// Leaf with inline URL-safe base64 data
    Inline(String),
    /// Multipart container with ordered children
    Parts(Vec<MimePart>),
    /// Neither inline data nor children, e.g. an attachment reference
    Empty,
}

impl MimePart {
    /// Leaf part with inline base64 data
    pub fn leaf(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            body: PartBody::Inline(data.into()),
        }
    }

    /// Container part with the given children
    pub fn container(mime_type: impl Into<String>, parts: Vec<MimePart>) -> Self {
        Self {
            mime_type: mime_type.into(),
            body: PartBody::Parts(parts),
        }
    }

    /// Build the tree for a message payload.
    ///
    /// The root must carry either non-empty `parts` or inline `body.data`;
    /// anything else is a [`BodyError::MalformedMessage`]. Nested parts are
    /// accepted as-is and only fail if extraction selects them.
    pub fn from_payload(payload: &MessagePayload) -> Result<Self, BodyError> {
        let node = Self::build(
            payload.mime_type.as_deref(),
            payload.body.as_ref(),
            payload.parts.as_deref(),
        );

        if node.body == PartBody::Empty {
            return Err(BodyError::MalformedMessage(
                "payload has neither body data nor parts".to_string(),
            ));
        }

        Ok(node)
    }

    /// Build the tree for a nested part
    pub fn from_part(part: &MessagePart) -> Self {
        Self::build(
            part.mime_type.as_deref(),
            part.body.as_ref(),
            part.parts.as_deref(),
        )
    }

    fn build(
        mime_type: Option<&str>,
        body: Option<&MessageBody>,
        parts: Option<&[MessagePart]>,
    ) -> Self {
        let mime_type = mime_type.unwrap_or_default().to_string();

        // Gmail sends `body: {size: 0}` alongside the parts of a container
        if let Some(parts) = parts
            && !parts.is_empty()
        {
            return Self::container(mime_type, parts.iter().map(Self::from_part).collect());
        }

        match body.and_then(|b| b.data.as_ref()) {
            Some(data) => Self::leaf(mime_type, data.clone()),
            None => Self {
                mime_type,
                body: PartBody::Empty,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_from_json(json: &str) -> MessagePayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_leaf_payload() {
        let payload = payload_from_json(
            r#"{"mimeType": "text/plain", "body": {"size": 5, "data": "aGVsbG8"}}"#,
        );
        let part = MimePart::from_payload(&payload).unwrap();
        assert_eq!(part, MimePart::leaf("text/plain", "aGVsbG8"));
    }

    #[test]
    fn test_container_payload_ignores_empty_body() {
        let payload = payload_from_json(
            r#"{
                "mimeType": "multipart/alternative",
                "body": {"size": 0},
                "parts": [
                    {"partId": "0", "mimeType": "text/plain", "body": {"data": "YQ"}},
                    {"partId": "1", "mimeType": "text/html", "body": {"data": "Yg"}}
                ]
            }"#,
        );
        let part = MimePart::from_payload(&payload).unwrap();
        assert_eq!(
            part,
            MimePart::container(
                "multipart/alternative",
                vec![
                    MimePart::leaf("text/plain", "YQ"),
                    MimePart::leaf("text/html", "Yg"),
                ]
            )
        );
    }

    #[test]
    fn test_attachment_part_is_empty() {
        let payload = payload_from_json(
            r#"{
                "mimeType": "multipart/mixed",
                "parts": [
                    {"mimeType": "application/pdf", "filename": "a.pdf",
                     "body": {"attachmentId": "ANGjdJ", "size": 1024}}
                ]
            }"#,
        );
        let part = MimePart::from_payload(&payload).unwrap();
        let PartBody::Parts(children) = part.body else {
            panic!("expected container");
        };
        assert_eq!(children[0].body, PartBody::Empty);
    }

    #[test]
    fn test_empty_parts_without_body_is_malformed() {
        let payload = payload_from_json(r#"{"mimeType": "multipart/mixed", "parts": []}"#);
        let err = MimePart::from_payload(&payload).unwrap_err();
        assert!(matches!(err, BodyError::MalformedMessage(_)));
    }

    #[test]
    fn test_empty_parts_with_body_is_leaf() {
        let payload = payload_from_json(
            r#"{"mimeType": "text/plain", "parts": [], "body": {"data": "YQ"}}"#,
        );
        let part = MimePart::from_payload(&payload).unwrap();
        assert_eq!(part.body, PartBody::Inline("YQ".to_string()));
    }

    #[test]
    fn test_missing_mime_type_defaults_to_empty() {
        let payload = payload_from_json(r#"{"body": {"data": "YQ"}}"#);
        let part = MimePart::from_payload(&payload).unwrap();
        assert_eq!(part.mime_type, "");
    }
}
