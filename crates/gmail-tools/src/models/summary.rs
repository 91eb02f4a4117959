//! Per-message summary handed to the LLM harness

use serde::{Deserialize, Serialize};

/// Sender, subject and cleaned body of one message.
///
/// Missing headers and unextractable bodies serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailSummary {
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl MailSummary {
    /// Compact JSON form used in `list_messages` output
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order_and_nulls() {
        let summary = MailSummary {
            sender: Some("Alice <alice@example.com>".to_string()),
            subject: None,
            body: Some("Hi".to_string()),
        };
        assert_eq!(
            summary.to_json().unwrap(),
            r#"{"sender":"Alice <alice@example.com>","subject":null,"body":"Hi"}"#
        );
    }
}
