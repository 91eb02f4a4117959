//! JSON schemas describing the functions to the model

use serde_json::{Value, json};

/// Tool definitions in the chat-completions `tools` format.
///
/// Names and parameters match what [`MailFunctions::dispatch`](super::MailFunctions::dispatch)
/// accepts.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        function(
            "get_current_date",
            "Get the current date in the format YYYY/MM/DD.",
            json!({"type": "object", "properties": {}}),
        ),
        function(
            "list_messages",
            "List the messages in the user's mailbox that match the query, as JSON objects \
             with sender, subject and body separated by '|'.",
            json!({
                "type": "object",
                "properties": {
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of messages to return.",
                    },
                    "query": {
                        "type": "string",
                        "description": "Gmail search query, e.g. 'after:2024/01/31'.",
                    },
                },
            }),
        ),
        function(
            "delete_message",
            "Delete an email message.",
            json!({
                "type": "object",
                "properties": {
                    "msg_id": {"type": "string", "description": "ID of the message to delete."},
                },
                "required": ["msg_id"],
            }),
        ),
        function(
            "classify_and_summarize_email",
            "Classify the email into one of CONCERN, QUESTION, RESPONSE IS AWAITED, \
             NEGATIVE SENTIMENT, summarize it, and return the category, summary and sender.",
            json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "enum": ["CONCERN", "QUESTION", "RESPONSE IS AWAITED", "NEGATIVE SENTIMENT"],
                    },
                    "summary": {"type": "string", "description": "Short summary of the email."},
                    "sender_email": {"type": "string", "description": "Sender of the email."},
                },
                "required": ["category", "summary", "sender_email"],
            }),
        ),
        function(
            "sentiment_analysis_email",
            "Classify the sentiment of the email as POSITIVE, NEGATIVE or NEUTRAL.",
            json!({
                "type": "object",
                "properties": {
                    "sentiment": {"type": "string", "enum": ["POSITIVE", "NEGATIVE", "NEUTRAL"]},
                },
                "required": ["sentiment"],
            }),
        ),
        function(
            "send_email",
            "Send a notification email with the given text to the configured recipient.",
            json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string", "description": "Body of the notification."},
                },
                "required": ["message"],
            }),
        ),
    ]
}

fn function(name: &str, description: &str, parameters: Value) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": parameters,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_are_unique_functions() {
        let defs = tool_definitions();
        let mut names: Vec<&str> = defs
            .iter()
            .map(|d| d["function"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.len(), 6);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 6);
        assert!(defs.iter().all(|d| d["type"] == "function"));
    }

    #[test]
    fn test_required_fields_are_declared_properties() {
        for def in tool_definitions() {
            let params = &def["function"]["parameters"];
            if let Some(required) = params["required"].as_array() {
                for field in required {
                    let field = field.as_str().unwrap();
                    assert!(
                        params["properties"].get(field).is_some(),
                        "{} missing from properties",
                        field
                    );
                }
            }
        }
    }
}
