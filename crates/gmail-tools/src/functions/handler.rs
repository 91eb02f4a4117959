//! Function implementations and name-based dispatch

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{FunctionError, MailApi, create_message};
use crate::config::NotifyConfig;
use crate::gmail::summarize_message;

/// Page size when the model does not ask for one
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Subject line of every notification email
pub const NOTIFICATION_SUBJECT: &str = "Important. Attention is required!";

/// Separator between per-message JSON objects in `list_messages` output
const MESSAGE_SEPARATOR: &str = "|";

/// The mail functions bound to one mailbox
pub struct MailFunctions {
    api: Arc<dyn MailApi>,
    user_id: String,
    notify: Option<NotifyConfig>,
}

#[derive(Debug, Serialize)]
struct EmailClassification<'a> {
    email_category: &'a str,
    email_summary: &'a str,
    sender_email: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListMessagesArgs {
    #[serde(default = "default_max_results")]
    max_results: usize,
    #[serde(default)]
    query: Option<String>,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

#[derive(Debug, Deserialize)]
struct DeleteMessageArgs {
    msg_id: String,
}

#[derive(Debug, Deserialize)]
struct ClassifyArgs {
    category: String,
    summary: String,
    sender_email: String,
}

#[derive(Debug, Deserialize)]
struct SentimentArgs {
    sentiment: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailArgs {
    message: String,
}

impl MailFunctions {
    /// Bind the functions to `user_id`'s mailbox (`"me"` for the authenticated user)
    pub fn new(api: Arc<dyn MailApi>, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            notify: None,
        }
    }

    /// Enable `send_email` with the given addresses
    pub fn with_notify(mut self, notify: NotifyConfig) -> Self {
        self.notify = Some(notify);
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Today's date for the model to build `after:` queries from
    pub fn get_current_date(&self) -> String {
        format_current_date(&Local::now())
    }

    /// List messages matching `query` as `|`-joined JSON objects with
    /// `sender`, `subject` and `body` keys.
    ///
    /// A message whose body cannot be extracted is still listed, with a null
    /// body. Failing to list or fetch is an error.
    pub fn list_messages(&self, max_results: usize, query: Option<&str>) -> Result<String> {
        let refs = self.api.list_message_refs(&self.user_id, max_results, query)?;
        info!(
            "Listing {} messages for {} (query: {:?})",
            refs.len(),
            self.user_id,
            query
        );

        let mut entries = Vec::with_capacity(refs.len());
        for msg_ref in &refs {
            let message = self.api.get_message(&self.user_id, &msg_ref.id)?;
            entries.push(summarize_message(&message).to_json()?);
        }

        Ok(entries.join(MESSAGE_SEPARATOR))
    }

    pub fn delete_message(&self, msg_id: &str) -> Result<String> {
        self.api.delete_message(&self.user_id, msg_id)?;
        info!("Deleted message {}", msg_id);
        Ok(format!("Message with ID: {} deleted successfully.", msg_id))
    }

    /// Record the model's classification of an email and echo it back as JSON.
    ///
    /// Categories are CONCERN, QUESTION, RESPONSE IS AWAITED and
    /// NEGATIVE SENTIMENT; they are not validated.
    pub fn classify_and_summarize_email(
        &self,
        category: &str,
        summary: &str,
        sender_email: &str,
    ) -> Result<String> {
        info!("Email from {} classified as {}: {}", sender_email, category, summary);
        Ok(serde_json::to_string(&EmailClassification {
            email_category: category,
            email_summary: summary,
            sender_email,
        })?)
    }

    /// Record the model's sentiment (POSITIVE, NEGATIVE or NEUTRAL)
    pub fn sentiment_analysis_email(&self, sentiment: &str) -> String {
        info!("Sentiment: {}", sentiment);
        sentiment.to_string()
    }

    /// Send `message` as a notification to the configured recipient
    pub fn send_email(&self, message: &str) -> Result<String> {
        let notify = self.notify.as_ref().ok_or(FunctionError::NotifyNotConfigured)?;
        let raw = create_message(
            &notify.sender,
            &notify.recipient,
            NOTIFICATION_SUBJECT,
            message,
        )?;

        let sent = self.api.send_message(&self.user_id, &raw)?;
        info!("Notification sent to {}, message id {}", notify.recipient, sent.id);
        Ok("The notification email has been sent successfully.".to_string())
    }

    /// Run the function `name` with JSON-encoded `arguments`.
    ///
    /// Blank arguments are treated as `{}`.
    pub fn dispatch(&self, name: &str, arguments: &str) -> Result<String> {
        debug!("Dispatching {} with {}", name, arguments);
        match name {
            "get_current_date" => Ok(self.get_current_date()),
            "list_messages" => {
                let args: ListMessagesArgs = parse_args(name, arguments)?;
                self.list_messages(args.max_results, args.query.as_deref())
            }
            "delete_message" => {
                let args: DeleteMessageArgs = parse_args(name, arguments)?;
                self.delete_message(&args.msg_id)
            }
            "classify_and_summarize_email" => {
                let args: ClassifyArgs = parse_args(name, arguments)?;
                self.classify_and_summarize_email(&args.category, &args.summary, &args.sender_email)
            }
            "sentiment_analysis_email" => {
                let args: SentimentArgs = parse_args(name, arguments)?;
                Ok(self.sentiment_analysis_email(&args.sentiment))
            }
            "send_email" => {
                let args: SendEmailArgs = parse_args(name, arguments)?;
                self.send_email(&args.message)
            }
            other => Err(FunctionError::UnknownFunction(other.to_string()).into()),
        }
    }
}

fn parse_args<T: DeserializeOwned>(function: &str, arguments: &str) -> Result<T, FunctionError> {
    let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
    serde_json::from_str(arguments).map_err(|source| FunctionError::InvalidArguments {
        function: function.to_string(),
        source,
    })
}

fn format_current_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("the current date (today) is: {}", now.format("%Y/%m/%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::InMemoryMailApi;
    use chrono::Utc;

    fn functions() -> MailFunctions {
        MailFunctions::new(Arc::new(InMemoryMailApi::new()), "me")
    }

    #[test]
    fn test_format_current_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(
            format_current_date(&date),
            "the current date (today) is: 2024/03/07"
        );
    }

    #[test]
    fn test_classify_escapes_json() {
        let out = functions()
            .classify_and_summarize_email("QUESTION", "Asks \"when?\"", "a@example.com")
            .unwrap();
        assert_eq!(
            out,
            r#"{"email_category":"QUESTION","email_summary":"Asks \"when?\"","sender_email":"a@example.com"}"#
        );
    }

    #[test]
    fn test_sentiment_is_echoed() {
        assert_eq!(functions().sentiment_analysis_email("NEUTRAL"), "NEUTRAL");
    }

    #[test]
    fn test_parse_args_blank_is_empty_object() {
        let args: ListMessagesArgs = parse_args("list_messages", "  ").unwrap();
        assert_eq!(args.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(args.query, None);
    }

    #[test]
    fn test_parse_args_reports_function() {
        let err = parse_args::<DeleteMessageArgs>("delete_message", "{}").unwrap_err();
        assert!(err.to_string().starts_with("invalid arguments for delete_message"));
    }

    #[test]
    fn test_send_email_requires_notify_config() {
        let err = functions().send_email("hello").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FunctionError>(),
            Some(FunctionError::NotifyNotConfigured)
        ));
    }

    #[test]
    fn test_dispatch_unknown_function() {
        let err = functions().dispatch("archive_everything", "{}").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FunctionError>(),
            Some(FunctionError::UnknownFunction(name)) if name == "archive_everything"
        ));
    }
}
