//! Mailbox operations the functions depend on

use anyhow::Result;

use crate::gmail::GmailClient;
use crate::gmail::api::{GmailMessage, MessageRef, RawMessage, SentMessage};

/// Mailbox access used by [`MailFunctions`](super::MailFunctions)
///
/// Implemented by [`GmailClient`] for real mailboxes and by
/// [`InMemoryMailApi`](super::InMemoryMailApi) for tests.
pub trait MailApi: Send + Sync {
    /// Up to `max_results` message references matching `query`
    fn list_message_refs(
        &self,
        user_id: &str,
        max_results: usize,
        query: Option<&str>,
    ) -> Result<Vec<MessageRef>>;

    /// Full message by ID
    fn get_message(&self, user_id: &str, id: &str) -> Result<GmailMessage>;

    /// Permanently delete a message
    fn delete_message(&self, user_id: &str, id: &str) -> Result<()>;

    /// Send a raw message
    fn send_message(&self, user_id: &str, message: &RawMessage) -> Result<SentMessage>;
}

impl MailApi for GmailClient {
    fn list_message_refs(
        &self,
        user_id: &str,
        max_results: usize,
        query: Option<&str>,
    ) -> Result<Vec<MessageRef>> {
        let response = self.list_messages(user_id, max_results, query)?;
        Ok(response.messages.unwrap_or_default())
    }

    fn get_message(&self, user_id: &str, id: &str) -> Result<GmailMessage> {
        GmailClient::get_message(self, user_id, id)
    }

    fn delete_message(&self, user_id: &str, id: &str) -> Result<()> {
        GmailClient::delete_message(self, user_id, id)
    }

    fn send_message(&self, user_id: &str, message: &RawMessage) -> Result<SentMessage> {
        GmailClient::send_message(self, user_id, message)
    }
}
