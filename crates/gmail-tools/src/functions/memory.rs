//! In-memory mailbox
//!
//! Used for testing the functions without network access. Search queries are
//! recorded but not evaluated.

use anyhow::{Result, bail};
use std::sync::RwLock;

use super::MailApi;
use crate::gmail::api::{GmailMessage, MessageRef, RawMessage, SentMessage};

/// In-memory implementation of MailApi
///
/// Messages are listed in insertion order. Sent messages are kept for
/// inspection and never appear in listings.
#[derive(Default)]
pub struct InMemoryMailApi {
    messages: RwLock<Vec<GmailMessage>>,
    sent: RwLock<Vec<RawMessage>>,
    queries: RwLock<Vec<Option<String>>>,
}

impl InMemoryMailApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message, replacing any existing message with the same ID
    pub fn insert(&self, message: GmailMessage) {
        let mut messages = self.messages.write().unwrap();
        match messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message,
            None => messages.push(message),
        }
    }

    pub fn message_ids(&self) -> Vec<String> {
        self.messages
            .read()
            .unwrap()
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    /// Raw messages passed to `send_message`, oldest first
    pub fn sent_messages(&self) -> Vec<RawMessage> {
        self.sent.read().unwrap().clone()
    }

    /// Queries passed to `list_message_refs`, oldest first
    pub fn queries(&self) -> Vec<Option<String>> {
        self.queries.read().unwrap().clone()
    }
}

impl MailApi for InMemoryMailApi {
    fn list_message_refs(
        &self,
        _user_id: &str,
        max_results: usize,
        query: Option<&str>,
    ) -> Result<Vec<MessageRef>> {
        self.queries.write().unwrap().push(query.map(str::to_string));

        Ok(self
            .messages
            .read()
            .unwrap()
            .iter()
            .take(max_results)
            .map(|m| MessageRef {
                id: m.id.clone(),
                thread_id: m.thread_id.clone(),
            })
            .collect())
    }

    fn get_message(&self, _user_id: &str, id: &str) -> Result<GmailMessage> {
        match self.messages.read().unwrap().iter().find(|m| m.id == id) {
            Some(message) => Ok(message.clone()),
            None => bail!("Message {} not found", id),
        }
    }

    fn delete_message(&self, _user_id: &str, id: &str) -> Result<()> {
        let mut messages = self.messages.write().unwrap();
        let before = messages.len();
        messages.retain(|m| m.id != id);
        if messages.len() == before {
            bail!("Message {} not found", id);
        }
        Ok(())
    }

    fn send_message(&self, _user_id: &str, message: &RawMessage) -> Result<SentMessage> {
        let mut sent = self.sent.write().unwrap();
        sent.push(message.clone());
        Ok(SentMessage {
            id: format!("sent-{}", sent.len()),
            thread_id: None,
            label_ids: Some(vec!["SENT".to_string()]),
        })
    }
}
