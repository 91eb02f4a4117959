//! Gmail API HTTP client
//!
//! Blocking calls to the `users.messages` endpoints.

use anyhow::{Context, Result};
use log::debug;

use super::GmailAuth;
use super::api::{GmailMessage, ListMessagesResponse, RawMessage, SentMessage};

/// Gmail API client for the message endpoints
pub struct GmailClient {
    auth: GmailAuth,
}

impl GmailClient {
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Upper bound Gmail accepts for `maxResults`
    const MAX_PAGE_SIZE: usize = 500;

    pub fn new(auth: GmailAuth) -> Self {
        Self { auth }
    }

    /// Run the OAuth flow now instead of on the first request
    pub fn authenticate(&self) -> Result<()> {
        self.auth.access_token()?;
        Ok(())
    }

    pub fn auth(&self) -> &GmailAuth {
        &self.auth
    }

    fn messages_url(user_id: &str) -> String {
        format!(
            "{}/users/{}/messages",
            Self::BASE_URL,
            urlencoding::encode(user_id)
        )
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.access_token()?))
    }

    /// List one page of message references
    ///
    /// # Arguments
    /// * `user_id` - Mailbox owner; `"me"` is the authenticated user
    /// * `max_results` - Page size, clamped to 1-500
    /// * `query` - Gmail search query, e.g. `after:2024/01/31`
    pub fn list_messages(
        &self,
        user_id: &str,
        max_results: usize,
        query: Option<&str>,
    ) -> Result<ListMessagesResponse> {
        let mut url = format!(
            "{}?maxResults={}",
            Self::messages_url(user_id),
            max_results.clamp(1, Self::MAX_PAGE_SIZE)
        );
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push_str(&format!("&q={}", urlencoding::encode(q)));
        }

        debug!("GET {}", url);
        let mut response = ureq::get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send list messages request")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse list messages response")
    }

    /// Fetch a full message including its MIME tree
    pub fn get_message(&self, user_id: &str, id: &str) -> Result<GmailMessage> {
        let url = format!(
            "{}/{}?format=full",
            Self::messages_url(user_id),
            urlencoding::encode(id)
        );

        let mut response = ureq::get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .with_context(|| format!("Failed to fetch message {}", id))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse message {}", id))
    }

    /// Permanently delete a message (bypasses trash)
    pub fn delete_message(&self, user_id: &str, id: &str) -> Result<()> {
        let url = format!("{}/{}", Self::messages_url(user_id), urlencoding::encode(id));

        ureq::delete(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .with_context(|| format!("Failed to delete message {}", id))?;

        Ok(())
    }

    /// Send a base64url-encoded RFC 5322 message
    pub fn send_message(&self, user_id: &str, message: &RawMessage) -> Result<SentMessage> {
        let url = format!("{}/send", Self::messages_url(user_id));

        let mut response = ureq::post(&url)
            .header("Authorization", &self.bearer()?)
            .send_json(message)
            .context("Failed to send message")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse send message response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url_encodes_user_id() {
        assert_eq!(
            GmailClient::messages_url("me"),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages"
        );
        assert_eq!(
            GmailClient::messages_url("a+b@example.com"),
            "https://gmail.googleapis.com/gmail/v1/users/a%2Bb%40example.com/messages"
        );
    }
}
