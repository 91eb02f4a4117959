//! Credential and notification settings
//!
//! OAuth client credentials are resolved in this order:
//! 1. Compile-time `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET`
//! 2. `google-credentials.json` in the config directory (Google Cloud Console format)
//! 3. Runtime `GMAIL_CLIENT_ID` / `GMAIL_CLIENT_SECRET`
//!
//! Notification addresses come from `notify.json` or `SENDER` / `RECIPIENT`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CREDENTIALS_FILE: &str = "google-credentials.json";
const TOKEN_FILE: &str = "gmail-tokens.json";
const NOTIFY_FILE: &str = "notify.json";

/// OAuth client credentials for Gmail API access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file; desktop apps get `installed`,
/// web clients get `web`
#[derive(Deserialize)]
struct CredentialFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
}

impl From<ClientSection> for GmailCredentials {
    fn from(section: ClientSection) -> Self {
        Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
        }
    }
}

impl GmailCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Resolve credentials from the first available source
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            let file: CredentialFile = config::load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(file);
        }

        Self::from_env()
    }

    /// Credentials baked in at build time, if both are set and non-empty
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID").filter(|s| !s.is_empty())?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET").filter(|s| !s.is_empty())?;
        Some(Self::new(client_id, client_secret))
    }

    /// Load a Google Cloud Console credential file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: CredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(file)
    }

    /// Parse a Google Cloud Console credential JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(file)
    }

    fn from_credential_file(file: CredentialFile) -> Result<Self> {
        file.installed
            .or(file.web)
            .map(Self::from)
            .context("Credentials file missing 'installed' or 'web' section")
    }

    /// Read `GMAIL_CLIENT_ID` and `GMAIL_CLIENT_SECRET`
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;
        Ok(Self::new(client_id, client_secret))
    }

    /// Where [`load`](Self::load) looks for the credential file
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }

    /// Where OAuth tokens are stored by default
    pub fn default_token_path() -> Option<PathBuf> {
        config::config_path(TOKEN_FILE)
    }
}

/// Sender and recipient of notification emails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub sender: String,
    pub recipient: String,
}

impl NotifyConfig {
    /// `notify.json` in the config directory, falling back to the environment
    pub fn load() -> Result<Self> {
        if config::config_exists(NOTIFY_FILE) {
            return config::load_json(NOTIFY_FILE);
        }
        Self::from_env()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Read `SENDER` and `RECIPIENT`
    pub fn from_env() -> Result<Self> {
        let sender = std::env::var("SENDER").context("SENDER environment variable not set")?;
        let recipient =
            std::env::var("RECIPIENT").context("RECIPIENT environment variable not set")?;
        Ok(Self { sender, recipient })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_installed_credentials() {
        let json = r#"{
            "installed": {
                "client_id": "test-client-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(
            creds,
            GmailCredentials::new("test-client-id.apps.googleusercontent.com", "test-secret")
        );
    }

    #[test]
    fn test_parse_web_credentials() {
        let json = r#"{"web": {"client_id": "web-id", "client_secret": "web-secret"}}"#;
        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id");
        assert_eq!(creds.client_secret, "web-secret");
    }

    #[test]
    fn test_installed_takes_priority_over_web() {
        let json = r#"{
            "installed": {"client_id": "desktop", "client_secret": "a"},
            "web": {"client_id": "web", "client_secret": "b"}
        }"#;
        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "desktop");
    }

    #[test]
    fn test_missing_section_is_error() {
        let err = GmailCredentials::from_json(r#"{ "other": {} }"#).unwrap_err();
        assert!(err.to_string().contains("'installed' or 'web'"));
    }

    #[test]
    fn test_default_paths_share_config_dir() {
        let creds = GmailCredentials::default_credentials_path().unwrap();
        let tokens = GmailCredentials::default_token_path().unwrap();
        assert_eq!(creds.parent(), tokens.parent());
        assert!(tokens.ends_with("gmail-tokens.json"));
    }

    #[test]
    fn test_notify_config_json() {
        let notify: NotifyConfig =
            serde_json::from_str(r#"{"sender": "bot@example.com", "recipient": "me@example.com"}"#)
                .unwrap();
        assert_eq!(notify.sender, "bot@example.com");
        assert_eq!(notify.recipient, "me@example.com");
    }
}
