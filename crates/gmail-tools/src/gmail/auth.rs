//! Gmail OAuth2 authentication
//!
//! Installed-app authorization code flow with a loopback redirect. The
//! credentials and the token file location are passed in explicitly; nothing
//! is cached process-wide.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use crate::config::GmailCredentials;

/// Seconds before expiry at which a stored token is considered stale
const EXPIRY_BUFFER_SECS: i64 = 300;

/// OAuth2 token management for one set of client credentials
pub struct GmailAuth {
    credentials: GmailCredentials,
    token_path: PathBuf,
}

/// Token data persisted between runs
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl GmailAuth {
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Read messages, send notifications, delete messages
    const SCOPES: [&'static str; 3] = [
        "https://www.googleapis.com/auth/gmail.readonly",
        "https://www.googleapis.com/auth/gmail.send",
        "https://www.googleapis.com/auth/gmail.modify",
    ];

    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    /// Create an authenticator that stores tokens at `token_path`
    pub fn new(credentials: GmailCredentials, token_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            token_path: token_path.into(),
        }
    }

    /// Create an authenticator using the token file in the config directory
    pub fn with_default_token_path(credentials: GmailCredentials) -> Result<Self> {
        let token_path = GmailCredentials::default_token_path()
            .context("Could not determine config directory")?;
        Ok(Self::new(credentials, token_path))
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Get a valid access token, refreshing or re-authenticating as needed
    pub fn access_token(&self) -> Result<String> {
        match self.load_token() {
            Ok(token) => {
                if is_fresh(token.expires_at, chrono::Utc::now().timestamp()) {
                    return Ok(token.access_token);
                }

                if let Some(refresh_token) = token.refresh_token {
                    match self.refresh_access_token(&refresh_token) {
                        Ok(new_token) => {
                            debug!("Refreshed Gmail access token");
                            self.save_token(&new_token)?;
                            return Ok(new_token.access_token);
                        }
                        Err(e) => warn!("Token refresh failed, re-authenticating: {:#}", e),
                    }
                }
            }
            Err(e) => debug!("No usable stored token at {}: {:#}", self.token_path.display(), e),
        }

        let token = self.authorization_code_auth()?;
        self.save_token(&token)?;
        Ok(token.access_token)
    }

    /// Run the browser consent flow and exchange the code for tokens
    fn authorization_code_auth(&self) -> Result<TokenResponse> {
        let (listener, port) = self.start_local_server()?;
        let redirect_uri = format!("http://localhost:{}", port);

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(&Self::SCOPES.join(" ")),
        );

        // Prompts go to stderr; stdout carries function results
        eprintln!("\n=== Gmail Authentication Required ===");
        eprintln!("If the browser doesn't open, visit: {}", auth_url);
        if let Err(e) = open::that(&auth_url) {
            warn!("Failed to open browser: {}", e);
        }

        info!("Waiting for OAuth callback on port {}", port);
        let code = self.wait_for_callback(listener)?;

        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;

        info!("Gmail authentication successful");
        Ok(token)
    }

    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        (Self::PORT_RANGE_START..=Self::PORT_RANGE_END)
            .find_map(|port| {
                TcpListener::bind(("127.0.0.1", port))
                    .ok()
                    .map(|listener| (listener, port))
            })
            .with_context(|| {
                format!(
                    "Could not bind to any port in range {}-{}",
                    Self::PORT_RANGE_START,
                    Self::PORT_RANGE_END
                )
            })
    }

    /// Accept one redirect and pull the authorization code out of it
    fn wait_for_callback(&self, listener: TcpListener) -> Result<String> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut request_line = String::new();
        BufReader::new(&stream)
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let code = query_param(&request_line, "code");
        let error = query_param(&request_line, "error");

        let (status, body) = if code.is_some() {
            ("200 OK", "Authentication successful! You can close this window.")
        } else {
            ("400 Bad Request", "Authentication failed. Please try again.")
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        // Browser may already be gone
        stream.write_all(response.as_bytes()).ok();

        if let Some(err) = error {
            anyhow::bail!("OAuth error: {}", err);
        }
        code.context("No authorization code received")
    }

    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let mut token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        // Google omits the refresh token on refresh
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }

    fn load_token(&self) -> Result<StoredToken> {
        config::load_json_file(&self.token_path)
    }

    fn save_token(&self, token: &TokenResponse) -> Result<()> {
        let stored = StoredToken {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs as i64),
        };
        config::save_json_file(&self.token_path, &stored)
    }

    /// Remove stored tokens
    pub fn logout(&self) -> Result<()> {
        if self.token_path.exists() {
            std::fs::remove_file(&self.token_path).with_context(|| {
                format!("Failed to remove token file: {}", self.token_path.display())
            })?;
            info!("Removed stored Gmail tokens");
        }
        Ok(())
    }
}

/// Whether a token expiring at `expires_at` is still usable at `now`
fn is_fresh(expires_at: Option<i64>, now: i64) -> bool {
    expires_at.is_some_and(|at| at > now + EXPIRY_BUFFER_SECS)
}

/// Value of `name` in the query string of an HTTP request line
/// (`GET /?code=abc&scope=... HTTP/1.1`)
fn query_param(request_line: &str, name: &str) -> Option<String> {
    let target = request_line.split_whitespace().nth(1)?;
    let (_, query) = target.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_code() {
        let line = "GET /?code=4%2F0Abc&scope=https%3A%2F%2Fmail HTTP/1.1\r\n";
        assert_eq!(query_param(line, "code"), Some("4/0Abc".to_string()));
        assert_eq!(query_param(line, "error"), None);
    }

    #[test]
    fn test_query_param_error() {
        let line = "GET /?error=access_denied HTTP/1.1\r\n";
        assert_eq!(query_param(line, "error"), Some("access_denied".to_string()));
        assert_eq!(query_param(line, "code"), None);
    }

    #[test]
    fn test_query_param_no_query() {
        assert_eq!(query_param("GET /favicon.ico HTTP/1.1", "code"), None);
        assert_eq!(query_param("", "code"), None);
    }

    #[test]
    fn test_is_fresh() {
        let now = 1_700_000_000;
        assert!(is_fresh(Some(now + 3600), now));
        assert!(!is_fresh(Some(now + 60), now));
        assert!(!is_fresh(Some(now - 10), now));
        assert!(!is_fresh(None, now));
    }

    #[test]
    fn test_logout_removes_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmail-tokens.json");
        std::fs::write(&path, r#"{"access_token": "a"}"#).unwrap();

        let auth = GmailAuth::new(GmailCredentials::new("id", "secret"), &path);
        auth.logout().unwrap();
        assert!(!path.exists());

        // Second logout is a no-op
        auth.logout().unwrap();
    }

    #[test]
    fn test_stored_token_round_trip_through_config() {
        let dir = tempfile::tempdir().unwrap();
        let auth = GmailAuth::new(
            GmailCredentials::new("id", "secret"),
            dir.path().join("tokens").join("gmail-tokens.json"),
        );

        auth.save_token(&TokenResponse {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_in: Some(3600),
        })
        .unwrap();

        let stored = auth.load_token().unwrap();
        assert_eq!(stored.access_token, "access");
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh"));
        assert!(is_fresh(stored.expires_at, chrono::Utc::now().timestamp()));
    }
}
