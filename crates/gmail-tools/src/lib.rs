//! Gmail tools for function-calling LLM harnesses
//!
//! This crate provides:
//! - Body extraction: MIME part tree to one normalized plain-text string
//! - A typed message model validated at the API boundary
//! - Gmail API client and OAuth authentication
//! - The mail functions exposed to the harness, with JSON tool definitions
//!
//! Everything is synchronous; the HTTP client is `ureq`.

pub mod body;
pub mod config;
pub mod functions;
pub mod gmail;
pub mod models;

pub use body::{BodyError, DecodeError, clean_body, extract_body, html_to_text};
pub use config::{GmailCredentials, NotifyConfig};
pub use functions::{
    FunctionError, InMemoryMailApi, MailApi, MailFunctions, create_message, tool_definitions,
};
pub use gmail::{GmailAuth, GmailClient, api::RawMessage};
pub use models::{MailSummary, MimePart, PartBody};
