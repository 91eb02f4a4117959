//! Mail functions exposed to a function-calling LLM harness
//!
//! Every function returns a string the harness can hand straight back to the
//! model. Mailbox access goes through [`MailApi`] so the functions run the
//! same against Gmail or the in-memory fake.

mod api;
mod compose;
mod handler;
mod memory;
mod tools;

pub use api::MailApi;
pub use compose::create_message;
pub use handler::{DEFAULT_MAX_RESULTS, MailFunctions, NOTIFICATION_SUBJECT};
pub use memory::InMemoryMailApi;
pub use tools::tool_definitions;

/// Failure to route or run a function call
#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("invalid arguments for {function}: {source}")]
    InvalidArguments {
        function: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("notification sender and recipient are not configured")]
    NotifyNotConfigured,
}
