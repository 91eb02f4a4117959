//! Domain models for message content

mod message;
mod summary;

pub use message::{MimePart, PartBody};
pub use summary::MailSummary;
