//! Email notification plumbing: sender abstractions, message templates, and
//! the durable outbox that decouples dispatch from the request path.

pub mod console;
pub mod outbox;
pub mod smtp;
pub mod templates;

pub use console::ConsoleEmailSender;
pub use outbox::{
    run_outbox_worker, NewNotification, NotificationKind, OutboxEntry, OutboxRepository,
};
pub use smtp::{SmtpEmailSender, SmtpSettings};

/// A rendered email ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Transport failure. The outbox worker turns these into retries.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("message could not be built: {0}")]
    Message(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Trait for delivering marketplace emails.
pub trait EmailSender: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

impl EmailSender for Box<dyn EmailSender> {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        (**self).send(message)
    }
}
