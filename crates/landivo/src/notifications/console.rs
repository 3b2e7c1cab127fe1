use super::{EmailError, EmailMessage, EmailSender};

/// Development sender: logs the message instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

impl EmailSender for ConsoleEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email (console sender)"
        );
        Ok(())
    }
}
