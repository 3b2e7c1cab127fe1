use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};

use super::{EmailError, EmailMessage, EmailSender};

/// SMTP connection settings, loaded from `SMTP_*` environment variables.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl SmtpSettings {
    /// Returns `None` when the required variables are absent, which selects
    /// the console sender instead.
    pub fn from_env() -> Option<Self> {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|value| !value.is_empty())
        }

        let host = get_env("SMTP_HOST")?;
        let username = get_env("SMTP_USERNAME")?;
        let password = get_env("SMTP_PASSWORD")?;
        let from_email = get_env("SMTP_FROM_EMAIL")?;

        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(465);
        let from_name = get_env("SMTP_FROM_NAME");

        Some(Self {
            host,
            port,
            username,
            password,
            from_email,
            from_name,
        })
    }
}

/// Production sender backed by an SMTP relay.
pub struct SmtpEmailSender {
    transport: SmtpTransport,
    from_email: String,
    from_name: Option<String>,
}

impl SmtpEmailSender {
    pub fn new(settings: SmtpSettings) -> Result<Self, EmailError> {
        let creds = Credentials::new(settings.username, settings.password);

        let transport = SmtpTransport::relay(&settings.host)
            .map_err(|err| EmailError::Transport(err.to_string()))?
            .port(settings.port)
            .credentials(creds)
            .build();

        tracing::info!(host = %settings.host, port = settings.port, "smtp sender configured");

        Ok(Self {
            transport,
            from_email: settings.from_email,
            from_name: settings.from_name,
        })
    }

    fn from_address(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{} <{}>", name, self.from_email),
            None => self.from_email.clone(),
        }
    }
}

impl EmailSender for SmtpEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let from = self
            .from_address()
            .parse()
            .map_err(|_| EmailError::Address(self.from_address()))?;
        let to = message
            .to
            .parse()
            .map_err(|_| EmailError::Address(message.to.clone()))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| EmailError::Message(err.to_string()))?;

        self.transport
            .send(&email)
            .map_err(|err| EmailError::Transport(err.to_string()))?;

        tracing::info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}
