use async_trait::async_trait;
use lettre::message::header;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::notifiers::Notifier;
use crate::utils::error::{AppError, Result};

/// Delivers alerts over SMTP. Transport and sender identity come from
/// configuration; recipients are resolved per message.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| AppError::Notify(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = format!("{} <{}>", config.from_name, config.from_address)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Notify(format!("invalid from address: {}", e)))?;

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<()> {
        let to = to_email
            .parse::<Mailbox>()
            .map_err(|e| AppError::Notify(format!("invalid recipient {}: {}", to_email, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Notify(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| AppError::Notify(e.to_string()))?;

        Ok(())
    }
}
