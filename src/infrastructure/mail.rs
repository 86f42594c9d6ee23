// Outgoing mail
// Sending is best effort: failures are logged and never reach the request path

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;
use thiserror::Error;
use url::form_urlencoded;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// A plain text message ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// Asks a new or changed address to be confirmed
    pub fn email_confirmation(to: &str, first_name: &str, token: &str, public_url: &str) -> Self {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("email", to)
            .append_pair("token", token)
            .finish();
        let link = format!(
            "{}/confirm_email?{}",
            public_url.trim_end_matches('/'),
            query
        );

        Self {
            to: to.to_string(),
            subject: "Confirm your email address".to_string(),
            body: format!(
                "Hi {},\n\n\
                 please confirm your email address by opening the link below:\n\
                 {}\n\n\
                 If you did not create an account, please ignore this email.",
                first_name, link
            ),
        }
    }

    /// Wraps a message a course admin sends to the participants
    pub fn course_notice(to: &str, course_name: &str, subject: &str, body: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("[{}] {}", course_name, subject),
            body: body.to_string(),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Sends mail through an SMTP relay
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, MailError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(skip(self, mail), fields(to = %mail.to))]
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.config.from.clone()))?,
            )
            .to(mail
                .to
                .parse()
                .map_err(|_| MailError::InvalidAddress(mail.to.clone()))?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        let transport = self.transport()?;

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::debug!("email sent");
        Ok(())
    }
}

/// Drops every message, only logging it
#[derive(Debug, Default)]
pub struct VoidMailer;

#[async_trait]
impl Mailer for VoidMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::debug!(to = %mail.to, subject = %mail.subject, "mail disabled, dropping message");
        Ok(())
    }
}

/// Picks the SMTP mailer when enabled, the void mailer otherwise
pub fn mailer_from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    if config.enabled {
        Arc::new(SmtpMailer::new(config.clone()))
    } else {
        Arc::new(VoidMailer)
    }
}

/// Sends `mails` in the background without waiting for the result
pub fn dispatch(mailer: Arc<dyn Mailer>, mails: Vec<OutgoingMail>) {
    if mails.is_empty() {
        return;
    }

    tokio::spawn(async move {
        for mail in mails {
            let to = mail.to.clone();
            if let Err(e) = mailer.send(mail).await {
                tracing::warn!(%to, error = %e, "failed to send email");
            }
        }
    });
}
