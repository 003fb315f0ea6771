use super::{Digest, Notifier};
use crate::config::{EmailCredentials, SmtpConfig};
use crate::model::NotifyError;

use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::time::Duration;

/// HTML digest over SMTP with implicit TLS.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(
        creds: &EmailCredentials,
        smtp: &SmtpConfig,
        site_name: &str,
    ) -> Result<Self, NotifyError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.server)
            .map_err(|e| NotifyError::Email(format!("invalid SMTP server {}: {e}", smtp.server)))?
            .port(smtp.port)
            .credentials(Credentials::new(creds.sender.to_string(), creds.password.clone()))
            .timeout(Some(Duration::from_secs(15)))
            .build();

        Ok(Self {
            mailer,
            from: Mailbox::new(Some(format!("{site_name}助手")), creds.sender.clone()),
            to: Mailbox::new(Some("用户".to_string()), creds.receiver.clone()),
        })
    }
}

fn build_message(from: &Mailbox, to: &Mailbox, digest: &Digest) -> Result<Message, NotifyError> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(digest.subject())
        .header(ContentType::TEXT_HTML)
        .body(digest.render_html())
        .map_err(|e| NotifyError::Email(format!("build e-mail: {e}")))
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotifyError> {
        let message = build_message(&self.from, &self.to, digest)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Email(format!("send e-mail: {e}")))?;
        Ok(())
    }
}
