// Notification fan-out over independently configured channels
pub mod digest;
pub mod email;
pub mod pushplus;
pub mod telegram;

pub use digest::Digest;
pub use email::EmailNotifier;
pub use pushplus::PushPlusNotifier;
pub use telegram::TelegramNotifier;

use crate::config::{ChannelConfig, SmtpConfig};
use crate::model::NotifyError;

use futures::future::join_all;
use tracing::{info, warn};

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, digest: &Digest) -> Result<(), NotifyError>;
}

/// Sends a digest to every channel; one channel failing never blocks the others.
#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Enables each channel whose credentials are present.
    pub fn from_config(channels: &ChannelConfig, smtp: &SmtpConfig, site_name: &str) -> Self {
        let mut enabled: Vec<Box<dyn Notifier>> = Vec::new();

        if let Some(token) = &channels.pushplus_token {
            enabled.push(Box::new(PushPlusNotifier::new(token.clone())));
        }
        if let Some(creds) = &channels.email {
            match EmailNotifier::new(creds, smtp, site_name) {
                Ok(notifier) => enabled.push(Box::new(notifier)),
                Err(e) => warn!("E-mail channel disabled: {}", e),
            }
        }
        if let Some(creds) = &channels.telegram {
            enabled.push(Box::new(TelegramNotifier::new(creds.bot_token.clone(), creds.chat_id)));
        }

        info!(
            "Notification channels: [{}]",
            enabled.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
        );
        Self::new(enabled)
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Returns how many channels delivered. Nothing is sent for an empty digest.
    pub async fn notify(&self, digest: &Digest) -> usize {
        if digest.is_empty() {
            info!("No new records, skipping notification");
            return 0;
        }
        if self.channels.is_empty() {
            info!("No notification channel configured");
            return 0;
        }

        info!("Sending notification: {}", digest.subject());
        let results = join_all(
            self.channels
                .iter()
                .map(|channel| async move { (channel.name(), channel.send(digest).await) }),
        )
        .await;

        let mut delivered = 0;
        for (name, result) in results {
            match result {
                Ok(()) => {
                    info!("{} notification delivered", name);
                    delivered += 1;
                }
                Err(e) => warn!("{} notification failed: {}", name, e),
            }
        }
        delivered
    }
}
