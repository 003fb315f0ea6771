// notifier/telegram.rs

use super::{Digest, Notifier};
use crate::model::NotifyError;

use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

const TELEGRAM_API: &str = "https://api.telegram.org";
/// Telegram rejects messages above 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4000;

pub struct TelegramNotifier {
    bot_token: String,
    chat_id: i64,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: i64) -> Self {
        Self {
            bot_token,
            chat_id,
            client: Client::new(),
        }
    }

    fn message(digest: &Digest) -> String {
        let text = format!("{}\n\n{}", digest.subject(), digest.render_text());
        if text.chars().count() <= MAX_MESSAGE_CHARS {
            return text;
        }
        let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
        cut.push('…');
        cut
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API, self.bot_token);
        let params = [
            ("chat_id", self.chat_id.to_string()),
            ("text", Self::message(digest)),
        ];

        let response = match timeout(
            Duration::from_secs(10),
            self.client.post(&url).form(&params).send(),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                warn!("❌ Telegram send() failed: {:?}", e);
                return Err(NotifyError::ApiError(format!("Send failed: {}", e)));
            }
            Err(_) => {
                warn!("⏳ Telegram send() timed out");
                return Err(NotifyError::Unreachable);
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "unknown".into());
        if !status.is_success() {
            warn!("❌ Telegram API responded [{}]: {}", status, body);
            return Err(NotifyError::ApiError(format!("Telegram API responded [{}]: {}", status, body)));
        }
        info!("✅ Telegram response [{}]", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use chrono::NaiveDate;

    #[test]
    fn long_digests_are_truncated() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let records = (0..200)
            .map(|i| Record {
                date,
                title: format!("江苏某单位第{i}批招聘公告"),
                link: format!("https://rcyjw.com/view/{i}.html"),
            })
            .collect();
        let digest = Digest {
            run_date: date,
            site_name: "人才引进网".into(),
            site_url: "https://rcyjw.com/type_0.html".into(),
            repo_url: None,
            include_keywords: vec!["江苏".into()],
            exclude_keywords: vec![],
            records,
        };
        let message = TelegramNotifier::message(&digest);
        assert_eq!(message.chars().count(), MAX_MESSAGE_CHARS);
        assert!(message.ends_with('…'));
    }
}
