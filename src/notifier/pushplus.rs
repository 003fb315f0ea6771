use super::{Digest, Notifier};
use crate::model::NotifyError;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const PUSHPLUS_ENDPOINT: &str = "http://www.pushplus.plus/send";

/// WeChat delivery through the PushPlus relay.
pub struct PushPlusNotifier {
    token: String,
    endpoint: String,
    client: Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct PushPlusPayload<'a> {
    token: &'a str,
    title: String,
    content: String,
    template: &'static str,
}

#[derive(Deserialize)]
struct PushPlusResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
}

impl PushPlusNotifier {
    pub fn new(token: String) -> Self {
        Self {
            token,
            endpoint: PUSHPLUS_ENDPOINT.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn payload<'a>(&'a self, digest: &Digest) -> PushPlusPayload<'a> {
        PushPlusPayload {
            token: &self.token,
            title: digest.subject(),
            content: digest.render_text().replace('\n', "<br>"),
            template: "html",
        }
    }
}

#[async_trait::async_trait]
impl Notifier for PushPlusNotifier {
    fn name(&self) -> &'static str {
        "pushplus"
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&self.payload(digest))
            .send()
            .await
            .map_err(|e| NotifyError::ApiError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(NotifyError::ApiError(format!("HTTP {}", response.status())));
        }

        let body: PushPlusResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::ApiError(format!("unreadable response: {e}")))?;
        if body.code != 200 {
            return Err(NotifyError::ApiError(format!(
                "code {}: {}",
                body.code,
                body.msg.unwrap_or_default()
            )));
        }
        Ok(())
    }
}
