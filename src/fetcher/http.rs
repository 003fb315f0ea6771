use crate::config::AppConfig;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::model::ScraperError;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub struct HttpFetcher {
    client: Client,
    max_retries: u8,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.request_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScraperError::HttpError(format!("header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScraperError::HttpError(format!("header value for {name}: {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ScraperError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchOutcome, ScraperError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ScraperError::Timeout
            } else {
                ScraperError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::EndOfPages);
        }
        if !status.is_success() {
            return Err(ScraperError::InvalidResponse(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScraperError::HttpError(e.to_string()))?;
        Ok(FetchOutcome::Page(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Transport failures and 5xx are worth another attempt; other statuses are final.
fn is_retryable(err: &ScraperError) -> bool {
    match err {
        ScraperError::HttpError(_) | ScraperError::Timeout => true,
        ScraperError::InvalidResponse(status) => *status >= 500,
    }
}

fn backoff(attempt: u8) -> Duration {
    let base = 500u64 << (attempt.saturating_sub(1)).min(6);
    let jitter = rand::rng().random_range(0..=base / 4);
    Duration::from_millis(base + jitter)
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ScraperError> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(url).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt <= self.max_retries && is_retryable(&e) => {
                    let delay = backoff(attempt);
                    warn!("Fetch attempt {} for {} failed: {}; retrying in {:?}", attempt, url, e, delay);
                    sleep(delay).await;
                }
                Err(e) => {
                    debug!("Giving up on {} after {} attempt(s)", url, attempt);
                    return Err(e);
                }
            }
        }
    }
}
