use crate::model::ScraperError;

/// What a single page request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response body of a 2xx answer.
    Page(String),
    /// The site answered "not found": pagination is exhausted.
    EndOfPages,
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ScraperError>;
}
