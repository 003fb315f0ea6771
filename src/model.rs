// Core structs: Record, RawEntry and the error types shared across modules
use chrono::NaiveDate;
use thiserror::Error;

/// One listing row as it appears in the markup, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub date_text: String,
    pub title: String,
    pub href: String,
}

/// A crawled announcement with a parsed date and an absolute link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDate,
    pub title: String,
    pub link: String,
}

impl Record {
    /// Deduplication fingerprint. The link is deliberately not part of it,
    /// so two postings with the same date and title collapse into one.
    pub fn identity_key(&self) -> String {
        identity_key(self.date, &self.title)
    }
}

pub fn identity_key(date: NaiveDate, title: &str) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), title)
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    InvalidResponse(u16),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("listing container `{0}` not found")]
    MissingContainer(String),
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("ledger key contains a line break: {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("channel unreachable")]
    Unreachable,
    #[error("e-mail error: {0}")]
    Email(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_joins_date_and_title() {
        let record = Record {
            date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            title: "江苏某单位招聘公告".into(),
            link: "https://example.com/a.html".into(),
        };
        assert_eq!(record.identity_key(), "2026-01-20_江苏某单位招聘公告");
    }

    #[test]
    fn identity_key_ignores_link() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let a = Record { date, title: "同名公告".into(), link: "https://a.example/1".into() };
        let b = Record { date, title: "同名公告".into(), link: "https://b.example/2".into() };
        assert_eq!(a.identity_key(), b.identity_key());
    }
}
