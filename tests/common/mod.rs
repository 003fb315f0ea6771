// Shared test doubles: a scripted fetcher and a recording notification channel.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use listing_sniper::fetcher::{FetchOutcome, Fetcher};
use listing_sniper::filter::KeywordFilter;
use listing_sniper::model::{NotifyError, ScraperError};
use listing_sniper::notifier::{Digest, Notifier};
use listing_sniper::CrawlSettings;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const BASE: &str = "https://rcyjw.com/type_0.html";

pub fn page(n: usize) -> String {
    if n <= 1 {
        BASE.to_string()
    } else {
        format!("https://rcyjw.com/type_0_{}.html", n - 1)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Renders a listing page with `(date, title, href)` rows.
pub fn listing(rows: &[(&str, &str, &str)]) -> String {
    let mut items = String::new();
    for (date, title, href) in rows {
        items.push_str(&format!("<li><em>{date}</em><a href=\"{href}\">{title}</a></li>"));
    }
    format!("<html><body><ul class=\"lie1\">{items}</ul></body></html>")
}

pub enum Script {
    Page(String),
    NotFound,
    Fail,
}

/// Serves scripted responses; unknown URLs answer "not found".
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, Script>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, script: Script) -> Self {
        self.pages.insert(url.into(), script);
        self
    }

    pub fn with_page(self, n: usize, rows: &[(&str, &str, &str)]) -> Self {
        self.with(page(n), Script::Page(listing(rows)))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ScraperError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(Script::Page(html)) => Ok(FetchOutcome::Page(html.clone())),
            Some(Script::NotFound) | None => Ok(FetchOutcome::EndOfPages),
            Some(Script::Fail) => Err(ScraperError::HttpError("connection reset".into())),
        }
    }
}

pub fn settings(start_date: NaiveDate, include: &[&str], exclude: &[&str]) -> CrawlSettings {
    CrawlSettings {
        start_url: Url::parse(BASE).unwrap(),
        start_date,
        filter: KeywordFilter::new(
            include.iter().map(|s| s.to_string()).collect(),
            exclude.iter().map(|s| s.to_string()).collect(),
        ),
        page_delay: Duration::ZERO,
        max_pages: 50,
    }
}

/// Records the titles of every digest it receives; optionally fails each send.
#[derive(Clone)]
pub struct RecordingNotifier {
    name: &'static str,
    fail: bool,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingNotifier {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, digest: &Digest) -> Result<(), NotifyError> {
        let titles = digest.records.iter().map(|r| r.title.clone()).collect();
        self.calls.lock().unwrap().push(titles);
        if self.fail {
            Err(NotifyError::Unreachable)
        } else {
            Ok(())
        }
    }
}
