// Crawl controller: page-by-page traversal with date cutoff, filtering and dedup
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::filter::{FilterVerdict, KeywordFilter};
use crate::model::{RawEntry, Record};
use crate::parser::{ListingParser, Parser};
use crate::storage::Ledger;
use crate::utils::{page_url, parse_date, resolve_link};

use chrono::NaiveDate;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_PAGES: usize = 50;

/// Why traversal ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A record older than the window start was reached.
    Cutoff,
    /// The site answered "not found" for the next page.
    EndOfPages,
    MissingContainer,
    EmptyPage,
    FetchFailed(String),
    PageLimit,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// New records in discovery order.
    pub records: Vec<Record>,
    pub pages_fetched: usize,
    pub not_matched: usize,
    pub excluded: usize,
    pub duplicates: usize,
    pub invalid_dates: usize,
    pub unresolved_links: usize,
    pub stop_reason: Option<StopReason>,
}

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub start_url: Url,
    pub start_date: NaiveDate,
    pub filter: KeywordFilter,
    pub page_delay: Duration,
    pub max_pages: usize,
}

pub struct Crawler<'a> {
    fetcher: &'a dyn Fetcher,
    parser: &'a dyn Parser,
    settings: CrawlSettings,
}

impl<'a> Crawler<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, parser: &'a dyn Parser, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            parser,
            settings,
        }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Walks the listing until a stop condition. Never fails: per-page problems
    /// end the traversal and whatever was accumulated is returned.
    pub async fn run(&self, ledger: &mut Ledger) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();
        let mut page = 1usize;

        let reason = loop {
            if page > self.settings.max_pages {
                warn!("Page limit {} reached, stopping", self.settings.max_pages);
                break StopReason::PageLimit;
            }

            let url = page_url(&self.settings.start_url, page);
            info!("--- Page {} --- {}", page, url);
            outcome.pages_fetched += 1;

            let html = match self.fetcher.fetch(url.as_str()).await {
                Ok(FetchOutcome::Page(html)) => html,
                Ok(FetchOutcome::EndOfPages) => {
                    info!("Page {} not found, end of listing", page);
                    break StopReason::EndOfPages;
                }
                Err(e) => {
                    warn!("Fetching page {} failed: {}", page, e);
                    break StopReason::FetchFailed(e.to_string());
                }
            };

            let entries = match self.parser.parse(&html) {
                Ok(entries) => entries,
                Err(e) if page == 1 => {
                    warn!("First page has no listing: {}", e);
                    break StopReason::MissingContainer;
                }
                Err(e) => {
                    warn!("Page {} has no listing, stopping: {}", page, e);
                    break StopReason::MissingContainer;
                }
            };

            if entries.is_empty() {
                info!("Page {} has no rows", page);
                break StopReason::EmptyPage;
            }

            if self.process_page(&url, entries, ledger, &mut outcome) {
                info!("Reached records older than {}, stopping", self.settings.start_date);
                break StopReason::Cutoff;
            }

            page += 1;
            if !self.settings.page_delay.is_zero() {
                sleep(self.settings.page_delay).await;
            }
        };

        info!(
            "Crawl finished after {} page(s): {} new, {} duplicate, {} excluded ({:?})",
            outcome.pages_fetched,
            outcome.records.len(),
            outcome.duplicates,
            outcome.excluded,
            reason
        );
        outcome.stop_reason = Some(reason);
        outcome
    }

    /// Handles one page's rows in display order. Returns `true` once the cutoff is hit;
    /// the remaining rows of the page are not looked at.
    fn process_page(
        &self,
        page_url: &Url,
        entries: Vec<RawEntry>,
        ledger: &mut Ledger,
        outcome: &mut CrawlOutcome,
    ) -> bool {
        for entry in entries {
            let Some(date) = parse_date(&entry.date_text) else {
                debug!("Unparseable date {:?} for {:?}", entry.date_text, entry.title);
                outcome.invalid_dates += 1;
                continue;
            };

            if date < self.settings.start_date {
                return true;
            }

            let Some(link) = resolve_link(page_url, &entry.href) else {
                debug!("Cannot resolve link {:?} for {:?}", entry.href, entry.title);
                outcome.unresolved_links += 1;
                continue;
            };

            match self.settings.filter.classify(&entry.title) {
                FilterVerdict::Accepted => {}
                FilterVerdict::NoIncludeMatch => {
                    outcome.not_matched += 1;
                    continue;
                }
                FilterVerdict::Excluded(kw) => {
                    info!("  [excluded by {}] {}", kw, entry.title);
                    outcome.excluded += 1;
                    continue;
                }
            }

            let record = Record {
                date,
                title: entry.title,
                link,
            };
            let key = record.identity_key();
            if ledger.contains(&key) {
                info!("  [already recorded] {}", record.title);
                outcome.duplicates += 1;
                continue;
            }

            info!("  > found: [{}] {}", record.date, record.title);
            ledger.add(key);
            outcome.records.push(record);
        }
        false
    }
}

/// Crawls from `start_url` with the built-in listing parser, default politeness
/// delay and page cap, returning only the new records.
pub async fn crawl(
    fetcher: &dyn Fetcher,
    start_url: &Url,
    start_date: NaiveDate,
    include: &[String],
    exclude: &[String],
    ledger: &mut Ledger,
) -> Vec<Record> {
    let parser = ListingParser::new();
    let settings = CrawlSettings {
        start_url: start_url.clone(),
        start_date,
        filter: KeywordFilter::new(include.to_vec(), exclude.to_vec()),
        page_delay: DEFAULT_PAGE_DELAY,
        max_pages: DEFAULT_MAX_PAGES,
    };
    Crawler::new(fetcher, &parser, settings).run(ledger).await.records
}
