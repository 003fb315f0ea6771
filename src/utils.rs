// Utility functions: dates, the lookback window, links and page addresses
use chrono::{Days, NaiveDate};
use std::fmt;
use url::Url;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a listing date (`YYYY-MM-DD`), tolerating surrounding whitespace.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Inclusive date range `[today - (lookback_days - 1), today]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CutoffWindow {
    /// A lookback of 0 is treated as 1 (today only).
    pub fn new(today: NaiveDate, lookback_days: u32) -> Self {
        let back = u64::from(lookback_days.max(1) - 1);
        let start = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// True when `date` is older than the window; the crawl stops on the first such record.
    pub fn is_before_start(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}

impl fmt::Display for CutoffWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start.format(DATE_FORMAT), self.end.format(DATE_FORMAT))
    }
}

/// Resolves `href` against the page it was found on. Absolute `http(s)` links pass through.
pub fn resolve_link(page_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    page_url.join(href).ok().map(String::from)
}

/// Address of page `page` (1-based). Page 1 is the base itself; page `n` gets
/// `_{n-1}` inserted before the extension of the last path segment.
pub fn page_url(base: &Url, page: usize) -> Url {
    if page <= 1 {
        return base.clone();
    }
    let path = base.path();
    let (dir, last) = match path.rfind('/') {
        Some(i) => (&path[..=i], &path[i + 1..]),
        None => ("", path),
    };
    let segment = match last.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &last[..dot], page - 1, &last[dot..]),
        _ => format!("{}_{}", last, page - 1),
    };
    let mut url = base.clone();
    url.set_path(&format!("{dir}{segment}"));
    url
}
