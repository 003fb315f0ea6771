// Listing-page specific HTML parsing
use crate::model::{ParserError, RawEntry};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub trait Parser {
    /// Returns the page's rows in display order (newest first on the target site).
    fn parse(&self, html: &str) -> Result<Vec<RawEntry>, ParserError>;
}

/// Extracts `<em>date</em><a href="...">title</a>` rows from `ul.lie1 > li`.
pub struct ListingParser {
    container: Selector,
    container_css: String,
    row: Selector,
    date: Selector,
    link: Selector,
}

impl ListingParser {
    pub fn new() -> Self {
        Self::with_selectors("ul.lie1", "li", "em", "a")
            .expect("built-in listing selectors are valid")
    }

    pub fn with_selectors(
        container: &str,
        row: &str,
        date: &str,
        link: &str,
    ) -> Result<Self, ParserError> {
        Ok(Self {
            container: parse_selector(container)?,
            container_css: container.to_string(),
            row: parse_selector(row)?,
            date: parse_selector(date)?,
            link: parse_selector(link)?,
        })
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Option<RawEntry> {
        let date_node = row.select(&self.date).next()?;
        let link_node = row.select(&self.link).next()?;
        let href = link_node.value().attr("href")?;

        Some(RawEntry {
            date_text: stripped_text(date_node),
            title: stripped_text(link_node),
            href: href.trim().to_string(),
        })
    }
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for ListingParser {
    fn parse(&self, html: &str) -> Result<Vec<RawEntry>, ParserError> {
        let document = Html::parse_document(html);
        let container = document
            .select(&self.container)
            .next()
            .ok_or_else(|| ParserError::MissingContainer(self.container_css.clone()))?;

        let mut entries = Vec::new();
        for row in container.select(&self.row) {
            match self.parse_row(row) {
                Some(entry) => entries.push(entry),
                None => debug!("Skipping listing row without date, title or link"),
            }
        }

        Ok(entries)
    }
}

fn parse_selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|_| ParserError::InvalidSelector(css.to_string()))
}

/// Concatenates the element's text nodes, each trimmed, then collapses inner
/// whitespace runs (line breaks included) to single spaces.
fn stripped_text(element: ElementRef<'_>) -> String {
    let joined: String = element.text().map(str::trim).collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
