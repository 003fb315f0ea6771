// One scheduled run: load ledger, crawl, persist, notify
use crate::crawler::{CrawlOutcome, Crawler};
use crate::model::StorageError;
use crate::notifier::{Digest, NotifierMux};
use crate::storage::{Ledger, LedgerStore};

use chrono::NaiveDate;
use tracing::{error, info};

/// Everything the digest needs besides the records and keywords.
#[derive(Debug, Clone)]
pub struct DigestContext {
    pub run_date: NaiveDate,
    pub site_name: String,
    pub site_url: String,
    pub repo_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: CrawlOutcome,
    pub ledger_size: usize,
    pub delivered: usize,
}

/// The ledger is written exactly once, after the crawl. Notification is attempted
/// even if that write fails, and the write error is returned afterwards.
pub async fn run_pipeline(
    crawler: &Crawler<'_>,
    store: &dyn LedgerStore,
    notifier: &NotifierMux,
    context: DigestContext,
) -> Result<RunReport, StorageError> {
    let mut ledger = Ledger::load_from(store)?;
    info!("Ledger loaded with {} key(s)", ledger.len());

    let outcome = crawler.run(&mut ledger).await;

    let persisted = ledger.persist_to(store);
    match &persisted {
        Ok(()) => info!("Ledger saved with {} key(s)", ledger.len()),
        Err(e) => error!("Saving ledger failed: {}", e),
    }

    let filter = &crawler.settings().filter;
    let digest = Digest {
        run_date: context.run_date,
        site_name: context.site_name,
        site_url: context.site_url,
        repo_url: context.repo_url,
        include_keywords: filter.include().to_vec(),
        exclude_keywords: filter.exclude().to_vec(),
        records: outcome.records.clone(),
    };
    let delivered = notifier.notify(&digest).await;

    persisted?;
    Ok(RunReport {
        outcome,
        ledger_size: ledger.len(),
        delivered,
    })
}
