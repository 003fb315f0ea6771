// Incremental crawl of a dated listing: filter by title keywords, dedup
// against a persisted ledger, notify about what is new.

pub mod config;
pub mod crawler;
pub mod fetcher;
pub mod filter;
pub mod model;
pub mod notifier;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use crawler::{crawl, CrawlOutcome, CrawlSettings, Crawler, StopReason};
pub use model::Record;
pub use pipeline::{run_pipeline, DigestContext, RunReport};
