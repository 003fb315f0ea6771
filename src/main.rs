use listing_sniper::config::{load_config, ChannelConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};
use listing_sniper::fetcher::HttpFetcher;
use listing_sniper::filter::KeywordFilter;
use listing_sniper::notifier::NotifierMux;
use listing_sniper::parser::ListingParser;
use listing_sniper::storage::open_store;
use listing_sniper::utils::CutoffWindow;
use listing_sniper::{run_pipeline, CrawlSettings, Crawler, DigestContext};

use chrono::Local;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials may live in a local .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let channels = match ChannelConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Credential error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let base_url = match config.base_url() {
        Ok(u) => u,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("========================================");
    info!("Starting crawl of {}", base_url);
    let today = Local::now().date_naive();
    let window = CutoffWindow::new(today, config.lookback_days);
    info!("Window: {}", window);

    let fetcher = match HttpFetcher::new(&config) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let parser = ListingParser::new();
    let store = match open_store(&config.ledger) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open ledger {}: {}", config.ledger.path().display(), e);
            return ExitCode::FAILURE;
        }
    };

    let settings = CrawlSettings {
        start_url: base_url,
        start_date: window.start,
        filter: KeywordFilter::new(config.include_keywords.clone(), config.exclude_keywords.clone()),
        page_delay: Duration::from_millis(config.page_delay_ms),
        max_pages: config.max_pages,
    };
    let crawler = Crawler::new(&fetcher, &parser, settings);
    let notifier = NotifierMux::from_config(&channels, &config.smtp, &config.site_name);
    let context = DigestContext {
        run_date: today,
        site_name: config.site_name.clone(),
        site_url: config.base_url.clone(),
        repo_url: config.repo_url.clone(),
    };

    match run_pipeline(&crawler, store.as_ref(), &notifier, context).await {
        Ok(report) => {
            info!(
                "Run complete: {} new record(s), {} channel(s) delivered, ledger holds {}",
                report.outcome.records.len(),
                report.delivered,
                report.ledger_size
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Ledger I/O failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
