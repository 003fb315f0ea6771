pub mod http;
pub mod traits;

pub use http::HttpFetcher;
pub use traits::{FetchOutcome, Fetcher};
