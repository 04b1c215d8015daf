mod bill;
mod bill_scraper;
mod config;
mod error;
mod page_cache;
mod ratelimit;
mod requests;
mod scrape_loop;
mod scraping_context;
mod sink;
mod text_manipulators;

pub use bill::{BillId, BillRecord, RelatedBill, Sponsor, Summary};
pub use bill_scraper::{BillPageParser, BillScraper, BillText};
pub use config::{BillType, Chamber, LoadFromEnv, RetryPolicy, ScrapeConfig, ScrapingEnv, ordinal};
pub use error::{FetchError, ParseError, ScrapeError};
pub use page_cache::{PageCache, PageKind};
pub use ratelimit::RateLimiter;
pub use requests::{PageFetcher, RequestClient, fetch_with_retry};
pub use scrape_loop::{RunSummary, run};
pub use scraping_context::ScrapingContext;
pub use sink::{JsonLinesSink, MemorySink, RecordSink, read_json_lines};
