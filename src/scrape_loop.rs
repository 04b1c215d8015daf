use std::fmt;

use log::{info, warn};

use crate::{
    bill::BillId,
    bill_scraper::BillScraper,
    config::ScrapeConfig,
    error::ScrapeError,
    requests::PageFetcher,
    sink::RecordSink,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: u32,
    pub written: u32,
    pub fetch_failures: u32,
    pub parse_failures: u32,
}

impl RunSummary {
    pub fn skipped(&self) -> u32 {
        self.fetch_failures + self.parse_failures
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} written, {} skipped ({} fetch failures, {} parse failures)",
            self.attempted,
            self.written,
            self.skipped(),
            self.fetch_failures,
            self.parse_failures
        )
    }
}

/// Scrapes every bill in the configured range, in ascending order, appending
/// each parsed record to `sink`.
///
/// A bill that can't be fetched or parsed is logged and skipped. Only sink
/// failures end the run early.
pub async fn run<F, S>(
    config: &ScrapeConfig,
    scraper: &BillScraper<F>,
    sink: &mut S,
) -> anyhow::Result<RunSummary>
where
    F: PageFetcher,
    S: RecordSink + ?Sized,
{
    config.validate()?;

    let mut summary = RunSummary::default();
    let total = config.end_index - config.start_index + 1;

    for (n, number) in config.indices().enumerate() {
        let id = BillId::new(
            config.congress_number,
            config.chamber,
            config.bill_type,
            number,
        );
        info!("Scraping {id} ({}/{total})", n + 1);
        summary.attempted += 1;

        match scraper.scrape(&id).await {
            Ok(record) => {
                sink.append(&record)?;
                summary.written += 1;
            }
            Err(ScrapeError::Fetch(err)) => {
                warn!("skipping {id}: {err}");
                summary.fetch_failures += 1;
            }
            Err(ScrapeError::Parse(err)) => {
                warn!("skipping {id}: {err}");
                summary.parse_failures += 1;
            }
        }
    }

    info!("Run finished: {summary}");
    Ok(summary)
}
