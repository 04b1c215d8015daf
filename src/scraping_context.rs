use crate::{
    bill_scraper::BillScraper,
    config::ScrapeConfig,
    requests::RequestClient,
    scrape_loop::{self, RunSummary},
    sink::JsonLinesSink,
};

/// A configured scrape against the live site, writing to the configured file.
pub struct ScrapingContext {
    pub scraping_config: ScrapeConfig,
    pub bill_scraper: BillScraper<RequestClient>,
    pub sink: JsonLinesSink,
}

impl ScrapingContext {
    pub fn new(scraping_config: ScrapeConfig) -> anyhow::Result<Self> {
        scraping_config.validate()?;
        let request_client = RequestClient::new(&scraping_config)?;
        let bill_scraper = BillScraper::new(request_client, &scraping_config)?;
        let sink = JsonLinesSink::open(&scraping_config.output_path)?;
        Ok(ScrapingContext {
            scraping_config,
            bill_scraper,
            sink,
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<RunSummary> {
        scrape_loop::run(&self.scraping_config, &self.bill_scraper, &mut self.sink).await
    }
}
