use billscraper::{ScrapeConfig, ScrapingContext};
use log::{LevelFilter, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    // Also picks up a `.env` file, if there is one.
    let config = ScrapeConfig::from_env()?;
    info!(
        "Scraping {} {} {} #{}..={} into {}",
        config.congress_number,
        config.chamber,
        config.bill_type,
        config.start_index,
        config.end_index,
        config.output_path.display()
    );

    let mut context = ScrapingContext::new(config)?;
    // Skipped bills are reported in the log; they don't fail the run.
    context.run().await?;
    Ok(())
}
