use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use wikirag::config::CollectorCli;
use wikirag::{keywords, logging, snapshot, Collector, WikipediaClient};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let config = CollectorCli::parse()
        .into_config()
        .context("invalid collector configuration")?;

    let keywords = keywords::load(&config.keywords_file).with_context(|| {
        format!("failed to read keywords from {}", config.keywords_file.display())
    })?;
    let snapshot = snapshot::load_or_create(&config.snapshot_file).with_context(|| {
        format!("failed to load snapshot id from {}", config.snapshot_file.display())
    })?;

    let client = WikipediaClient::new(&config.api_url, &config.user_agent, config.request_timeout)
        .context("failed to build Wikipedia client")?;
    let collector = Collector::new(&client)
        .with_delay(config.keyword_delay)
        .with_format(config.record_format);

    info!(
        keywords = keywords.len(),
        snapshot = %snapshot.id,
        "starting Wikipedia scraping"
    );
    let report = collector
        .collect_to_file(&keywords, &config.output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    println!(
        "Done! {} records ({} found, {} not found, {} failed) saved to: {}",
        report.written(),
        report.found,
        report.not_found,
        report.failed,
        config.output.display()
    );
    Ok(())
}
