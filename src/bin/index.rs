use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use wikirag::config::IndexerCli;
use wikirag::{logging, Indexer, VectorStore};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let config = IndexerCli::parse()
        .into_config()
        .context("invalid indexer configuration")?;

    let embedder = config
        .models
        .embedder(config.embed_batch_size)
        .context("failed to build embedding client")?;
    let store = config.store.open();
    let indexer = Indexer::new(config.splitter, embedder.as_ref(), &store);

    let report = indexer
        .run(&config.input)
        .with_context(|| format!("failed to index {}", config.input.display()))?;
    let stored = store.count().context("failed to count stored chunks")?;

    info!(
        chunks = report.chunks,
        stored,
        collection = config.store.collection.as_str(),
        location = %config.store.location.display(),
        "indexing finished"
    );
    println!("Database location: {}", config.store.location.display());
    println!("Collection name: {}", config.store.collection.as_str());
    println!("Total chunks ingested: {}", report.chunks);
    Ok(())
}
