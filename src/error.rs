//! Error type shared by every pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the collector, indexer and query responder.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required configuration values were not provided.
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    /// A configuration value was present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The stage input file does not exist.
    #[error("input file not found: {}", .0.display())]
    InputMissing(PathBuf),

    /// The stage input file exists but holds no text.
    #[error("input file is empty: {} (run the collector first)", .0.display())]
    InputEmpty(PathBuf),

    /// The keyword table could not be used.
    #[error("keyword file error: {0}")]
    Keywords(String),

    /// The snapshot sentinel file is unusable.
    #[error("snapshot file error: {0}")]
    Snapshot(String),

    /// The Wikipedia API answered with an error or an unexpected payload.
    #[error("Wikipedia API error: {0}")]
    Wikipedia(String),

    /// The embedding service failed or returned malformed vectors.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The chat model failed or returned no text.
    #[error("chat model error: {0}")]
    Chat(String),

    /// The vector store rejected an operation.
    #[error("vector store error: {0}")]
    Store(String),

    /// The vector store holds no entries to search.
    #[error("vector store collection '{0}' is empty, run the indexer first")]
    EmptyStore(String),

    /// A question was blank after trimming.
    #[error("question is empty")]
    EmptyQuestion,

    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite failure inside the vector store.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// CSV decoding failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
