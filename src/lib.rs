#![warn(missing_docs)]
//! Core library for the wikirag pipeline: collect Wikipedia articles, index
//! them into a vector store and answer questions over the indexed text.

pub mod chat;
pub mod chunker;
pub mod collector;
pub mod config;
pub mod embedder;
pub mod error;
mod http;
pub mod indexer;
pub mod keywords;
pub mod logging;
pub mod record;
pub mod responder;
pub mod snapshot;
pub mod vector_store;
pub mod wikipedia;

pub use chat::ChatModel;
pub use chunker::TextSplitter;
pub use collector::{CollectReport, Collector};
pub use config::{AskCli, CollectorCli, IndexerCli};
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use indexer::{IndexReport, Indexer};
pub use record::{ArticleRecord, RecordFormat};
pub use responder::{Answer, Responder};
pub use snapshot::{Snapshot, SnapshotId};
pub use vector_store::{CollectionName, SqliteVectorStore, VectorStore};
pub use wikipedia::{ArticleSource, WikipediaClient};
