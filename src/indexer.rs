//! Indexer stage: collector output in, rebuilt vector collection out.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::chunker::TextSplitter;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::vector_store::{StoreEntry, VectorStore};

/// Summary of one indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    /// Input file that was indexed.
    pub input: PathBuf,
    /// Chunks embedded and stored.
    pub chunks: usize,
}

/// Reads `input`, trimmed, failing when it is missing or blank.
pub fn read_input(input: &Path) -> Result<String> {
    let text = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::InputMissing(input.to_path_buf()))
        }
        Err(err) => return Err(err.into()),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InputEmpty(input.to_path_buf()));
    }
    Ok(trimmed.to_string())
}

/// Splits, embeds and stores the collector output.
pub struct Indexer<'a> {
    splitter: TextSplitter,
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
}

impl<'a> Indexer<'a> {
    /// Wires the stage to its collaborators.
    pub fn new(
        splitter: TextSplitter,
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
    ) -> Self {
        Self {
            splitter,
            embedder,
            store,
        }
    }

    /// Rebuilds the store from `input`.
    ///
    /// The store is reset only once the input has been read and every chunk
    /// embedded; any earlier failure leaves it untouched.
    pub fn run(&self, input: &Path) -> Result<IndexReport> {
        let text = read_input(input)?;
        info!(path = %input.display(), "splitting text into chunks");
        let chunks = self.splitter.split(&text);
        info!(chunks = chunks.len(), "generating embeddings");

        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_all(&refs)?;
        check_dimensions(&embeddings)?;

        let entries: Vec<StoreEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| StoreEntry {
                id: Uuid::new_v4().to_string(),
                text,
                embedding,
            })
            .collect();
        let count = entries.len();

        self.store.reset()?;
        self.store.upsert(entries)?;
        info!(chunks = count, "chunks embedded and stored");

        Ok(IndexReport {
            input: input.to_path_buf(),
            chunks: count,
        })
    }
}

/// Every embedding must be non-empty and share one dimension.
fn check_dimensions(embeddings: &[Vec<f32>]) -> Result<()> {
    let Some(first) = embeddings.first() else {
        return Ok(());
    };
    let dimension = first.len();
    if dimension == 0 {
        return Err(Error::Embedding("model returned an empty embedding".into()));
    }
    if let Some((idx, bad)) = embeddings
        .iter()
        .enumerate()
        .find(|(_, embedding)| embedding.len() != dimension)
    {
        return Err(Error::Embedding(format!(
            "embedding {idx} has dimension {}, expected {dimension}",
            bad.len()
        )));
    }
    Ok(())
}
