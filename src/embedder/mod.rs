//! Embedding model clients.

mod ollama;
mod openai;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;

use crate::error::{Error, Result};

/// Default number of texts sent per embedding request.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Turns text into fixed-length vectors.
pub trait Embedder {
    /// Embeds a batch of at most [`Embedder::batch_size`] texts, in order.
    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Maximum batch accepted by [`Embedder::embed_batch`].
    fn batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }

    /// Embeds a single text.
    fn embed(&self, input: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[input])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("no embedding returned".into()))
    }

    /// Embeds any number of texts, batching internally.
    fn embed_all(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let size = self.batch_size().max(1);
        let mut vectors = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(size) {
            vectors.extend(self.embed_batch(batch)?);
        }
        if vectors.len() != inputs.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

fn ensure_batch_within(inputs: &[&str], batch_size: usize) -> Result<()> {
    if inputs.len() > batch_size {
        return Err(Error::Embedding(format!(
            "batch of {} exceeds configured max {}",
            inputs.len(),
            batch_size
        )));
    }
    Ok(())
}
