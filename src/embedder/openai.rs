//! OpenAI-compatible embeddings client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_batch_within, Embedder};
use crate::error::{Error, Result};
use crate::http;

/// Blocking embeddings client that talks to OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbedder {
    /// Builds a new OpenAI embeddings client.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Option<Duration>,
        batch_size: usize,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::MissingConfig(vec!["OPENAI_API_KEY"]));
        }
        if model.trim().is_empty() {
            return Err(Error::MissingConfig(vec!["EMBEDDING_MODEL"]));
        }
        Ok(Self {
            client: http::json_client(timeout, Some(api_key))?,
            endpoint: http::endpoint(base_url, "embeddings"),
            model: model.trim().to_string(),
            batch_size: batch_size.max(1),
        })
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        ensure_batch_within(inputs, self.batch_size)?;

        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let resp = self.client.post(&self.endpoint).json(&request).send()?;
        let resp = http::check_status(resp, "OpenAI embeddings").map_err(Error::Embedding)?;
        let parsed: EmbeddingResponse = resp.json()?;
        parsed.into_vectors(inputs.len())
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    #[serde(borrow)]
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl EmbeddingResponse {
    fn into_vectors(mut self, expected: usize) -> Result<Vec<Vec<f32>>> {
        self.data.sort_by_key(|entry| entry.index);
        if self.data.len() != expected {
            return Err(Error::Embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                self.data.len(),
                expected
            )));
        }
        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn response_is_reordered_by_index() {
        let body = r#"{"object":"list","data":[
            {"object":"embedding","index":1,"embedding":[0.5,0.5]},
            {"object":"embedding","index":0,"embedding":[1.0,0.0]}],
            "model":"text-embedding-3-small"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(
            parsed.into_vectors(2).expect("vectors"),
            vec![vec![1.0, 0.0], vec![0.5, 0.5]]
        );
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let body = r#"{"data":[{"index":0,"embedding":[1.0]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).expect("decode");
        assert!(matches!(parsed.into_vectors(2), Err(Error::Embedding(_))));
    }

    #[test]
    fn requires_api_key() {
        let err = OpenAiEmbedder::new(" ", "https://api.openai.com/v1", "m", None, 8)
            .err()
            .expect("missing key");
        assert_eq!(err.to_string(), "missing required configuration: OPENAI_API_KEY");
    }
}
